//! Regression models mapping a day index to a scaled concentration.
//!
//! Models arrive already fitted; nothing here trains or mutates them.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Single-feature regression capability.
pub trait Regressor {
    /// Prediction in the model's scaled space.
    fn predict(&self, feature: f64) -> f64;

    /// Checks that the parameters can produce predictions at all.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Brute-force k-nearest-neighbours regression with uniform weights.
///
/// Distance is `|feature - stored|`. Equidistant neighbours are taken in
/// storage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnRegressor {
    k: usize,
    features: Array1<f64>,
    targets: Array1<f64>,
}

impl KnnRegressor {
    pub fn new(k: usize, features: Array1<f64>, targets: Array1<f64>) -> Result<Self> {
        let knn = KnnRegressor { k, features, targets };
        knn.validate()?;
        Ok(knn)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    fn nearest(&self, feature: f64) -> Vec<usize> {
        let mut order: Vec<(usize, f64)> = self
            .features
            .iter()
            .enumerate()
            .map(|(i, &x)| (i, (feature - x).abs()))
            .collect();

        // stable: ties keep storage order
        order.sort_by(|a, b| a.1.total_cmp(&b.1));
        order.truncate(self.k);
        order.into_iter().map(|(i, _)| i).collect()
    }
}

impl Regressor for KnnRegressor {
    fn predict(&self, feature: f64) -> f64 {
        let neighbours = self.nearest(feature);
        let sum: f64 = neighbours.iter().map(|&i| self.targets[i]).sum();
        sum / neighbours.len() as f64
    }

    fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidModel("k must be at least 1".to_string()));
        }
        if self.features.len() != self.targets.len() {
            return Err(Error::InvalidModel(format!(
                "{} features but {} targets",
                self.features.len(),
                self.targets.len()
            )));
        }
        if self.k > self.features.len() {
            return Err(Error::InvalidModel(format!(
                "k = {} exceeds {} stored samples",
                self.k,
                self.features.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub slope: f64,
    pub intercept: f64,
}

impl Regressor for LinearRegressor {
    fn predict(&self, feature: f64) -> f64 {
        self.slope * feature + self.intercept
    }

    fn validate(&self) -> Result<()> {
        if !self.slope.is_finite() || !self.intercept.is_finite() {
            return Err(Error::InvalidModel("non-finite coefficients".to_string()));
        }
        Ok(())
    }
}

/// Any supported regressor, in a form the model store can serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegressionModel {
    Knn(KnnRegressor),
    Linear(LinearRegressor),
}

impl Regressor for RegressionModel {
    fn predict(&self, feature: f64) -> f64 {
        match self {
            RegressionModel::Knn(m) => m.predict(feature),
            RegressionModel::Linear(m) => m.predict(feature),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            RegressionModel::Knn(m) => m.validate(),
            RegressionModel::Linear(m) => m.validate(),
        }
    }
}
