//! Fitted scalers between physical units (µg/m³) and the model's space.

use ndarray::Array1;
use std::cmp::Ordering;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub trait Scaler {
    fn transform(&self, value: f64) -> f64;

    fn inverse_transform(&self, scaled: f64) -> f64;

    fn transform_batch(&self, values: &Array1<f64>) -> Array1<f64> {
        values.mapv(|v| self.transform(v))
    }

    fn inverse_transform_batch(&self, scaled: &Array1<f64>) -> Array1<f64> {
        scaled.mapv(|v| self.inverse_transform(v))
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Min-max scaling onto `feature_range`.
///
/// A constant training column (`data_min == data_max`) is scaled with a unit
/// range instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: f64,
    pub data_max: f64,
    pub feature_range: (f64, f64),
}

impl MinMaxScaler {
    pub fn new(data_min: f64, data_max: f64) -> Self {
        MinMaxScaler {
            data_min,
            data_max,
            feature_range: (0.0, 1.0),
        }
    }

    pub fn with_range(mut self, lo: f64, hi: f64) -> Self {
        self.feature_range = (lo, hi);
        self
    }

    fn scale(&self) -> f64 {
        let data_range = self.data_max - self.data_min;
        let data_range = if data_range == 0.0 { 1.0 } else { data_range };
        (self.feature_range.1 - self.feature_range.0) / data_range
    }

    fn offset(&self) -> f64 {
        self.feature_range.0 - self.data_min * self.scale()
    }
}

impl Scaler for MinMaxScaler {
    fn transform(&self, value: f64) -> f64 {
        value * self.scale() + self.offset()
    }

    fn inverse_transform(&self, scaled: f64) -> f64 {
        (scaled - self.offset()) / self.scale()
    }

    fn validate(&self) -> Result<()> {
        let (lo, hi) = self.feature_range;
        // also rejects NaN bounds
        if lo.partial_cmp(&hi) != Some(Ordering::Less) {
            return Err(Error::InvalidModel(format!(
                "feature range ({}, {}) is empty",
                lo, hi
            )));
        }
        if !self.data_min.is_finite() || !self.data_max.is_finite() || self.data_min > self.data_max {
            return Err(Error::InvalidModel(format!(
                "data bounds [{}, {}] are invalid",
                self.data_min, self.data_max
            )));
        }
        Ok(())
    }
}

/// Standardisation with a stored mean and standard deviation.
/// A zero deviation is treated as 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: f64,
    pub std: f64,
}

impl StandardScaler {
    fn effective_std(&self) -> f64 {
        if self.std == 0.0 { 1.0 } else { self.std }
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.effective_std()
    }

    fn inverse_transform(&self, scaled: f64) -> f64 {
        scaled * self.effective_std() + self.mean
    }

    fn validate(&self) -> Result<()> {
        if !self.mean.is_finite() || !self.std.is_finite() || self.std < 0.0 {
            return Err(Error::InvalidModel(format!(
                "mean {} / std {} are invalid",
                self.mean, self.std
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeatureScaler {
    MinMax(MinMaxScaler),
    Standard(StandardScaler),
}

impl Scaler for FeatureScaler {
    fn transform(&self, value: f64) -> f64 {
        match self {
            FeatureScaler::MinMax(s) => s.transform(value),
            FeatureScaler::Standard(s) => s.transform(value),
        }
    }

    fn inverse_transform(&self, scaled: f64) -> f64 {
        match self {
            FeatureScaler::MinMax(s) => s.inverse_transform(scaled),
            FeatureScaler::Standard(s) => s.inverse_transform(scaled),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            FeatureScaler::MinMax(s) => s.validate(),
            FeatureScaler::Standard(s) => s.validate(),
        }
    }
}
