use ndarray::Array1;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::regressor::{RegressionModel, Regressor};
use crate::model::scaler::{FeatureScaler, Scaler};
use crate::model::ModelBundle;
use crate::utils::io::load_bundle;

enum ModelState<R, S> {
    Ready { model: R, scaler: S },
    Unavailable(String),
}

/// Turns a day index into a concentration in physical units.
///
/// A predictor whose model failed to load stays unavailable for its whole
/// lifetime; every call reports [`Error::ModelUnavailable`].
pub struct Predictor<R = RegressionModel, S = FeatureScaler> {
    state: ModelState<R, S>,
}

impl<R: Regressor, S: Scaler> Predictor<R, S> {
    pub fn new(model: R, scaler: S) -> Result<Self> {
        model.validate()?;
        scaler.validate()?;
        Ok(Predictor {
            state: ModelState::Ready { model, scaler },
        })
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Predictor {
            state: ModelState::Unavailable(reason.into()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ModelState::Ready { .. })
    }

    fn ready(&self) -> Result<(&R, &S)> {
        match &self.state {
            ModelState::Ready { model, scaler } => Ok((model, scaler)),
            ModelState::Unavailable(reason) => Err(Error::ModelUnavailable(reason.clone())),
        }
    }

    /// Model output for `day_index`, inverse-scaled to µg/m³. No clamping or rounding.
    pub fn predict_at(&self, day_index: i64) -> Result<f64> {
        let (model, scaler) = self.ready()?;
        let scaled = model.predict(day_index as f64);
        let value = scaler.inverse_transform(scaled);
        debug!(day_index, scaled, value, "prediction");
        Ok(value)
    }

    /// Elementwise [`Self::predict_at`], preserving input order.
    pub fn predict_batch(&self, day_indices: &[i64]) -> Result<Vec<f64>> {
        let (model, scaler) = self.ready()?;
        let features: Array1<f64> = day_indices.iter().map(|&d| d as f64).collect();
        let scaled = features.mapv(|x| model.predict(x));
        Ok(scaler.inverse_transform_batch(&scaled).to_vec())
    }
}

impl Predictor {
    pub fn from_bundle(bundle: ModelBundle) -> Result<Self> {
        Predictor::new(bundle.model, bundle.scaler)
    }

    /// Loads a bincode bundle. Failures do not abort: the returned predictor
    /// is unavailable and carries the reason.
    pub fn load<P: AsRef<Path>>(model_path: P) -> Self {
        let model_path = model_path.as_ref();
        match load_bundle(model_path).and_then(Predictor::from_bundle) {
            Ok(predictor) => {
                info!(path = %model_path.display(), "model loaded");
                predictor
            }
            Err(e) => {
                warn!(path = %model_path.display(), error = %e, "model load failed");
                Predictor::unavailable(format!("{}: {}", model_path.display(), e))
            }
        }
    }
}
