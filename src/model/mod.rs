pub mod predictor;
pub mod regressor;
pub mod scaler;

use serde::{Deserialize, Serialize};

use crate::model::regressor::RegressionModel;
use crate::model::scaler::FeatureScaler;

/// A fitted regressor together with the scaler its targets were fitted in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub model: RegressionModel,
    pub scaler: FeatureScaler,
}
