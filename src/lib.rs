//! Next-day NO2 concentration prediction.
//!
//! A pretrained single-feature regressor maps a day index to a scaled
//! concentration, a fitted scaler maps it back to µg/m³, and the result is
//! graded against the median and upper quartile of the historical series.

pub mod categorizer;
pub mod data;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod time_index;
pub mod utils;

pub use categorizer::{Categorizer, Category, Classification, QuantileThresholds};
pub use data::loader::load_series;
pub use data::series::{Observation, Series};
pub use error::{Error, Result};
pub use model::predictor::Predictor;
pub use model::regressor::{KnnRegressor, LinearRegressor, RegressionModel, Regressor};
pub use model::scaler::{FeatureScaler, MinMaxScaler, Scaler, StandardScaler};
pub use model::ModelBundle;
pub use pipeline::{
    ExtrapolationPolicy, PredictionPipeline, PredictionRequest, PredictionResult, RequestSource,
};
pub use utils::input::ManualInput;
pub use utils::plot::{ChartData, HighlightPoint, PlottersRenderer, SeriesRenderer};
