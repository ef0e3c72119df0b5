//! Error types for the prediction pipeline

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Regression model or scaler was never loaded
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Historical series holds no observations
    #[error("Series is empty")]
    EmptySeries,

    /// Manual day index or date rejected
    #[error("Invalid manual input: {0}")]
    InvalidManualInput(String),

    /// Request does not match the series it is run against
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Ingested table breaks the ordering or day-index invariants
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Loaded model parameters cannot produce predictions
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Day index {day_index} from {origin} is outside the supported calendar")]
    DateOutOfRange { origin: NaiveDate, day_index: i64 },

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Model encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

impl Error {
    /// Only rejected manual input can be corrected by the caller and retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::InvalidManualInput(_))
    }
}
