//! Request handling for the automatic next-day prediction and manual
//! index or date predictions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::categorizer::{Categorizer, Category, QuantileThresholds};
use crate::data::series::Series;
use crate::error::{Error, Result};
use crate::model::predictor::Predictor;
use crate::time_index::{date_from_index, index_from_date};
use crate::utils::input::ManualInput;
use crate::utils::plot::{ChartData, HighlightPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestSource {
    Automatic,
    ManualIndex,
    ManualDate,
}

/// Built only by [`PredictionPipeline`], which checks it again before predicting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionRequest {
    day_index: i64,
    source: RequestSource,
}

impl PredictionRequest {
    pub fn day_index(&self) -> i64 {
        self.day_index
    }

    pub fn source(&self) -> RequestSource {
        self.source
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub timestamp: NaiveDate,
    pub day_index: i64,
    /// µg/m³, full precision.
    pub value: f64,
    pub category: Category,
    pub explanation: String,
    pub source: RequestSource,
}

impl PredictionResult {
    pub fn display(&self) {
        println!("\nPrediction date: {}", self.timestamp.format("%d-%m-%Y"));
        println!("Predicted NO2 (µg/m³): {:.10}", self.value);
        println!("Category: {}", self.category);
        println!("Explanation: {}", self.explanation);
    }
}

/// Which manual requests are accepted. Automatic requests are never checked.
///
/// `max_days_ahead` counts days past the last observed day index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtrapolationPolicy {
    pub allow_before_origin: bool,
    pub max_days_ahead: Option<i64>,
}

impl Default for ExtrapolationPolicy {
    fn default() -> Self {
        ExtrapolationPolicy {
            allow_before_origin: true,
            max_days_ahead: None,
        }
    }
}

impl ExtrapolationPolicy {
    fn check(&self, day_index: i64, last_index: i64) -> Result<()> {
        if day_index < 0 && !self.allow_before_origin {
            return Err(Error::InvalidManualInput(format!(
                "day index {} is before the series origin",
                day_index
            )));
        }
        if let Some(max_ahead) = self.max_days_ahead {
            if day_index > last_index.saturating_add(max_ahead) {
                return Err(Error::InvalidManualInput(format!(
                    "day index {} is more than {} days past the last observation ({})",
                    day_index, max_ahead, last_index
                )));
            }
        }
        Ok(())
    }
}

/// Immutable prediction context: one series, its thresholds and one model.
pub struct PredictionPipeline {
    series: Series,
    predictor: Predictor,
    categorizer: Categorizer,
    policy: ExtrapolationPolicy,
}

impl PredictionPipeline {
    /// Computes the category thresholds once. Fails with
    /// [`Error::EmptySeries`] when there is nothing to derive them from.
    pub fn new(series: Series, predictor: Predictor) -> Result<Self> {
        let categorizer = Categorizer::from_series(&series)?;
        Ok(PredictionPipeline {
            series,
            predictor,
            categorizer,
            policy: ExtrapolationPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: ExtrapolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn thresholds(&self) -> &QuantileThresholds {
        self.categorizer.thresholds()
    }

    pub fn policy(&self) -> &ExtrapolationPolicy {
        &self.policy
    }

    fn origin(&self) -> Result<NaiveDate> {
        self.series.first().map(|o| o.timestamp).ok_or(Error::EmptySeries)
    }

    fn last_index(&self) -> Result<i64> {
        self.series.last().map(|o| o.day_index).ok_or(Error::EmptySeries)
    }

    pub fn automatic_request(&self) -> Result<PredictionRequest> {
        let last = self.series.last().ok_or(Error::EmptySeries)?;
        Ok(PredictionRequest {
            day_index: last.day_index + 1,
            source: RequestSource::Automatic,
        })
    }

    pub fn manual_index_request(&self, day_index: i64) -> Result<PredictionRequest> {
        let request = PredictionRequest {
            day_index,
            source: RequestSource::ManualIndex,
        };
        self.validate(&request)?;
        Ok(request)
    }

    /// Dates before the origin give a negative index, which is predicted
    /// unless the policy forbids it.
    pub fn manual_date_request(&self, date: NaiveDate) -> Result<PredictionRequest> {
        let request = PredictionRequest {
            day_index: index_from_date(self.origin()?, date),
            source: RequestSource::ManualDate,
        };
        self.validate(&request)?;
        if request.day_index < 0 {
            warn!(%date, day_index = request.day_index, "extrapolating before series origin");
        }
        Ok(request)
    }

    /// Automatic requests must target the day after the last observation;
    /// manual ones must pass the extrapolation policy, and a manual index
    /// must be non-negative.
    fn validate(&self, request: &PredictionRequest) -> Result<()> {
        let last_index = self.last_index()?;
        match request.source {
            RequestSource::Automatic => {
                if request.day_index != last_index + 1 {
                    return Err(Error::InvalidRequest(format!(
                        "automatic request for day index {} but the next day is {}",
                        request.day_index,
                        last_index + 1
                    )));
                }
                Ok(())
            }
            RequestSource::ManualIndex => {
                if request.day_index < 0 {
                    return Err(Error::InvalidManualInput(format!(
                        "day index must be non-negative, got {}",
                        request.day_index
                    )));
                }
                self.policy.check(request.day_index, last_index)
            }
            RequestSource::ManualDate => self.policy.check(request.day_index, last_index),
        }
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        self.validate(request)?;
        let timestamp = match request.source {
            RequestSource::Automatic => {
                let last = self.series.last().ok_or(Error::EmptySeries)?;
                date_from_index(last.timestamp, request.day_index - last.day_index)?
            }
            RequestSource::ManualIndex | RequestSource::ManualDate => {
                date_from_index(self.origin()?, request.day_index)?
            }
        };

        let value = self.predictor.predict_at(request.day_index)?;
        let classification = self.categorizer.classify(value);
        debug!(
            source = ?request.source,
            day_index = request.day_index,
            %timestamp,
            value,
            category = %classification.category,
            "prediction classified"
        );

        Ok(PredictionResult {
            timestamp,
            day_index: request.day_index,
            value,
            category: classification.category,
            explanation: classification.explanation,
            source: request.source,
        })
    }

    pub fn predict_next_day(&self) -> Result<PredictionResult> {
        self.predict(&self.automatic_request()?)
    }

    pub fn predict_manual_index(&self, day_index: i64) -> Result<PredictionResult> {
        self.predict(&self.manual_index_request(day_index)?)
    }

    pub fn predict_manual_date(&self, date: NaiveDate) -> Result<PredictionResult> {
        self.predict(&self.manual_date_request(date)?)
    }

    pub fn predict_manual(&self, input: ManualInput) -> Result<PredictionResult> {
        match input {
            ManualInput::Index(day_index) => self.predict_manual_index(day_index),
            ManualInput::Date(date) => self.predict_manual_date(date),
        }
    }

    /// Renderer payload: the historical curve, the fitted curve over every
    /// historical day index, the next-day point and optionally a manual point.
    pub fn chart_data(&self, manual: Option<&PredictionResult>) -> Result<ChartData> {
        let historical = self
            .series
            .iter()
            .map(|o| (o.timestamp, o.raw_value))
            .collect();

        let fitted_values = self.predictor.predict_batch(&self.series.day_indices())?;
        let fitted = self
            .series
            .iter()
            .zip(fitted_values)
            .map(|(o, v)| (o.timestamp, v))
            .collect();

        let next = self.predict_next_day()?;
        let highlights = std::iter::once(&next)
            .chain(manual)
            .map(HighlightPoint::from_result)
            .collect();

        Ok(ChartData {
            historical,
            fitted,
            highlights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::Observation;
    use crate::model::regressor::{LinearRegressor, RegressionModel};
    use crate::model::scaler::{FeatureScaler, StandardScaler};

    fn pipeline(policy: ExtrapolationPolicy) -> PredictionPipeline {
        let origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let observations = (0..5)
            .map(|i| Observation {
                timestamp: date_from_index(origin, i).unwrap(),
                day_index: i,
                raw_value: 10.0 + i as f64,
                scaled_value: i as f64,
            })
            .collect();
        let predictor = Predictor::new(
            RegressionModel::Linear(LinearRegressor { slope: 1.0, intercept: 0.0 }),
            FeatureScaler::Standard(StandardScaler { mean: 10.0, std: 1.0 }),
        )
        .unwrap();
        PredictionPipeline::new(Series::new(observations).unwrap(), predictor)
            .unwrap()
            .with_policy(policy)
    }

    #[test]
    fn test_policy_rejects_before_origin() {
        let p = pipeline(ExtrapolationPolicy {
            allow_before_origin: false,
            max_days_ahead: None,
        });
        let date = NaiveDate::from_ymd_opt(2023, 12, 30).unwrap();
        let err = p.predict_manual_date(date).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_policy_limits_days_ahead() {
        let p = pipeline(ExtrapolationPolicy {
            allow_before_origin: true,
            max_days_ahead: Some(3),
        });
        // last index is 4
        assert!(p.predict_manual_index(7).is_ok());
        assert!(matches!(
            p.predict_manual_index(8),
            Err(Error::InvalidManualInput(_))
        ));
        // automatic mode is never limited by policy
        assert!(p.predict_next_day().is_ok());
    }

    #[test]
    fn test_predict_rechecks_requests() {
        let p = pipeline(ExtrapolationPolicy {
            allow_before_origin: false,
            max_days_ahead: Some(1),
        });

        let negative = PredictionRequest {
            day_index: -50,
            source: RequestSource::ManualIndex,
        };
        assert!(matches!(p.predict(&negative), Err(Error::InvalidManualInput(_))));

        let too_far = PredictionRequest {
            day_index: 500,
            source: RequestSource::ManualDate,
        };
        assert!(matches!(p.predict(&too_far), Err(Error::InvalidManualInput(_))));

        let wrong_next_day = PredictionRequest {
            day_index: 3,
            source: RequestSource::Automatic,
        };
        assert!(matches!(p.predict(&wrong_next_day), Err(Error::InvalidRequest(_))));

        // a request accepted by a lenient pipeline is re-checked by a strict one
        let lenient = pipeline(ExtrapolationPolicy::default());
        let request = lenient.manual_index_request(40).unwrap();
        assert!(lenient.predict(&request).is_ok());
        assert!(matches!(p.predict(&request), Err(Error::InvalidManualInput(_))));
    }

    #[test]
    fn test_negative_index_rejected_regardless_of_policy() {
        let p = pipeline(ExtrapolationPolicy::default());
        assert!(matches!(
            p.predict_manual_index(-1),
            Err(Error::InvalidManualInput(_))
        ));
    }

    #[test]
    fn test_manual_date_timestamp_is_the_date() {
        let p = pipeline(ExtrapolationPolicy::default());
        let date = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        let result = p.predict_manual_date(date).unwrap();
        assert_eq!(result.timestamp, date);
        assert_eq!(result.day_index, 45);
        assert_eq!(result.source, RequestSource::ManualDate);
    }
}
