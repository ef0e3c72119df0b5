use chrono::NaiveDate;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::time_index::index_from_date;

/// One daily reading of the historical series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDate,
    pub day_index: i64,
    /// Concentration in µg/m³.
    pub raw_value: f64,
    /// Concentration in the space the regression model was fitted on.
    pub scaled_value: f64,
}

/// Time-sorted historical series. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    /// Builds a series, checking that observations are sorted, that every
    /// `day_index` equals its day distance from the first timestamp, and that
    /// raw values are finite. An empty series is accepted here.
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        if let Some(first) = observations.first() {
            let origin = first.timestamp;
            let mut previous: Option<i64> = None;

            for (row, obs) in observations.iter().enumerate() {
                let expected = index_from_date(origin, obs.timestamp);
                if obs.day_index != expected {
                    return Err(Error::InvalidSeries(format!(
                        "row {}: day_index {} does not match {} (expected {})",
                        row, obs.day_index, obs.timestamp, expected
                    )));
                }
                if let Some(prev) = previous {
                    if obs.day_index <= prev {
                        return Err(Error::InvalidSeries(format!(
                            "row {}: day_index {} is not after {}",
                            row, obs.day_index, prev
                        )));
                    }
                }
                if !obs.raw_value.is_finite() {
                    return Err(Error::InvalidSeries(format!(
                        "row {}: raw value {} is not finite",
                        row, obs.raw_value
                    )));
                }
                previous = Some(obs.day_index);
            }
        }

        Ok(Series { observations })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn day_indices(&self) -> Vec<i64> {
        self.observations.iter().map(|o| o.day_index).collect()
    }

    pub fn raw_values(&self) -> Array1<f64> {
        self.observations.iter().map(|o| o.raw_value).collect()
    }
}
