//! Severity categories derived from the series' own distribution.
//!
//! Quantiles use linear interpolation between order statistics: for `n`
//! sorted values and level `q`, position `h = q * (n - 1)` and the result is
//! `x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::data::series::Series;
use crate::error::{Error, Result};

pub const MEDIAN_LEVEL: f64 = 0.50;
pub const UPPER_QUARTILE_LEVEL: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Good,
    Moderate,
    High,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::High => "High (Unhealthy)",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileThresholds {
    pub median: f64,
    pub upper_quartile: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: Category,
    pub explanation: String,
}

/// Linearly interpolated quantile of already sorted values.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let h = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = h.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    let fraction = h - lower as f64;
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

pub fn compute_thresholds(series: &Series) -> Result<QuantileThresholds> {
    let mut values = series.raw_values().to_vec();
    values.sort_by(f64::total_cmp);

    let median = quantile_sorted(&values, MEDIAN_LEVEL).ok_or(Error::EmptySeries)?;
    let upper_quartile = quantile_sorted(&values, UPPER_QUARTILE_LEVEL).ok_or(Error::EmptySeries)?;

    Ok(QuantileThresholds { median, upper_quartile })
}

/// `<= median` is Good, `<= upper_quartile` is Moderate, anything above is High.
pub fn classify(value: f64, thresholds: &QuantileThresholds) -> Classification {
    if value <= thresholds.median {
        Classification {
            category: Category::Good,
            explanation: format!(
                "The value is at or below the good limit (median: {:.6}).",
                thresholds.median
            ),
        }
    } else if value <= thresholds.upper_quartile {
        Classification {
            category: Category::Moderate,
            explanation: format!(
                "The value is above the median but at or below the upper quartile ({:.6}).",
                thresholds.upper_quartile
            ),
        }
    } else {
        Classification {
            category: Category::High,
            explanation: format!(
                "The value is above 75% of the historical data (higher than {:.6}).",
                thresholds.upper_quartile
            ),
        }
    }
}

/// Thresholds computed once for a loaded series, shared by every prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Categorizer {
    thresholds: QuantileThresholds,
}

impl Categorizer {
    pub fn from_series(series: &Series) -> Result<Self> {
        let thresholds = compute_thresholds(series)?;
        info!(
            median = thresholds.median,
            upper_quartile = thresholds.upper_quartile,
            "thresholds computed"
        );
        Ok(Categorizer { thresholds })
    }

    pub fn thresholds(&self) -> &QuantileThresholds {
        &self.thresholds
    }

    pub fn classify(&self, value: f64) -> Classification {
        classify(value, &self.thresholds)
    }
}
