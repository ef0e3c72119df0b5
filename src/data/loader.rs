use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::data::series::{Observation, Series};
use crate::error::{Error, Result};

const DATE_FORMATS: [&str; 1] = ["%Y-%m-%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Deserialize)]
struct SeriesRecord {
    #[serde(rename = "t", alias = "timestamp")]
    timestamp: String,
    day_index: i64,
    #[serde(rename = "NO2", alias = "raw_value")]
    raw_value: f64,
    #[serde(rename = "NO2_scaled", alias = "scaled_value")]
    scaled_value: f64,
}

pub fn load_series<P: AsRef<Path>>(csv_path: P) -> Result<Series> {
    let csv_path = csv_path.as_ref();
    let file = File::open(csv_path)?;
    let series = read_series(file)?;

    info!(path = %csv_path.display(), observations = series.len(), "series loaded");
    Ok(series)
}

/// Reads `t,day_index,NO2,NO2_scaled` rows, sorts them by timestamp and
/// validates the result.
pub fn read_series<R: Read>(reader: R) -> Result<Series> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut observations = Vec::new();

    for (row, result) in rdr.deserialize::<SeriesRecord>().enumerate() {
        let record = result?;
        observations.push(Observation {
            timestamp: parse_timestamp(&record.timestamp)
                .ok_or_else(|| Error::InvalidSeries(format!(
                    "row {}: unparseable timestamp {:?}",
                    row, record.timestamp
                )))?,
            day_index: record.day_index,
            raw_value: record.raw_value,
            scaled_value: record.scaled_value,
        });
    }

    observations.sort_by_key(|o| o.timestamp);
    Series::new(observations)
}

/// Calendar date of a timestamp cell; any time of day is dropped.
pub fn parse_timestamp(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_and_sorts_rows() {
        let csv = "t,day_index,NO2,NO2_scaled\n\
                   2024-01-03,2,14.0,0.4\n\
                   2024-01-01,0,10.0,0.0\n\
                   2024-01-02 00:00:00,1,12.0,0.2\n";
        let series = read_series(csv.as_bytes()).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.day_indices(), vec![0, 1, 2]);
        assert_eq!(series.first().unwrap().raw_value, 10.0);
        assert_eq!(series.last().unwrap().scaled_value, 0.4);
    }

    #[test]
    fn test_accepts_alias_headers() {
        let csv = "timestamp,day_index,raw_value,scaled_value\n2024-01-01,0,5.5,0.1\n";
        let series = read_series(csv.as_bytes()).unwrap();
        assert_eq!(series.first().unwrap().raw_value, 5.5);
    }

    #[test]
    fn test_rejects_bad_timestamp() {
        let csv = "t,day_index,NO2,NO2_scaled\nyesterday,0,10.0,0.0\n";
        assert!(matches!(
            read_series(csv.as_bytes()),
            Err(Error::InvalidSeries(_))
        ));
    }

    #[test]
    fn test_rejects_non_numeric_value() {
        let csv = "t,day_index,NO2,NO2_scaled\n2024-01-01,0,abc,0.0\n";
        assert!(matches!(read_series(csv.as_bytes()), Err(Error::Csv(_))));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_timestamp("2024-03-09"), expected);
        assert_eq!(parse_timestamp(" 2024-03-09 17:45:00 "), expected);
        assert_eq!(parse_timestamp("2024-03-09T08:00:00"), expected);
        assert_eq!(parse_timestamp("09/03/2024"), None);
    }
}
