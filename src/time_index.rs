//! Mapping between calendar dates and day offsets from the series origin.
//!
//! Day indices are whole days. Negative indices address dates before the
//! origin; range checks are left to callers.

use chrono::{NaiveDate, TimeDelta};

use crate::error::{Error, Result};

/// `origin + day_index` days.
///
/// Fails only when the result falls outside the calendar chrono can represent.
pub fn date_from_index(origin: NaiveDate, day_index: i64) -> Result<NaiveDate> {
    TimeDelta::try_days(day_index)
        .and_then(|delta| origin.checked_add_signed(delta))
        .ok_or(Error::DateOutOfRange { origin, day_index })
}

/// Whole days from `origin` to `date`. Inverse of [`date_from_index`].
pub fn index_from_date(origin: NaiveDate, date: NaiveDate) -> i64 {
    date.signed_duration_since(origin).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let origin = ymd(2024, 1, 1);
        for d in (0..2000).chain([36_500, 365_000]) {
            let date = date_from_index(origin, d).unwrap();
            assert_eq!(index_from_date(origin, date), d);
        }
    }

    #[test]
    fn test_crosses_leap_day() {
        let origin = ymd(2024, 2, 28);
        assert_eq!(date_from_index(origin, 1).unwrap(), ymd(2024, 2, 29));
        assert_eq!(date_from_index(origin, 2).unwrap(), ymd(2024, 3, 1));
    }

    #[test]
    fn test_negative_index_is_before_origin() {
        let origin = ymd(2024, 1, 1);
        assert_eq!(date_from_index(origin, -1).unwrap(), ymd(2023, 12, 31));
        assert_eq!(index_from_date(origin, ymd(2023, 12, 25)), -7);
    }

    #[test]
    fn test_out_of_range() {
        let origin = ymd(2024, 1, 1);
        assert!(matches!(
            date_from_index(origin, i64::MAX),
            Err(Error::DateOutOfRange { .. })
        ));
    }
}
