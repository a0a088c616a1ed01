//! Utility functions for the forecast_frame crate

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// Date parsing helpers for string-typed time columns
pub mod date_parser {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    /// Parse a date string in `YYYY-MM-DD` format into a UTC timestamp at midnight
    pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
        let naive = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
            ForecastError::DataError(format!("Cannot parse date '{}': {}", s, e))
        })?;
        let naive = NaiveDateTime::new(naive, chrono::NaiveTime::default());
        Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    }

    /// Parse a datetime string, trying `YYYY-MM-DD HH:MM:SS`, RFC 3339, then plain dates
    pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
        let trimmed = s.trim();

        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.with_timezone(&Utc));
        }

        parse_date(trimmed)
    }
}

/// Spacing between consecutive observations of a time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// One observation per minute
    Minutely,
    /// One observation per hour
    Hourly,
    /// One observation per day
    Daily,
    /// One observation per week
    Weekly,
    /// One observation per calendar month
    Monthly,
}

impl Frequency {
    /// Advance a timestamp by `steps` periods of this frequency.
    ///
    /// Monthly advancement is calendar-aware rather than a fixed duration.
    pub fn advance(&self, ts: DateTime<Utc>, steps: usize) -> Result<DateTime<Utc>> {
        match self {
            Frequency::Minutely => Ok(ts + Duration::minutes(steps as i64)),
            Frequency::Hourly => Ok(ts + Duration::hours(steps as i64)),
            Frequency::Daily => Ok(ts + Duration::days(steps as i64)),
            Frequency::Weekly => Ok(ts + Duration::weeks(steps as i64)),
            Frequency::Monthly => ts
                .checked_add_months(Months::new(steps as u32))
                .ok_or_else(|| {
                    ForecastError::MathError(format!(
                        "Timestamp overflow advancing {} by {} months",
                        ts, steps
                    ))
                }),
        }
    }
}

/// Infer the observation frequency from the median spacing of timestamps
pub fn infer_frequency(timestamps: &[DateTime<Utc>]) -> Result<Frequency> {
    if timestamps.len() < 2 {
        return Err(ForecastError::DataError(
            "Need at least two timestamps to infer a frequency".to_string(),
        ));
    }

    let mut diffs: Vec<i64> = timestamps
        .windows(2)
        .map(|w| (w[1] - w[0]).num_seconds())
        .collect();
    diffs.sort_unstable();
    let median = diffs[diffs.len() / 2];

    match median {
        s if s <= 0 => Err(ForecastError::DataError(
            "Timestamps must be strictly increasing".to_string(),
        )),
        s if s <= 120 => Ok(Frequency::Minutely),
        s if s <= 7_200 => Ok(Frequency::Hourly),
        s if s <= 2 * 86_400 => Ok(Frequency::Daily),
        s if s <= 10 * 86_400 => Ok(Frequency::Weekly),
        s if s <= 45 * 86_400 => Ok(Frequency::Monthly),
        s => Err(ForecastError::ValidationError(format!(
            "Unsupported observation spacing: {} seconds",
            s
        ))),
    }
}

/// Split time series values into training and test sets
pub fn train_test_split(data: &[f64], test_ratio: f64) -> (Vec<f64>, Vec<f64>) {
    if data.is_empty() || test_ratio <= 0.0 || test_ratio >= 1.0 {
        return (data.to_vec(), Vec::new());
    }

    let test_size = (data.len() as f64 * test_ratio).round() as usize;
    let train_size = data.len() - test_size;

    let train = data[..train_size].to_vec();
    let test = data[train_size..].to_vec();

    (train, test)
}
