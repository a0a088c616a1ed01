//! Time series data handling for forecasting

use crate::error::{ForecastError, Result};
use crate::utils::date_parser;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Time series data structure for forecasting
///
/// Wraps a polars DataFrame with one timestamp column (`ds` by convention)
/// and one observed value column (`y` by convention).
#[derive(Debug, Clone)]
pub struct TimeSeriesData {
    /// Data frame containing the time series data
    df: DataFrame,
    /// Name of the time column
    time_column: String,
    /// Name of the observed value column
    value_column: String,
}

/// Data loader for time series data
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load time series data from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<TimeSeriesData> {
        let file = File::open(path)?;
        // Use polars DataFrame reader directly
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::detect_and_create_time_series(df)
    }

    /// Create time series data from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<TimeSeriesData> {
        Self::detect_and_create_time_series(df)
    }

    /// Detect time and value columns in a DataFrame and create TimeSeriesData
    fn detect_and_create_time_series(df: DataFrame) -> Result<TimeSeriesData> {
        let time_column = Self::detect_time_column(&df)?;
        let value_column = Self::detect_value_column(&df, &time_column)?;

        Ok(TimeSeriesData {
            df,
            time_column,
            value_column,
        })
    }

    /// Detect the time column in a DataFrame
    fn detect_time_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        // Look for common time column names
        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name == "ds"
                || lower_name.contains("time")
                || lower_name.contains("date")
                || lower_name.contains("timestamp")
            {
                return Ok(name.to_string());
            }
        }

        // If not found, use the first column if it looks like a date/time
        if let Some(first_col) = df.get_columns().first() {
            if first_col.dtype().is_temporal() {
                return Ok(first_col.name().to_string());
            }
        }

        Err(ForecastError::DataError(
            "No time column found in data".to_string(),
        ))
    }

    /// Detect the observed value column in a DataFrame
    fn detect_value_column(df: &DataFrame, time_column: &str) -> Result<String> {
        let column_names = df.get_column_names();

        // Look for common value column names
        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name == "y" || lower_name.contains("value") || lower_name.contains("price") {
                return Ok(name.to_string());
            }
        }

        // Fall back to the first numeric column that isn't the time column
        for col in df.get_columns() {
            if col.name() != time_column && col.dtype().is_numeric() {
                return Ok(col.name().to_string());
            }
        }

        Err(ForecastError::DataError(
            "No value column found in data".to_string(),
        ))
    }
}

impl TimeSeriesData {
    /// Create a new TimeSeriesData from timestamps and values
    pub fn new(dates: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        // Store timestamps as epoch milliseconds
        let date_series = Series::new(
            "ds",
            dates
                .iter()
                .map(|d| d.timestamp_millis())
                .collect::<Vec<i64>>(),
        );
        let values_series = Series::new("y", values);

        let df = DataFrame::new(vec![date_series, values_series])?;

        Ok(Self {
            df,
            time_column: "ds".to_string(),
            value_column: "y".to_string(),
        })
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the time column name
    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    /// Get the value column name
    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    /// Get the observed values as a vector
    pub fn values(&self) -> Result<Vec<f64>> {
        let col = self.df.column(&self.value_column)?;
        if col.null_count() > 0 {
            return Err(ForecastError::DataError(format!(
                "Value column '{}' contains missing values",
                self.value_column
            )));
        }

        match col.dtype() {
            DataType::Float64 => Ok(col.f64()?.into_iter().flatten().collect()),
            DataType::Float32 => Ok(col.f32()?.into_iter().flatten().map(|v| v as f64).collect()),
            DataType::Int64 => Ok(col.i64()?.into_iter().flatten().map(|v| v as f64).collect()),
            DataType::Int32 => Ok(col.i32()?.into_iter().flatten().map(|v| v as f64).collect()),
            DataType::UInt64 => Ok(col.u64()?.into_iter().flatten().map(|v| v as f64).collect()),
            DataType::UInt32 => Ok(col.u32()?.into_iter().flatten().map(|v| v as f64).collect()),
            dtype => Err(ForecastError::DataError(format!(
                "Value column '{}' has non-numeric type {:?}",
                self.value_column, dtype
            ))),
        }
    }

    /// Get the timestamps as a vector
    pub fn timestamps(&self) -> Result<Vec<DateTime<Utc>>> {
        let col = self.df.column(&self.time_column)?;
        if col.null_count() > 0 {
            return Err(ForecastError::DataError(format!(
                "Time column '{}' contains missing values",
                self.time_column
            )));
        }

        match col.dtype() {
            DataType::Datetime(time_unit, _) => {
                let divisor = match time_unit {
                    TimeUnit::Nanoseconds => 1_000_000,
                    TimeUnit::Microseconds => 1_000,
                    TimeUnit::Milliseconds => 1,
                };
                col.datetime()?
                    .into_iter()
                    .flatten()
                    .map(|ts| Self::millis_to_datetime(ts / divisor))
                    .collect()
            }
            DataType::Date => col
                .date()?
                .into_iter()
                .flatten()
                .map(|days| {
                    let naive_date = NaiveDate::from_ymd_opt(1970, 1, 1)
                        .and_then(|epoch| epoch.checked_add_days(chrono::Days::new(days as u64)))
                        .ok_or_else(|| {
                            ForecastError::DataError(format!("Date out of range: {} days", days))
                        })?;
                    let naive = NaiveDateTime::new(naive_date, chrono::NaiveTime::default());
                    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
                })
                .collect(),
            // Integer time columns are interpreted as epoch milliseconds
            DataType::Int64 => col
                .i64()?
                .into_iter()
                .flatten()
                .map(Self::millis_to_datetime)
                .collect(),
            DataType::Utf8 => col
                .utf8()?
                .into_iter()
                .flatten()
                .map(date_parser::parse_datetime)
                .collect(),
            dtype => Err(ForecastError::DataError(format!(
                "Time column '{}' has unsupported type {:?}",
                self.time_column, dtype
            ))),
        }
    }

    fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>> {
        NaiveDateTime::from_timestamp_opt(ms.div_euclid(1000), (ms.rem_euclid(1000) * 1_000_000) as u32)
            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
            .ok_or_else(|| {
                ForecastError::DataError(format!("Timestamp out of range: {} ms", ms))
            })
    }

    /// Get a slice of the data from start to end index
    pub fn slice(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let end = end.unwrap_or(self.df.height());
        if start > end || end > self.df.height() {
            return Err(ForecastError::ValidationError(format!(
                "Invalid slice bounds {}..{} for {} rows",
                start,
                end,
                self.df.height()
            )));
        }
        let sliced_df = self.df.slice(start as i64, end - start);

        Ok(TimeSeriesData {
            df: sliced_df,
            time_column: self.time_column.clone(),
            value_column: self.value_column.clone(),
        })
    }

    /// Check if the time series is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Get the length of the time series
    pub fn len(&self) -> usize {
        self.df.height()
    }
}
