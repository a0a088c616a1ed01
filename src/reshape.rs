//! Reshaping raw multi-horizon predictions into tabular forecast views
//!
//! A prediction is addressed two ways: by the timestamp it was made for
//! (the target) or by the timestamp it was made at (the origin). The
//! functions here re-index a [`RawPredictions`] set into either view:
//!
//! - [`target_indexed`]: one row per target timestamp, column `yhat<k>`
//!   holding the prediction made `k` steps before the target (`k` is the
//!   age of the prediction, 1 = most recent).
//! - [`origin_indexed`]: one row per origin, column `step<k>` holding the
//!   prediction `k` steps past the row's `ds` (step 0 = the `ds` row
//!   itself, which is the first forecasted timestamp).
//! - [`latest_forecast`]: the target-indexed layout restricted to the most
//!   recent origin plus a configurable number of older ones, one column
//!   per origin.
//!
//! Cells without a matching raw prediction are left as polars nulls, never
//! zero and never NaN. Rows at the series boundary keep only the ages or
//! horizons a source prediction actually exists for.

use crate::data::TimeSeriesData;
use crate::error::{ForecastError, Result};
use crate::models::RawPredictions;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Options controlling the reshaped output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReshapeOptions {
    /// Include decomposed component columns per age/horizon
    pub decompose: bool,
    /// Include `residual<k>` columns (prediction minus observed value)
    pub residuals: bool,
    /// Include rows with ground-truth history outside the forecast range
    pub include_history: bool,
}

impl Default for ReshapeOptions {
    fn default() -> Self {
        Self {
            decompose: false,
            residuals: false,
            include_history: true,
        }
    }
}

/// Reshape raw predictions into the target-indexed view.
///
/// One row per target timestamp `ds`. Column `yhat<k>` holds the prediction
/// for that row made `k` steps earlier; ages without a source prediction
/// stay null. Targets past the observed range get rows with a null `y`.
pub fn target_indexed(
    data: &TimeSeriesData,
    raw: &RawPredictions,
    options: &ReshapeOptions,
) -> Result<DataFrame> {
    ensure_nonempty(raw)?;

    let observed_ts = data.timestamps()?;
    let observed_values = data.values()?;
    let observed: HashMap<DateTime<Utc>, f64> = observed_ts
        .iter()
        .copied()
        .zip(observed_values.iter().copied())
        .collect();

    // Origins ascend, so the first origin's first step is the earliest target
    let earliest_target = raw.targets()[0][0];

    let mut timeline: BTreeSet<DateTime<Utc>> = BTreeSet::new();
    for &ts in &observed_ts {
        if options.include_history || ts >= earliest_target {
            timeline.insert(ts);
        }
    }
    for row in raw.targets() {
        for &ts in row {
            timeline.insert(ts);
        }
    }

    let timeline: Vec<DateTime<Utc>> = timeline.into_iter().collect();
    let row_of: HashMap<DateTime<Utc>, usize> = timeline
        .iter()
        .enumerate()
        .map(|(i, &ts)| (ts, i))
        .collect();
    let n_rows = timeline.len();
    let n_forecasts = raw.n_forecasts();

    let y: Vec<Option<f64>> = timeline.iter().map(|ts| observed.get(ts).copied()).collect();

    // Place every prediction at (row = target, column = age)
    let mut yhat: Vec<Vec<Option<f64>>> = vec![vec![None; n_rows]; n_forecasts];
    for (origin, row) in raw.targets().iter().enumerate() {
        for (step, &ts) in row.iter().enumerate() {
            if let Some(&r) = row_of.get(&ts) {
                yhat[step][r] = Some(raw.values()[origin][step]);
            }
        }
    }

    let mut columns = Vec::new();
    columns.push(timestamp_series("ds", &timeline));
    columns.push(Series::new("y", &y));
    for (step, col) in yhat.iter().enumerate() {
        columns.push(Series::new(&format!("yhat{}", step + 1), col));
    }

    if options.residuals {
        for (step, col) in yhat.iter().enumerate() {
            let residual: Vec<Option<f64>> = col
                .iter()
                .zip(y.iter())
                .map(|(pred, actual)| match (pred, actual) {
                    (Some(p), Some(a)) => Some(p - a),
                    _ => None,
                })
                .collect();
            columns.push(Series::new(&format!("residual{}", step + 1), &residual));
        }
    }

    if options.decompose {
        for (name, rows) in raw.components() {
            let mut aged: Vec<Vec<Option<f64>>> = vec![vec![None; n_rows]; n_forecasts];
            for (origin, row) in raw.targets().iter().enumerate() {
                for (step, &ts) in row.iter().enumerate() {
                    if let Some(&r) = row_of.get(&ts) {
                        aged[step][r] = Some(rows[origin][step]);
                    }
                }
            }
            for (step, col) in aged.iter().enumerate() {
                columns.push(Series::new(&format!("{}{}", name, step + 1), col));
            }
        }
    }

    Ok(DataFrame::new(columns)?)
}

/// Reshape raw predictions into the origin-indexed view.
///
/// One row per origin. The row's `ds` is the first forecasted timestamp and
/// column `step<k>` holds the prediction `k` steps after it (step 0 = the
/// prediction for `ds` itself).
pub fn origin_indexed(raw: &RawPredictions, options: &ReshapeOptions) -> Result<DataFrame> {
    ensure_nonempty(raw)?;

    let n_forecasts = raw.n_forecasts();
    let starts: Vec<DateTime<Utc>> = raw
        .targets()
        .iter()
        .map(|row| row[0])
        .collect();

    let mut columns = Vec::new();
    columns.push(timestamp_series("ds", &starts));
    for step in 0..n_forecasts {
        let col: Vec<f64> = raw.values().iter().map(|row| row[step]).collect();
        columns.push(Series::new(&format!("step{}", step), col));
    }

    if options.decompose {
        for (name, rows) in raw.components() {
            for step in 0..n_forecasts {
                let col: Vec<f64> = rows.iter().map(|row| row[step]).collect();
                columns.push(Series::new(&format!("{}{}", name, step), col));
            }
        }
    }

    Ok(DataFrame::new(columns)?)
}

/// Restrict the output to the most recent forecast per target.
///
/// Column `origin-0` holds the latest origin's predictions; `origin-<j>`
/// holds the predictions of the origin `j` periods before it, for up to
/// `include_previous_forecasts` older origins. Rows cover the targets of
/// the selected origins, preceded by ground-truth history rows when
/// `include_history` is set.
pub fn latest_forecast(
    data: &TimeSeriesData,
    raw: &RawPredictions,
    include_previous_forecasts: usize,
    include_history: bool,
) -> Result<DataFrame> {
    ensure_nonempty(raw)?;

    let last = raw.n_origins() - 1;
    let n_previous = include_previous_forecasts.min(last);

    let observed_ts = data.timestamps()?;
    let observed_values = data.values()?;
    let observed: HashMap<DateTime<Utc>, f64> = observed_ts
        .iter()
        .copied()
        .zip(observed_values.iter().copied())
        .collect();

    let mut timeline: BTreeSet<DateTime<Utc>> = BTreeSet::new();
    for origin in last - n_previous..=last {
        for &ts in &raw.targets()[origin] {
            timeline.insert(ts);
        }
    }
    if include_history {
        for &ts in &observed_ts {
            timeline.insert(ts);
        }
    }

    let timeline: Vec<DateTime<Utc>> = timeline.into_iter().collect();
    let row_of: HashMap<DateTime<Utc>, usize> = timeline
        .iter()
        .enumerate()
        .map(|(i, &ts)| (ts, i))
        .collect();
    let n_rows = timeline.len();

    let y: Vec<Option<f64>> = timeline.iter().map(|ts| observed.get(ts).copied()).collect();

    let mut columns = Vec::new();
    columns.push(timestamp_series("ds", &timeline));
    columns.push(Series::new("y", &y));

    for j in 0..=n_previous {
        let origin = last - j;
        let mut col: Vec<Option<f64>> = vec![None; n_rows];
        for (step, &ts) in raw.targets()[origin].iter().enumerate() {
            if let Some(&r) = row_of.get(&ts) {
                col[r] = Some(raw.values()[origin][step]);
            }
        }
        columns.push(Series::new(&format!("origin-{}", j), &col));
    }

    Ok(DataFrame::new(columns)?)
}

fn ensure_nonempty(raw: &RawPredictions) -> Result<()> {
    if raw.is_empty() {
        return Err(ForecastError::ReshapeError(
            "No predictions to reshape".to_string(),
        ));
    }
    Ok(())
}

/// Timestamps are stored as epoch milliseconds, matching TimeSeriesData
fn timestamp_series(name: &str, timestamps: &[DateTime<Utc>]) -> Series {
    let millis: Vec<i64> = timestamps.iter().map(|ts| ts.timestamp_millis()).collect();
    Series::new(name, millis)
}
