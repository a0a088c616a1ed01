//! Autoregressive linear model with direct multi-horizon outputs

use crate::data::TimeSeriesData;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, RawPredictions, TrainedForecastModel};
use crate::utils::{infer_frequency, Frequency};
use chrono::{DateTime, Utc};

/// Lagged linear regression model.
///
/// Fits one independent least-squares regression per forecast step, each
/// mapping the last `n_lags` observed values to the value that many steps
/// ahead. Predictions decompose into a `trend` component (the intercept)
/// and an `ar` component (the lag contribution).
#[derive(Debug, Clone)]
pub struct LinearAr {
    /// Name of the model
    name: String,
    /// Number of lagged inputs
    n_lags: usize,
    /// Number of forecast steps per origin
    n_forecasts: usize,
}

/// Trained lagged linear regression model
#[derive(Debug, Clone)]
pub struct TrainedLinearAr {
    /// Name of the model
    name: String,
    /// Number of lagged inputs
    n_lags: usize,
    /// Number of forecast steps per origin
    n_forecasts: usize,
    /// Fitted lag weights per forecast step, in chronological lag order
    weights: Vec<Vec<f64>>,
    /// Fitted intercept per forecast step
    intercepts: Vec<f64>,
    /// Training values
    history: Vec<f64>,
    /// Timestamp of the last training observation
    last_ds: DateTime<Utc>,
    /// Observation frequency of the training data
    frequency: Frequency,
}

impl LinearAr {
    /// Create a new lagged linear regression model
    pub fn new(n_lags: usize, n_forecasts: usize) -> Result<Self> {
        if n_lags == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of lags must be positive".to_string(),
            ));
        }
        if n_forecasts == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of forecast steps must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("LinearAr(n_lags={}, n_forecasts={})", n_lags, n_forecasts),
            n_lags,
            n_forecasts,
        })
    }
}

impl ForecastModel for LinearAr {
    type Trained = TrainedLinearAr;

    fn train(&self, data: &TimeSeriesData) -> Result<TrainedLinearAr> {
        let values = data.values()?;
        let timestamps = data.timestamps()?;

        // Need enough windows for a determined least-squares system
        let min_len = 2 * self.n_lags + self.n_forecasts;
        if values.len() < min_len {
            return Err(ForecastError::ValidationError(format!(
                "Insufficient data for {}. Need at least {} observations.",
                self.name, min_len
            )));
        }

        let frequency = infer_frequency(&timestamps)?;
        let origins = origin_range(values.len(), self.n_lags, self.n_forecasts);

        // One regression per forecast step: y[o+1+j] on [1, lags..]
        let dim = self.n_lags + 1;
        let mut weights = Vec::with_capacity(self.n_forecasts);
        let mut intercepts = Vec::with_capacity(self.n_forecasts);

        for j in 0..self.n_forecasts {
            let mut xtx = vec![vec![0.0; dim]; dim];
            let mut xty = vec![0.0; dim];

            for &o in &origins {
                let mut row = Vec::with_capacity(dim);
                row.push(1.0);
                row.extend_from_slice(&values[o + 1 - self.n_lags..=o]);
                let target = values[o + 1 + j];

                for a in 0..dim {
                    for b in 0..dim {
                        xtx[a][b] += row[a] * row[b];
                    }
                    xty[a] += row[a] * target;
                }
            }

            let coeffs = solve_linear_system(xtx, xty)?;
            intercepts.push(coeffs[0]);
            weights.push(coeffs[1..].to_vec());
        }

        let last_ds = *timestamps.last().ok_or_else(|| {
            ForecastError::DataError("Empty time series data".to_string())
        })?;

        Ok(TrainedLinearAr {
            name: self.name.clone(),
            n_lags: self.n_lags,
            n_forecasts: self.n_forecasts,
            weights,
            intercepts,
            history: values,
            last_ds,
            frequency,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedLinearAr {
    /// Number of lagged inputs
    pub fn n_lags(&self) -> usize {
        self.n_lags
    }

    /// Number of forecast steps per origin
    pub fn n_forecasts(&self) -> usize {
        self.n_forecasts
    }

    /// Predict all steps from one window of lagged values
    fn predict_window(&self, lags: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut values = Vec::with_capacity(self.n_forecasts);
        let mut trend = Vec::with_capacity(self.n_forecasts);
        let mut ar = Vec::with_capacity(self.n_forecasts);

        for j in 0..self.n_forecasts {
            let contribution: f64 = self.weights[j]
                .iter()
                .zip(lags.iter())
                .map(|(w, lag)| w * lag)
                .sum();
            trend.push(self.intercepts[j]);
            ar.push(contribution);
            values.push(self.intercepts[j] + contribution);
        }

        (values, trend, ar)
    }
}

impl TrainedForecastModel for TrainedLinearAr {
    fn predict(&self, data: &TimeSeriesData) -> Result<RawPredictions> {
        let values = data.values()?;
        let timestamps = data.timestamps()?;

        if values.len() < self.n_lags + self.n_forecasts {
            return Err(ForecastError::ValidationError(format!(
                "Insufficient data to predict with {}. Need at least {} observations.",
                self.name,
                self.n_lags + self.n_forecasts
            )));
        }

        let origins = origin_range(values.len(), self.n_lags, self.n_forecasts);
        let mut targets = Vec::with_capacity(origins.len());
        let mut predicted = Vec::with_capacity(origins.len());
        let mut trend_rows = Vec::with_capacity(origins.len());
        let mut ar_rows = Vec::with_capacity(origins.len());

        for &o in &origins {
            let lags = &values[o + 1 - self.n_lags..=o];
            let (row_values, trend, ar) = self.predict_window(lags);

            targets.push(timestamps[o + 1..=o + self.n_forecasts].to_vec());
            predicted.push(row_values);
            trend_rows.push(trend);
            ar_rows.push(ar);
        }

        RawPredictions::new(targets, predicted, self.n_forecasts)?
            .with_component("trend", trend_rows)?
            .with_component("ar", ar_rows)
    }

    fn forecast(&self) -> Result<RawPredictions> {
        let lags = &self.history[self.history.len() - self.n_lags..];
        let (row_values, trend, ar) = self.predict_window(lags);

        let mut row_targets = Vec::with_capacity(self.n_forecasts);
        for j in 0..self.n_forecasts {
            row_targets.push(self.frequency.advance(self.last_ds, j + 1)?);
        }

        RawPredictions::new(vec![row_targets], vec![row_values], self.n_forecasts)?
            .with_component("trend", vec![trend])?
            .with_component("ar", vec![ar])
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Indices of the last observed value of every full in-sample window
fn origin_range(len: usize, n_lags: usize, n_forecasts: usize) -> Vec<usize> {
    (n_lags - 1..=len - 1 - n_forecasts).collect()
}

/// Solve a square linear system by Gaussian elimination with partial pivoting
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        // Pick the largest remaining pivot
        let mut pivot_row = col;
        for row in col + 1..n {
            if a[row][col].abs() > a[pivot_row][col].abs() {
                pivot_row = row;
            }
        }
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(ForecastError::MathError(
                "Singular normal equations; the lagged inputs are collinear".to_string(),
            ));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in col + 1..n {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / a[col][col];
    }

    Ok(x)
}
