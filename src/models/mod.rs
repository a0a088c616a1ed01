//! Forecasting models for time series data

use crate::data::TimeSeriesData;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Raw multi-horizon predictions, one row per forecast origin.
///
/// An origin is the point at which a forecast is made; each origin carries
/// exactly `n_forecasts` steps. `targets[i][j]` is the timestamp predicted
/// by origin `i` at step `j` (step 0 is the period immediately after the
/// origin), and `values[i][j]` is the prediction for it. Named decomposed
/// components, when present, sum to the prediction at every step.
#[derive(Debug, Clone)]
pub struct RawPredictions {
    /// Target timestamps per origin and step
    targets: Vec<Vec<DateTime<Utc>>>,
    /// Predicted values per origin and step
    values: Vec<Vec<f64>>,
    /// Decomposed component values per origin and step, keyed by name
    components: BTreeMap<String, Vec<Vec<f64>>>,
    /// Number of steps per origin
    n_forecasts: usize,
}

impl RawPredictions {
    /// Create a new raw prediction set
    pub fn new(
        targets: Vec<Vec<DateTime<Utc>>>,
        values: Vec<Vec<f64>>,
        n_forecasts: usize,
    ) -> Result<Self> {
        if n_forecasts == 0 {
            return Err(ForecastError::ValidationError(
                "Number of forecast steps must be positive".to_string(),
            ));
        }
        if targets.len() != values.len() {
            return Err(ForecastError::ValidationError(format!(
                "Targets rows ({}) don't match values rows ({})",
                targets.len(),
                values.len()
            )));
        }
        for (row_targets, row_values) in targets.iter().zip(values.iter()) {
            if row_targets.len() != n_forecasts || row_values.len() != n_forecasts {
                return Err(ForecastError::ValidationError(format!(
                    "Every origin must carry exactly {} steps",
                    n_forecasts
                )));
            }
        }
        for pair in targets.windows(2) {
            if pair[0][0] >= pair[1][0] {
                return Err(ForecastError::ValidationError(
                    "Forecast origins must be in strictly ascending time order".to_string(),
                ));
            }
        }

        Ok(Self {
            targets,
            values,
            components: BTreeMap::new(),
            n_forecasts,
        })
    }

    /// Attach a named decomposed component, shaped like the values
    pub fn with_component(mut self, name: &str, rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.len() != self.values.len()
            || rows.iter().any(|row| row.len() != self.n_forecasts)
        {
            return Err(ForecastError::ValidationError(format!(
                "Component '{}' doesn't match the prediction shape",
                name
            )));
        }
        self.components.insert(name.to_string(), rows);
        Ok(self)
    }

    /// Number of forecast origins
    pub fn n_origins(&self) -> usize {
        self.values.len()
    }

    /// Number of steps per origin
    pub fn n_forecasts(&self) -> usize {
        self.n_forecasts
    }

    /// Check if the prediction set has no origins
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Target timestamps per origin and step
    pub fn targets(&self) -> &[Vec<DateTime<Utc>>] {
        &self.targets
    }

    /// Predicted values per origin and step
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Decomposed components, keyed by name
    pub fn components(&self) -> &BTreeMap<String, Vec<Vec<f64>>> {
        &self.components
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate in-sample predictions, one origin per window position where
    /// both the model inputs and the full forecast horizon lie inside the data
    fn predict(&self, data: &TimeSeriesData) -> Result<RawPredictions>;

    /// Generate an out-of-sample forecast from a single origin anchored at
    /// the end of the training data
    fn forecast(&self) -> Result<RawPredictions>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on time series data
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on time series data
    fn train(&self, data: &TimeSeriesData) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod linear_ar;
pub mod seasonal_naive;
