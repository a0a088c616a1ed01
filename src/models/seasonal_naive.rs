//! Seasonal naive model

use crate::data::TimeSeriesData;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, RawPredictions, TrainedForecastModel};
use crate::utils::{infer_frequency, Frequency};
use chrono::{DateTime, Utc};

/// Seasonal naive model.
///
/// Predicts every step with the observed value one season earlier. The
/// single decomposed component `seasonal` equals the prediction.
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    /// Name of the model
    name: String,
    /// Season length in periods
    period: usize,
    /// Number of forecast steps per origin
    n_forecasts: usize,
}

/// Trained seasonal naive model
#[derive(Debug, Clone)]
pub struct TrainedSeasonalNaive {
    /// Name of the model
    name: String,
    /// Season length in periods
    period: usize,
    /// Number of forecast steps per origin
    n_forecasts: usize,
    /// Last full season of training values
    last_season: Vec<f64>,
    /// Timestamp of the last training observation
    last_ds: DateTime<Utc>,
    /// Observation frequency of the training data
    frequency: Frequency,
}

impl SeasonalNaive {
    /// Create a new seasonal naive model
    pub fn new(period: usize, n_forecasts: usize) -> Result<Self> {
        if period == 0 {
            return Err(ForecastError::InvalidParameter(
                "Season length must be positive".to_string(),
            ));
        }
        if n_forecasts == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of forecast steps must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("SeasonalNaive(period={}, n_forecasts={})", period, n_forecasts),
            period,
            n_forecasts,
        })
    }
}

impl ForecastModel for SeasonalNaive {
    type Trained = TrainedSeasonalNaive;

    fn train(&self, data: &TimeSeriesData) -> Result<TrainedSeasonalNaive> {
        let values = data.values()?;
        let timestamps = data.timestamps()?;

        let min_len = self.period + self.n_forecasts;
        if values.len() < min_len {
            return Err(ForecastError::ValidationError(format!(
                "Insufficient data for {}. Need at least {} observations.",
                self.name, min_len
            )));
        }

        let frequency = infer_frequency(&timestamps)?;
        let last_season = values[values.len() - self.period..].to_vec();
        let last_ds = *timestamps.last().ok_or_else(|| {
            ForecastError::DataError("Empty time series data".to_string())
        })?;

        Ok(TrainedSeasonalNaive {
            name: self.name.clone(),
            period: self.period,
            n_forecasts: self.n_forecasts,
            last_season,
            last_ds,
            frequency,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedSeasonalNaive {
    fn predict(&self, data: &TimeSeriesData) -> Result<RawPredictions> {
        let values = data.values()?;
        let timestamps = data.timestamps()?;

        if values.len() < self.period + self.n_forecasts {
            return Err(ForecastError::ValidationError(format!(
                "Insufficient data to predict with {}. Need at least {} observations.",
                self.name,
                self.period + self.n_forecasts
            )));
        }

        // Origins where a full season of history and the full horizon fit
        let origins = self.period - 1..=values.len() - 1 - self.n_forecasts;
        let mut targets = Vec::new();
        let mut predicted = Vec::new();

        for o in origins {
            let row_values: Vec<f64> = (0..self.n_forecasts)
                .map(|j| values[o + 1 + j - self.period])
                .collect();
            targets.push(timestamps[o + 1..=o + self.n_forecasts].to_vec());
            predicted.push(row_values);
        }

        let seasonal = predicted.clone();
        RawPredictions::new(targets, predicted, self.n_forecasts)?
            .with_component("seasonal", seasonal)
    }

    fn forecast(&self) -> Result<RawPredictions> {
        let row_values: Vec<f64> = (0..self.n_forecasts)
            .map(|j| self.last_season[j % self.period])
            .collect();

        let mut row_targets = Vec::with_capacity(self.n_forecasts);
        for j in 0..self.n_forecasts {
            row_targets.push(self.frequency.advance(self.last_ds, j + 1)?);
        }

        let seasonal = vec![row_values.clone()];
        RawPredictions::new(vec![row_targets], vec![row_values], self.n_forecasts)?
            .with_component("seasonal", seasonal)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
