//! Forecast accuracy metrics

use crate::error::{ForecastError, Result};
use polars::prelude::*;

/// Forecast accuracy metrics
#[derive(Debug, Clone)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::ValidationError(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;

    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let mape = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .sum::<f64>()
        / n;

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let abs_a = a.abs();
            let abs_f = f.abs();
            if abs_a + abs_f == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / (abs_a + abs_f)
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

/// Per-age accuracy over a target-indexed forecast table.
///
/// Returns one entry per `yhat<k>` column, computed over the rows where
/// both the prediction and the observed value are present.
pub fn horizon_accuracy(forecast_table: &DataFrame) -> Result<Vec<(usize, ForecastAccuracy)>> {
    let y = forecast_table
        .column("y")
        .map_err(|_| ForecastError::ValidationError("Missing 'y' column".to_string()))?
        .f64()?;

    let mut result = Vec::new();
    for age in 1.. {
        let name = format!("yhat{}", age);
        let col = match forecast_table.column(&name) {
            Ok(col) => col.f64()?,
            Err(_) => break,
        };

        let mut predicted = Vec::new();
        let mut actual = Vec::new();
        for (pred, obs) in col.into_iter().zip(y.into_iter()) {
            if let (Some(p), Some(a)) = (pred, obs) {
                predicted.push(p);
                actual.push(a);
            }
        }

        if !predicted.is_empty() {
            result.push((age, forecast_accuracy(&predicted, &actual)?));
        }
    }

    if result.is_empty() {
        return Err(ForecastError::ValidationError(
            "No yhat columns with observed values in the forecast table".to_string(),
        ));
    }

    Ok(result)
}
