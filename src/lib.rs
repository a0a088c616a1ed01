//! # Forecast Frame
//!
//! A Rust library for fitting simple multi-horizon time series models and
//! retrieving their predictions as forecast tables.
//!
//! ## Features
//!
//! - Time series data handling on polars DataFrames (`ds` + `y` columns)
//! - Multi-horizon forecasting models (lagged linear regression, seasonal naive)
//! - Target-indexed forecast tables: one row per predicted timestamp, one
//!   `yhat<k>` column per prediction age
//! - Origin-indexed forecast tables: one row per forecast origin, one
//!   `step<k>` column per horizon step
//! - Latest-forecast view with a configurable number of older forecasts
//! - Optional residual and decomposed component columns
//! - Per-horizon forecast accuracy metrics
//!
//! Missing cells in every view are polars nulls, never zero and never NaN.
//!
//! ## Quick Start
//!
//! ```no_run
//! use forecast_frame::data::DataLoader;
//! use forecast_frame::models::linear_ar::LinearAr;
//! use forecast_frame::models::{ForecastModel, TrainedForecastModel};
//! use forecast_frame::reshape::{self, ReshapeOptions};
//!
//! fn main() -> Result<(), forecast_frame::ForecastError> {
//!     // Load data with a timestamp and a value column
//!     let data = DataLoader::from_csv("data.csv")?;
//!
//!     // Fit a model with 5 lagged inputs and a 3-step horizon
//!     let model = LinearAr::new(5, 3)?;
//!     let trained = model.train(&data)?;
//!
//!     // In-sample predictions, one origin per window position
//!     let raw = trained.predict(&data)?;
//!
//!     // Target-indexed view: yhat1..yhat3 per predicted timestamp
//!     let forecast = reshape::target_indexed(&data, &raw, &ReshapeOptions::default())?;
//!     println!("{}", forecast);
//!
//!     // Only the latest forecast, with the two previous ones kept
//!     let latest = reshape::latest_forecast(&data, &raw, 2, false)?;
//!     println!("{}", latest);
//!
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod reshape;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{DataLoader, TimeSeriesData};
pub use crate::error::ForecastError;
pub use crate::models::{ForecastModel, RawPredictions, TrainedForecastModel};
pub use crate::reshape::{latest_forecast, origin_indexed, target_indexed, ReshapeOptions};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
