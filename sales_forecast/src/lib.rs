//! # Sales Forecast
//!
//! Date-range sales forecasting with a durable, append-only history of every
//! forecast produced.
//!
//! ## Features
//!
//! - Calendar features (day, month, day of week) derived from a date range
//! - Batch prediction through any [`Predictor`], including a JSON-exported regression forest
//! - Rounded, run-stamped forecast batches
//! - A CSV history ledger with strict schema checks on reload
//! - DataFrame views for display
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use sales_forecast::{DateRange, ForecastService, HistoryStore, RegressionForest};
//!
//! let model = RegressionForest::from_json_file("model_rf.json")?;
//! let service = ForecastService::new(model, HistoryStore::new("riwayat_prediksi.csv"));
//!
//! let range = DateRange::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
//! )?;
//!
//! // Forecast and record
//! let batch = service.forecast_and_record(&range)?;
//! println!("{}", batch.to_dataframe()?);
//!
//! // Review everything recorded so far
//! let history = service.history()?;
//! println!("{} forecasts in {} runs", history.len(), history.runs().len());
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod frame;
pub mod history;
pub mod predictor;
pub mod runner;
pub mod service;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::error::{ForecastError, Result};
pub use crate::features::{DateRange, FeatureBuilder, FeatureRow};
pub use crate::history::{HistoryLedger, HistoryStore};
pub use crate::predictor::{Predictor, RegressionForest};
pub use crate::runner::{round_quantity, ForecastBatch, ForecastEntry, ForecastRunner};
pub use crate::service::ForecastService;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
