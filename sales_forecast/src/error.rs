//! Error types for the sales_forecast crate

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The requested range ends before it starts
    #[error("Invalid range: end date {end} precedes start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The predictor failed or returned the wrong number of values
    #[error("Prediction mismatch: {0}")]
    PredictionMismatch(String),

    /// The persisted ledger does not match the expected schema
    #[error("Corrupt history in {} (line {line}): {reason}", .path.display())]
    CorruptHistory {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// The ledger file could not be read or written
    #[error("Storage unavailable during {operation} of {}: {source}", .path.display())]
    StorageUnavailable {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The model artifact could not be loaded or is structurally invalid
    #[error("Model error: {0}")]
    ModelError(String),

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from IO operations outside the ledger
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl ForecastError {
    pub(crate) fn storage(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        ForecastError::StorageUnavailable {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, line: u64, reason: impl Into<String>) -> Self {
        ForecastError::CorruptHistory {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}
