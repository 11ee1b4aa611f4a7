//! Startup configuration: where the model and the ledger live

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default model artifact location
pub const DEFAULT_MODEL_PATH: &str = "model_rf.json";
/// Default ledger location
pub const DEFAULT_HISTORY_PATH: &str = "riwayat_prediksi.csv";

/// Application configuration, read once at startup
///
/// ```toml
/// model_path = "models/model_rf.json"
/// history_path = "data/riwayat_prediksi.csv"
/// log_level = "debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// JSON regression forest artifact
    pub model_path: PathBuf,
    /// CSV forecast ledger
    pub history_path: PathBuf,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ForecastError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ForecastError::ConfigError(msg) => {
                ForecastError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse configuration from TOML text; omitted keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ForecastError::ConfigError(e.to_string()))?;
        if config.log_level.trim().is_empty() {
            return Err(ForecastError::ConfigError(
                "log_level must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Read `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
