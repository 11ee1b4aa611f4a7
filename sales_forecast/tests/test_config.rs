use sales_forecast::config::{DEFAULT_HISTORY_PATH, DEFAULT_MODEL_PATH};
use sales_forecast::{AppConfig, ForecastError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[test]
fn test_defaults() {
    let config = AppConfig::load(None).unwrap();
    assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    assert_eq!(config.history_path, PathBuf::from(DEFAULT_HISTORY_PATH));
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_partial_file_keeps_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "history_path = \"data/riwayat.csv\"").unwrap();

    let config = AppConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.history_path, PathBuf::from("data/riwayat.csv"));
    assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
}

#[test]
fn test_full_file() {
    let config = AppConfig::from_toml_str(
        r#"
        model_path = "models/rf.json"
        history_path = "/var/lib/ritel/history.csv"
        log_level = "debug"
        "#,
    )
    .unwrap();
    assert_eq!(config.model_path, PathBuf::from("models/rf.json"));
    assert_eq!(config.history_path, PathBuf::from("/var/lib/ritel/history.csv"));
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_invalid_configs_rejected() {
    for text in ["history = \"x.csv\"", "log_level = \"\"", "model_path = 5"] {
        assert!(
            matches!(
                AppConfig::from_toml_str(text),
                Err(ForecastError::ConfigError(_))
            ),
            "accepted: {}",
            text
        );
    }
}

#[test]
fn test_missing_explicit_file_is_error() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/ritel.toml")));
    match result {
        Err(ForecastError::ConfigError(msg)) => assert!(msg.contains("/nonexistent/ritel.toml")),
        other => panic!("Expected ConfigError, got {:?}", other),
    }
}
