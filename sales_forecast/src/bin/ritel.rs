//! # ritel
//!
//! Command-line front end for sales forecasting and forecast history.

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use sales_forecast::{AppConfig, DateRange, ForecastService, HistoryStore, RegressionForest};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ritel")]
#[command(about = "Sales forecasting with a persistent forecast history", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact, overriding the configuration
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// History ledger file, overriding the configuration
    #[arg(long, global = true)]
    history_file: Option<PathBuf>,

    /// Log filter, overriding the configuration (RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// The two screens of the application
#[derive(Subcommand)]
enum Commands {
    /// Forecast sales for a date range and record the result
    Forecast {
        /// First date to forecast (default: today)
        #[arg(short, long)]
        start: Option<NaiveDate>,

        /// Last date to forecast, inclusive (default: start + 6 days)
        #[arg(short, long)]
        end: Option<NaiveDate>,

        /// Show the forecast without recording it
        #[arg(long)]
        no_save: bool,
    },

    /// Review recorded forecasts
    History {
        /// Delete every recorded forecast
        #[arg(long)]
        clear: bool,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Last day of the default one-week window starting at `start`
fn default_end(start: NaiveDate) -> Result<NaiveDate> {
    start
        .checked_add_signed(Duration::days(6))
        .with_context(|| format!("no default end date: {} + 6 days is out of range", start))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(model) = cli.model {
        config.model_path = model;
    }
    if let Some(history) = cli.history_file {
        config.history_path = history;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    init_logging(&config.log_level);

    let store = HistoryStore::new(&config.history_path);

    match cli.command {
        Commands::Forecast {
            start,
            end,
            no_save,
        } => {
            let start = start.unwrap_or_else(|| Local::now().date_naive());
            let end = match end {
                Some(end) => end,
                None => default_end(start)?,
            };
            let range = match DateRange::new(start, end) {
                Ok(range) => range,
                Err(e) => {
                    eprintln!("Warning: {}", e);
                    std::process::exit(2);
                }
            };

            let model = RegressionForest::from_json_file(&config.model_path)
                .with_context(|| format!("loading model {}", config.model_path.display()))?;
            let service = ForecastService::new(model, store);

            let batch = if no_save {
                service.preview(&range)?
            } else {
                service
                    .forecast_and_record(&range)
                    .with_context(|| format!("forecasting {} to {}", start, end))?
            };

            println!("Forecast created at {}", batch.created_at());
            println!("{}", batch.to_dataframe()?);
            println!("Total predicted sales: {}", batch.total_quantity());
            if !no_save {
                println!("Saved to {}", config.history_path.display());
            }
        }
        Commands::History { clear } => {
            if clear {
                store
                    .clear()
                    .with_context(|| format!("clearing {}", store.path().display()))?;
                println!("All forecast history deleted.");
                return Ok(());
            }

            let ledger = store
                .load()
                .with_context(|| format!("reading {}", store.path().display()))?;
            if ledger.is_empty() {
                println!("No forecast history recorded yet.");
                return Ok(());
            }

            println!("{}", ledger.to_dataframe()?);
            println!("Runs:");
            for run in ledger.runs() {
                println!(
                    "  {}  {} days, total {}",
                    run.created_at(),
                    run.len(),
                    run.total_quantity()
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_end_spans_one_week() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
        assert_eq!(
            default_end(start).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
        );
    }

    #[test]
    fn test_default_end_near_max_date_is_an_error() {
        let err = default_end(NaiveDate::MAX).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
