//! Entry points used by the presentation layer

use crate::error::Result;
use crate::features::DateRange;
use crate::history::{HistoryLedger, HistoryStore};
use crate::predictor::Predictor;
use crate::runner::{ForecastBatch, ForecastRunner};

/// Forecasting and history operations over one predictor and one ledger
///
/// Holds no state between calls beyond the loaded predictor and the ledger
/// location, so callers may switch between forecasting and reviewing freely.
#[derive(Debug)]
pub struct ForecastService<P> {
    runner: ForecastRunner<P>,
    store: HistoryStore,
}

impl<P: Predictor> ForecastService<P> {
    /// Create a service from a loaded predictor and a history store
    pub fn new(predictor: P, store: HistoryStore) -> Self {
        Self {
            runner: ForecastRunner::new(predictor),
            store,
        }
    }

    /// The underlying runner
    pub fn runner(&self) -> &ForecastRunner<P> {
        &self.runner
    }

    /// The underlying history store
    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Forecast the range without recording it
    pub fn preview(&self, range: &DateRange) -> Result<ForecastBatch> {
        self.runner.run(range)
    }

    /// Forecast the range and append the result to history
    ///
    /// Nothing is recorded if the forecast fails, including when the runner
    /// rejects the range.
    pub fn forecast_and_record(&self, range: &DateRange) -> Result<ForecastBatch> {
        let batch = self.runner.run(range)?;
        self.store.append(&batch)?;
        Ok(batch)
    }

    /// Load every recorded forecast
    pub fn history(&self) -> Result<HistoryLedger> {
        self.store.load()
    }

    /// Delete all recorded forecasts
    pub fn clear_history(&self) -> Result<()> {
        self.store.clear()
    }
}
