//! Turns a date range into a batch of rounded sales forecasts

use crate::error::{ForecastError, Result};
use crate::features::{DateRange, FeatureBuilder, FeatureRow};
use crate::predictor::Predictor;
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// One forecasted day
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Forecasted calendar date
    pub date: NaiveDate,
    /// Rounded, non-negative predicted quantity
    pub predicted_quantity: u64,
    /// When the run that produced this entry started, to the second
    pub created_at: NaiveDateTime,
}

/// All entries produced by a single run, sharing one `created_at`
///
/// Only the runner and the ledger build batches, so the shared stamp always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastBatch {
    created_at: NaiveDateTime,
    entries: Vec<ForecastEntry>,
}

impl ForecastBatch {
    pub(crate) fn from_parts(created_at: NaiveDateTime, entries: Vec<ForecastEntry>) -> Self {
        Self {
            created_at,
            entries,
        }
    }

    /// Timestamp shared by every entry
    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Entries in ascending date order
    pub fn entries(&self) -> &[ForecastEntry] {
        &self.entries
    }

    /// Number of forecasted days
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of predicted quantities over the batch
    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| e.predicted_quantity).sum()
    }

    /// Consume the batch, yielding its entries
    pub fn into_entries(self) -> Vec<ForecastEntry> {
        self.entries
    }
}

/// Round a raw model output to a sales quantity.
///
/// Ties round half to even (10.5 -> 10, 11.5 -> 12). Negative outputs clamp
/// to 0. NaN, infinities and values beyond `u64::MAX` are rejected.
pub fn round_quantity(raw: f64) -> Result<u64> {
    if !raw.is_finite() {
        return Err(ForecastError::PredictionMismatch(format!(
            "Predictor returned a non-finite value: {}",
            raw
        )));
    }

    let rounded = raw.round_ties_even();
    if rounded < 0.0 {
        tracing::warn!(raw, "negative prediction clamped to zero");
        return Ok(0);
    }
    // u64::MAX as f64 is 2^64, the first value that no longer fits
    if rounded >= u64::MAX as f64 {
        return Err(ForecastError::PredictionMismatch(format!(
            "Predictor returned {} which exceeds the largest storable quantity",
            raw
        )));
    }
    Ok(rounded as u64)
}

/// Current local time truncated to whole seconds
pub fn now_to_second() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Runs a predictor over the features of a date range
#[derive(Debug)]
pub struct ForecastRunner<P> {
    predictor: P,
}

impl<P: Predictor> ForecastRunner<P> {
    /// Create a runner around a loaded predictor
    pub fn new(predictor: P) -> Self {
        Self { predictor }
    }

    /// The predictor this runner uses
    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Forecast every date in the range, stamped with the current time
    pub fn run(&self, range: &DateRange) -> Result<ForecastBatch> {
        self.run_at(range, now_to_second())
    }

    /// Forecast every date in the range, stamped with `created_at`
    ///
    /// Either every date gets an entry or the call fails; no partial batch is
    /// ever returned.
    pub fn run_at(&self, range: &DateRange, created_at: NaiveDateTime) -> Result<ForecastBatch> {
        range.validate()?;

        let dated = FeatureBuilder::build_dated(range)?;
        let rows: Vec<FeatureRow> = dated.iter().map(|(_, row)| *row).collect();

        let raw = self.predictor.predict(&rows).map_err(|e| match e {
            ForecastError::PredictionMismatch(_) => e,
            other => ForecastError::PredictionMismatch(format!(
                "{} failed on {} rows: {}",
                self.predictor.name(),
                rows.len(),
                other
            )),
        })?;

        if raw.len() != rows.len() {
            return Err(ForecastError::PredictionMismatch(format!(
                "{} returned {} values for {} feature rows ({} to {})",
                self.predictor.name(),
                raw.len(),
                rows.len(),
                range.start(),
                range.end()
            )));
        }

        let entries = dated
            .into_iter()
            .zip(raw)
            .map(|((date, _), value)| {
                Ok(ForecastEntry {
                    date,
                    predicted_quantity: round_quantity(value)?,
                    created_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            model = self.predictor.name(),
            rows = entries.len(),
            %created_at,
            "forecast run complete"
        );

        Ok(ForecastBatch {
            created_at,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_quantity_ties_to_even() {
        assert_eq!(round_quantity(10.4).unwrap(), 10);
        assert_eq!(round_quantity(10.5).unwrap(), 10);
        assert_eq!(round_quantity(10.6).unwrap(), 11);
        assert_eq!(round_quantity(11.5).unwrap(), 12);
        assert_eq!(round_quantity(0.5).unwrap(), 0);
    }

    #[test]
    fn test_round_quantity_clamps_and_rejects() {
        assert_eq!(round_quantity(-3.2).unwrap(), 0);
        assert!(round_quantity(f64::NAN).is_err());
        assert!(round_quantity(f64::INFINITY).is_err());
    }

    #[test]
    fn test_round_quantity_rejects_unrepresentable() {
        assert!(matches!(
            round_quantity(1e30),
            Err(ForecastError::PredictionMismatch(_))
        ));
        assert!(round_quantity(18_446_744_073_709_551_616.0).is_err());
        assert_eq!(round_quantity(9_007_199_254_740_992.0).unwrap(), 9_007_199_254_740_992);
    }
}
