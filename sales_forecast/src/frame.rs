//! Tabular views of forecasts for presentation

use crate::error::Result;
use crate::history::{HistoryLedger, CREATED_AT_COLUMN, DATE_COLUMN, QUANTITY_COLUMN};
use crate::runner::{ForecastBatch, ForecastEntry};
use chrono::Datelike;
use polars::prelude::*;

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Build a DataFrame with the ledger columns: `Date`, `UInt64`, `Datetime[ms]`
pub fn entries_to_dataframe(entries: &[ForecastEntry]) -> Result<DataFrame> {
    let days: Vec<i32> = entries
        .iter()
        .map(|e| e.date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    let quantities: Vec<u64> = entries.iter().map(|e| e.predicted_quantity).collect();
    let stamps: Vec<i64> = entries
        .iter()
        .map(|e| e.created_at.and_utc().timestamp_millis())
        .collect();

    let date_series = Series::new(DATE_COLUMN, days).cast(&DataType::Date)?;
    let quantity_series = Series::new(QUANTITY_COLUMN, quantities);
    let created_series = Series::new(CREATED_AT_COLUMN, stamps)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    Ok(DataFrame::new(vec![
        date_series,
        quantity_series,
        created_series,
    ])?)
}

impl ForecastBatch {
    /// The batch as a DataFrame
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        entries_to_dataframe(self.entries())
    }
}

impl HistoryLedger {
    /// The whole ledger as a DataFrame, in append order
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        entries_to_dataframe(self.entries())
    }
}
