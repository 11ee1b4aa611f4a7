//! Calendar features derived from a forecast date range

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of features the model consumes per row
pub const FEATURE_COUNT: usize = 3;

/// Feature names in the column order the model was trained on
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["day", "month", "dayofweek"];

/// Inclusive calendar date range with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a new date range, rejecting ranges that end before they start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ForecastError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First date of the range
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the range (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included
    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Iterate over every date in the range in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Re-check the ordering invariant. Deserialized ranges bypass `new`.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(ForecastError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Model input features for one calendar date
///
/// `day_of_week` counts from Monday = 0 to Sunday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Day of month, 1-31
    pub day: u32,
    /// Month, 1-12
    pub month: u32,
    /// Day of week, Monday = 0
    pub day_of_week: u32,
}

impl FeatureRow {
    /// Derive the features of a single date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            day: date.day(),
            month: date.month(),
            day_of_week: date.weekday().num_days_from_monday(),
        }
    }

    /// Features as model input, ordered like [`FEATURE_NAMES`]
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [self.day as f64, self.month as f64, self.day_of_week as f64]
    }
}

/// Builds feature matrices from date ranges
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    /// One feature row per date in the range, ascending
    pub fn build(range: &DateRange) -> Result<Vec<FeatureRow>> {
        Ok(Self::build_dated(range)?
            .into_iter()
            .map(|(_, row)| row)
            .collect())
    }

    /// Like [`FeatureBuilder::build`], keeping each row's date alongside it
    pub fn build_dated(range: &DateRange) -> Result<Vec<(NaiveDate, FeatureRow)>> {
        range.validate()?;

        let mut rows = Vec::with_capacity(range.num_days());
        for date in range.dates() {
            rows.push((date, FeatureRow::from_date(date)));
        }

        tracing::debug!(
            start = %range.start(),
            end = %range.end(),
            rows = rows.len(),
            "built feature rows"
        );
        Ok(rows)
    }
}
