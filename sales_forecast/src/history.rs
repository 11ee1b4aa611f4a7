//! Durable, append-only ledger of past forecasts
//!
//! The ledger is a CSV file with a fixed header:
//!
//! ```text
//! Tanggal,Prediksi Penjualan,Tanggal Prediksi Dibuat
//! 2024-01-01,10,2024-01-01 08:30:00
//! ```
//!
//! Every write replaces the whole file through a temporary sibling that is
//! renamed over the target, so a reader sees either the old or the new ledger.

use crate::error::{ForecastError, Result};
use crate::runner::{ForecastBatch, ForecastEntry};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Column holding the forecasted date
pub const DATE_COLUMN: &str = "Tanggal";
/// Column holding the predicted quantity
pub const QUANTITY_COLUMN: &str = "Prediksi Penjualan";
/// Column holding the run timestamp
pub const CREATED_AT_COLUMN: &str = "Tanggal Prediksi Dibuat";

/// Ledger columns in write order
pub const LEDGER_COLUMNS: [&str; 3] = [DATE_COLUMN, QUANTITY_COLUMN, CREATED_AT_COLUMN];

/// Date format used when writing the ledger
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Timestamp format used when writing the ledger
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TIMESTAMP_READ_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// All forecasts ever recorded, in append order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLedger {
    entries: Vec<ForecastEntry>,
}

impl HistoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in append order
    pub fn entries(&self) -> &[ForecastEntry] {
        &self.entries
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in append order
    pub fn iter(&self) -> std::slice::Iter<'_, ForecastEntry> {
        self.entries.iter()
    }

    /// Consume the ledger, yielding its entries
    pub fn into_entries(self) -> Vec<ForecastEntry> {
        self.entries
    }

    /// Group entries into runs by `created_at`, in order of first appearance
    pub fn runs(&self) -> Vec<ForecastBatch> {
        let mut index: HashMap<NaiveDateTime, usize> = HashMap::new();
        let mut groups: Vec<(NaiveDateTime, Vec<ForecastEntry>)> = Vec::new();

        for entry in &self.entries {
            let slot = *index.entry(entry.created_at).or_insert_with(|| {
                groups.push((entry.created_at, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(entry.clone());
        }

        groups
            .into_iter()
            .map(|(created_at, entries)| ForecastBatch::from_parts(created_at, entries))
            .collect()
    }
}

impl<'a> IntoIterator for &'a HistoryLedger {
    type Item = &'a ForecastEntry;
    type IntoIter = std::slice::Iter<'a, ForecastEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Row shape on disk when writing
#[derive(Debug, Serialize)]
struct LedgerRow {
    #[serde(rename = "Tanggal")]
    date: String,
    #[serde(rename = "Prediksi Penjualan")]
    predicted_quantity: u64,
    #[serde(rename = "Tanggal Prediksi Dibuat")]
    created_at: String,
}

impl From<&ForecastEntry> for LedgerRow {
    fn from(entry: &ForecastEntry) -> Self {
        Self {
            date: entry.date.format(DATE_FORMAT).to_string(),
            predicted_quantity: entry.predicted_quantity,
            created_at: entry.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Row shape on disk when reading; cells are parsed separately for precise errors
#[derive(Debug, Deserialize)]
struct RawLedgerRow {
    #[serde(rename = "Tanggal")]
    date: String,
    #[serde(rename = "Prediksi Penjualan")]
    predicted_quantity: String,
    #[serde(rename = "Tanggal Prediksi Dibuat")]
    created_at: String,
}

/// File-backed store for the forecast ledger
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Create a store backed by the file at `path`. Nothing is touched on disk.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Location of the ledger file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a ledger file currently exists
    pub fn exists(&self) -> Result<bool> {
        self.path
            .try_exists()
            .map_err(|e| ForecastError::storage("stat", &self.path, e))
    }

    /// Read every recorded entry. A missing file is an empty ledger.
    pub fn load(&self) -> Result<HistoryLedger> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no history file yet");
                return Ok(HistoryLedger::new());
            }
            Err(e) => return Err(ForecastError::storage("load", &self.path, e)),
        };

        let entries = self.read_entries(BufReader::new(file))?;
        tracing::debug!(
            path = %self.path.display(),
            entries = entries.len(),
            "loaded history"
        );
        Ok(HistoryLedger { entries })
    }

    /// Append a forecast batch after every existing entry
    pub fn append(&self, batch: &ForecastBatch) -> Result<()> {
        self.append_entries(batch.entries())
    }

    /// Append entries after every existing entry, preserving their order
    ///
    /// The existing ledger is read, merged in memory and written back in one
    /// whole-file replace. Appending nothing leaves the store untouched.
    pub fn append_entries(&self, entries: &[ForecastEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut ledger = self.load()?;
        let previous = ledger.len();
        ledger.entries.extend_from_slice(entries);
        self.write_all(&ledger.entries)?;

        tracing::info!(
            path = %self.path.display(),
            appended = entries.len(),
            total = previous + entries.len(),
            "appended forecasts to history"
        );
        Ok(())
    }

    /// Remove all recorded history. Clearing a missing ledger succeeds.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "cleared history");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ForecastError::storage("clear", &self.path, e)),
        }
    }

    fn read_entries<R: io::Read>(&self, reader: R) -> Result<Vec<ForecastEntry>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| self.csv_error("load", e))?
            .clone();
        let headers = csv::StringRecord::from(headers.iter().map(str::trim).collect::<Vec<_>>());

        for column in LEDGER_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ForecastError::corrupt(
                    &self.path,
                    1,
                    format!("missing column '{}'", column),
                ));
            }
        }
        for extra in headers.iter().filter(|h| !LEDGER_COLUMNS.contains(h)) {
            tracing::warn!(
                path = %self.path.display(),
                column = extra,
                "ignoring unknown history column"
            );
        }

        let mut entries = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| self.csv_error("load", e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.len() < headers.len() {
                return Err(ForecastError::corrupt(
                    &self.path,
                    line,
                    format!(
                        "expected {} fields, found {}",
                        headers.len(),
                        record.len()
                    ),
                ));
            }

            let raw: RawLedgerRow = record
                .deserialize(Some(&headers))
                .map_err(|e| ForecastError::corrupt(&self.path, line, e.to_string()))?;

            let date = parse_date(&raw.date).map_err(|reason| {
                ForecastError::corrupt(&self.path, line, format!("{}: {}", DATE_COLUMN, reason))
            })?;
            let predicted_quantity = parse_quantity(&raw.predicted_quantity).map_err(|reason| {
                ForecastError::corrupt(
                    &self.path,
                    line,
                    format!("{}: {}", QUANTITY_COLUMN, reason),
                )
            })?;
            let created_at = parse_timestamp(&raw.created_at).map_err(|reason| {
                ForecastError::corrupt(
                    &self.path,
                    line,
                    format!("{}: {}", CREATED_AT_COLUMN, reason),
                )
            })?;

            entries.push(ForecastEntry {
                date,
                predicted_quantity,
                created_at,
            });
        }

        Ok(entries)
    }

    fn write_all(&self, entries: &[ForecastEntry]) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| ForecastError::storage("append", &parent, e))?;

        let mut temp =
            NamedTempFile::new_in(&parent).map_err(|e| ForecastError::storage("append", &parent, e))?;
        {
            let mut writer = csv::Writer::from_writer(&mut temp);
            for entry in entries {
                writer
                    .serialize(LedgerRow::from(entry))
                    .map_err(|e| self.csv_error("append", e))?;
            }
            writer
                .flush()
                .map_err(|e| ForecastError::storage("append", &self.path, e))?;
        }
        temp.flush()
            .map_err(|e| ForecastError::storage("append", &self.path, e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| ForecastError::storage("append", &self.path, e))?;

        temp.persist(&self.path)
            .map_err(|e| ForecastError::storage("append", &self.path, e.error))?;
        Ok(())
    }

    fn csv_error(&self, operation: &'static str, err: csv::Error) -> ForecastError {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => ForecastError::storage(operation, &self.path, source),
            _ => ForecastError::corrupt(&self.path, line, message),
        }
    }
}

/// Parse a ledger date. Datetime forms are accepted when the time is midnight.
fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty value".to_string());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Ok(date);
    }

    let stamp = parse_timestamp(raw)?;
    if stamp.time() != NaiveTime::MIN {
        return Err(format!("'{}' carries a time of day", raw));
    }
    Ok(stamp.date())
}

/// Parse a ledger timestamp. Bare dates mean midnight.
///
/// A zero fraction (`08:30:00.000`) is accepted; any sub-second value is an
/// error since the ledger only stores whole seconds.
fn parse_timestamp(raw: &str) -> std::result::Result<NaiveDateTime, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty value".to_string());
    }

    for format in TIMESTAMP_READ_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, format) {
            if stamp.nanosecond() != 0 {
                return Err(format!("'{}' has sub-second precision", raw));
            }
            return Ok(stamp);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(format!("'{}' is not a recognised date or timestamp", raw))
}

fn parse_quantity(raw: &str) -> std::result::Result<u64, String> {
    let raw = raw.trim();
    raw.parse::<u64>()
        .map_err(|_| format!("'{}' is not a non-negative integer", raw))
}
