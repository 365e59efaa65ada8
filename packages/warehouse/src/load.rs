//! Creates the crash table and fills it from a CSV export.
//!
//! Headers are matched case-insensitively. `DATE` is required; `HOUR`,
//! `DAYOFWEEKNAME` and `MONTHNAME` are derived from it when blank.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, Timelike as _};
use crash_dashboard_crash_models::{CrashRecord, DayOfWeek, Month};
use crash_dashboard_query::TableRef;
use csv::StringRecord;
use duckdb::{Connection, params};
use serde::Deserialize;

use crate::WarehouseError;
use crate::progress::ProgressCallback;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

/// Rows between progress updates.
const PROGRESS_INTERVAL: u64 = 1_000;

/// Result of a CSV load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Rows written to the table.
    pub inserted: u64,
    /// Rows dropped because they had no usable `DATE`.
    pub skipped: u64,
}

#[derive(Debug, Deserialize)]
struct RawCrashRow {
    #[serde(rename = "DATE", default)]
    date: Option<String>,
    #[serde(rename = "HOUR", default, deserialize_with = "csv::invalid_option")]
    hour: Option<f64>,
    #[serde(rename = "DAYOFWEEKNAME", default)]
    day_of_week: Option<String>,
    #[serde(rename = "MONTHNAME", default)]
    month: Option<String>,
    #[serde(rename = "SEVERITY_CATEGORY", default)]
    severity: Option<String>,
    #[serde(rename = "INTASTREETNAME", default)]
    street_a: Option<String>,
    #[serde(rename = "INTBSTREETNAME", default)]
    street_b: Option<String>,
    #[serde(rename = "LATITUDE", default, deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(rename = "LONGITUDE", default, deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
}

impl RawCrashRow {
    fn into_record(self) -> Option<CrashRecord> {
        let (date, time_hour) = parse_date(self.date.as_deref()?)?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let hour = self
            .hour
            .filter(|h| h.fract() == 0.0 && (0.0..24.0).contains(h))
            .map(|h| h as u8)
            .or(time_hour);

        let day_of_week = non_blank(self.day_of_week)
            .and_then(|d| d.parse().ok())
            .unwrap_or_else(|| DayOfWeek::from_date(date));
        let month = non_blank(self.month)
            .and_then(|m| m.parse().ok())
            .unwrap_or_else(|| Month::from_date(date));

        Some(CrashRecord {
            date,
            hour,
            day_of_week,
            month,
            severity: non_blank(self.severity),
            street_a: non_blank(self.street_a),
            street_b: non_blank(self.street_b),
            latitude: self.latitude.filter(|v| v.is_finite()),
            longitude: self.longitude.filter(|v| v.is_finite()),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a crash date, returning the hour as well when the value carries a
/// time of day.
fn parse_date(value: &str) -> Option<(NaiveDate, Option<u8>)> {
    let value = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some((dt.date(), u8::try_from(dt.hour()).ok()));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some((date, None));
        }
    }
    None
}

/// Creates the crash table. With `replace`, an existing table is dropped
/// first; otherwise an existing table is kept as is.
///
/// # Errors
///
/// Returns [`WarehouseError::DuckDb`] if the statement fails.
pub fn create_table(
    conn: &Connection,
    table: &TableRef,
    replace: bool,
) -> Result<(), WarehouseError> {
    let create = if replace {
        "CREATE OR REPLACE TABLE"
    } else {
        "CREATE TABLE IF NOT EXISTS"
    };
    conn.execute_batch(&format!(
        "{create} {table} (
            \"DATE\" DATE,
            HOUR INTEGER,
            DAYOFWEEKNAME TEXT,
            MONTHNAME TEXT,
            SEVERITY_CATEGORY TEXT,
            INTASTREETNAME TEXT,
            INTBSTREETNAME TEXT,
            LATITUDE DOUBLE,
            LONGITUDE DOUBLE
        )"
    ))?;
    log::info!("Crash table {table} ready (replace={replace})");
    Ok(())
}

/// Loads the CSV file at `path` into `table`, reporting progress in bytes.
///
/// # Errors
///
/// Returns [`WarehouseError`] if the file cannot be read, the header row is
/// malformed or an insert fails. Individual rows without a usable `DATE` are
/// skipped, not treated as errors.
pub fn load_csv(
    conn: &mut Connection,
    table: &TableRef,
    path: &Path,
    progress: &dyn ProgressCallback,
) -> Result<LoadSummary, WarehouseError> {
    let file = File::open(path)?;
    progress.set_total(file.metadata()?.len());
    progress.set_message(format!("Loading {}", path.display()));

    let summary = load_reader(conn, table, file, progress)?;

    progress.finish(format!(
        "Loaded {} crashes ({} skipped)",
        summary.inserted, summary.skipped
    ));
    Ok(summary)
}

/// Loads CSV data from any reader into `table` inside one transaction.
///
/// # Errors
///
/// See [`load_csv`].
pub fn load_reader<R: Read>(
    conn: &mut Connection,
    table: &TableRef,
    source: R,
    progress: &dyn ProgressCallback,
) -> Result<LoadSummary, WarehouseError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: StringRecord = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_uppercase())
        .collect();
    if !headers.iter().any(|h| h == "DATE") {
        return Err(WarehouseError::Conversion {
            message: "CSV has no DATE column".to_string(),
        });
    }
    reader.set_headers(headers);

    let tx = conn.transaction()?;
    let mut summary = LoadSummary::default();
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {table} VALUES (CAST(? AS DATE), ?, ?, ?, ?, ?, ?, ?, ?)"
        ))?;

        let mut rows = reader.deserialize::<RawCrashRow>();
        let mut line = 1_u64;
        while let Some(row) = rows.next() {
            line += 1;
            let record = match row {
                Ok(raw) => raw.into_record(),
                Err(e) => {
                    log::warn!("Skipping CSV line {line}: {e}");
                    None
                }
            };
            let Some(record) = record else {
                summary.skipped += 1;
                continue;
            };

            stmt.execute(params![
                record.date.format("%Y-%m-%d").to_string(),
                record.hour.map(i32::from),
                record.day_of_week.as_ref(),
                record.month.as_ref(),
                record.severity,
                record.street_a,
                record.street_b,
                record.latitude,
                record.longitude,
            ])?;
            summary.inserted += 1;

            if summary.inserted % PROGRESS_INTERVAL == 0 {
                progress.set_position(rows.reader().position().byte());
            }
        }
    }
    tx.commit()?;

    if summary.skipped > 0 {
        log::warn!("Skipped {} rows without a usable DATE", summary.skipped);
    }
    log::info!("Inserted {} rows into {table}", summary.inserted);
    Ok(summary)
}
