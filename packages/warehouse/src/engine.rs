//! Embedded `DuckDB` warehouse backend.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{Days, NaiveDate};
use crash_dashboard_warehouse_models::{Row, ScalarValue, TabularResult};
use duckdb::types::Value;
use duckdb::{AccessMode, Config, Connection};

use crate::{Warehouse, WarehouseError};

/// Round-robin pool of `DuckDB` connections to one database.
///
/// `duckdb::Connection` is `Send` but not `Sync`, so each connection is
/// wrapped in a `Mutex`. All connections are clones of the first one and
/// therefore share the same database instance, which also makes the pool
/// work for in-memory databases.
pub struct DuckDbWarehouse {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl DuckDbWarehouse {
    /// Opens a pool of `size` connections to the `DuckDB` file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`] if the file cannot be opened.
    pub fn open(path: &Path, size: usize, read_only: bool) -> Result<Self, WarehouseError> {
        let mode = if read_only {
            AccessMode::ReadOnly
        } else {
            AccessMode::ReadWrite
        };
        let conn = Connection::open_with_flags(path, Config::default().access_mode(mode)?)?;
        log::info!(
            "Opened DuckDB warehouse {} ({} connections, read_only={read_only})",
            path.display(),
            size.max(1)
        );
        Self::from_connection(conn, size)
    }

    /// Opens an empty in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`] if `DuckDB` cannot be initialised.
    pub fn open_in_memory(size: usize) -> Result<Self, WarehouseError> {
        Self::from_connection(Connection::open_in_memory()?, size)
    }

    /// Builds a pool of `size` clones of `conn` (at least one).
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`] if a connection cannot be cloned.
    pub fn from_connection(conn: Connection, size: usize) -> Result<Self, WarehouseError> {
        let mut connections = Vec::with_capacity(size.max(1));
        for _ in 1..size.max(1) {
            connections.push(Mutex::new(conn.try_clone()?));
        }
        connections.push(Mutex::new(conn));

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Acquires the next connection from the pool (round-robin).
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::PoolPoisoned`] if the connection's lock is
    /// poisoned.
    pub fn acquire(&self) -> Result<MutexGuard<'_, Connection>, WarehouseError> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[idx]
            .lock()
            .map_err(|_| WarehouseError::PoolPoisoned)
    }
}

impl Warehouse for DuckDbWarehouse {
    fn query(&self, sql: &str) -> Result<TabularResult, WarehouseError> {
        let conn = self.acquire()?;
        log::debug!("Executing warehouse query:\n{sql}");

        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let columns: Vec<String> = rows
            .as_ref()
            .map(|stmt| stmt.column_names())
            .unwrap_or_default();

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::default();
            for (i, name) in columns.iter().enumerate() {
                let value: Value = row.get(i)?;
                record.insert(name.clone(), to_scalar(value));
            }
            out.push(record);
        }

        log::debug!("Warehouse returned {} rows", out.len());
        Ok(TabularResult::new(columns, out))
    }
}

/// Converts a `DuckDB` value into the engine-agnostic [`ScalarValue`].
#[allow(clippy::cast_precision_loss)]
fn to_scalar(value: Value) -> ScalarValue {
    match value {
        Value::Null => ScalarValue::Null,
        Value::Boolean(v) => ScalarValue::Bool(v),
        Value::TinyInt(v) => ScalarValue::Int(i64::from(v)),
        Value::SmallInt(v) => ScalarValue::Int(i64::from(v)),
        Value::Int(v) => ScalarValue::Int(i64::from(v)),
        Value::BigInt(v) => ScalarValue::Int(v),
        Value::UTinyInt(v) => ScalarValue::Int(i64::from(v)),
        Value::USmallInt(v) => ScalarValue::Int(i64::from(v)),
        Value::UInt(v) => ScalarValue::Int(i64::from(v)),
        Value::UBigInt(v) => {
            i64::try_from(v).map_or(ScalarValue::Float(v as f64), ScalarValue::Int)
        }
        Value::HugeInt(v) => {
            i64::try_from(v).map_or(ScalarValue::Float(v as f64), ScalarValue::Int)
        }
        Value::Float(v) => ScalarValue::Float(f64::from(v)),
        Value::Double(v) => ScalarValue::Float(v),
        Value::Decimal(v) => v
            .to_string()
            .parse()
            .map_or_else(|_| ScalarValue::Text(v.to_string()), ScalarValue::Float),
        Value::Text(v) | Value::Enum(v) => ScalarValue::Text(v),
        Value::Date32(days) => date_from_epoch_days(days)
            .map_or(ScalarValue::Int(i64::from(days)), |d| {
                ScalarValue::Text(d.format("%Y-%m-%d").to_string())
            }),
        other => ScalarValue::Text(format!("{other:?}")),
    }
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    if days >= 0 {
        epoch.checked_add_days(Days::new(u64::from(days.unsigned_abs())))
    } else {
        epoch.checked_sub_days(Days::new(u64::from(days.unsigned_abs())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warehouse() -> DuckDbWarehouse {
        let warehouse = DuckDbWarehouse::open_in_memory(2).unwrap();
        warehouse
            .acquire()
            .unwrap()
            .execute_batch(
                "CREATE TABLE t (name TEXT, n INTEGER, x DOUBLE, d DATE);
                 INSERT INTO t VALUES ('a', 1, 1.5, DATE '2020-03-01'), (NULL, 2, NULL, NULL);",
            )
            .unwrap();
        warehouse
    }

    #[test]
    fn converts_common_column_types() {
        let table = warehouse()
            .query("SELECT name, n, x, d FROM t ORDER BY n")
            .unwrap();

        assert_eq!(table.columns(), ["name", "n", "x", "d"]);
        assert_eq!(table.len(), 2);

        let first = &table.rows()[0];
        assert_eq!(first.get("name"), Some(&ScalarValue::from("a")));
        assert_eq!(first.get("n"), Some(&ScalarValue::Int(1)));
        assert_eq!(first.get("x"), Some(&ScalarValue::Float(1.5)));
        assert_eq!(first.get("d"), Some(&ScalarValue::from("2020-03-01")));

        let second = &table.rows()[1];
        assert!(second.get("name").unwrap().is_null());
        assert!(second.get("x").unwrap().is_null());
    }

    #[test]
    fn aggregates_come_back_as_numbers() {
        let table = warehouse()
            .query("SELECT COUNT(*) as crash_count, AVG(x) as mean_x FROM t")
            .unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.get("crash_count").and_then(ScalarValue::as_i64), Some(2));
        assert_eq!(row.get("mean_x").and_then(ScalarValue::as_f64), Some(1.5));
    }

    #[test]
    fn pooled_connections_share_one_database() {
        let warehouse = warehouse();
        for _ in 0..4 {
            let table = warehouse.query("SELECT COUNT(*) as c FROM t").unwrap();
            assert_eq!(table.rows()[0].get("c"), Some(&ScalarValue::Int(2)));
        }
    }

    #[test]
    fn malformed_sql_is_an_error() {
        assert!(warehouse().query("SELEC nonsense").is_err());
        assert!(warehouse().query("SELECT * FROM missing_table").is_err());
    }

    #[test]
    fn epoch_days_convert_to_dates() {
        assert_eq!(
            date_from_epoch_days(0),
            NaiveDate::from_ymd_opt(1970, 1, 1)
        );
        assert_eq!(
            date_from_epoch_days(-1),
            NaiveDate::from_ymd_opt(1969, 12, 31)
        );
    }
}
