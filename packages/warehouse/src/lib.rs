#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data access for the crash dashboard.
//!
//! A [`Warehouse`] runs SQL text and returns a [`TabularResult`]. The
//! [`CachedWarehouse`] wraps one with a process-wide, time-bounded
//! [`QueryCache`] keyed by the literal request text and turns every failure
//! into a [`QueryOutcome::Failed`] so that one broken report never takes
//! the others down.
//!
//! The bundled backend is an embedded `DuckDB` file ([`DuckDbWarehouse`]);
//! [`load`] creates and fills it from a crash CSV export.

pub mod access;
pub mod cache;
pub mod config;
pub mod engine;
pub mod load;
pub mod progress;

pub use access::CachedWarehouse;
pub use cache::{CacheStats, Clock, ManualClock, QueryCache, SystemClock};
pub use config::WarehouseConfig;
pub use engine::DuckDbWarehouse;
pub use load::LoadSummary;

use crash_dashboard_warehouse_models::{QueryOutcome, TabularResult};
use thiserror::Error;

/// Errors that can occur while talking to the warehouse.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` operation failed.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The table name could not be used.
    #[error(transparent)]
    Query(#[from] crash_dashboard_query::QueryError),

    /// The warehouse could not be opened at startup.
    #[error("Warehouse unavailable: {message}")]
    Unavailable {
        /// Why it could not be opened.
        message: String,
    },

    /// A pooled connection's lock was poisoned by a panicking thread.
    #[error("Connection pool lock poisoned")]
    PoolPoisoned,

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// A query engine that executes SQL text against the crash table.
pub trait Warehouse: Send + Sync {
    /// Runs `sql` and returns every row.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`] if the statement cannot be prepared or
    /// executed, or a value cannot be converted.
    fn query(&self, sql: &str) -> Result<TabularResult, WarehouseError>;
}

/// The data access capability the reports consume.
///
/// Implementations never fail: errors are reported through
/// [`QueryOutcome::Failed`].
pub trait QueryExecutor: Send + Sync {
    /// Executes one aggregation request given as its SQL text.
    fn execute(&self, request_text: &str) -> QueryOutcome;

    /// Cache statistics, for executors that cache.
    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }

    /// Drops every cached result, for executors that cache.
    fn clear_cache(&self) {}
}
