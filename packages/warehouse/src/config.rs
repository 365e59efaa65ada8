//! Warehouse settings read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crash_dashboard_query::TableRef;

use crate::WarehouseError;
use crate::cache::DEFAULT_TTL;

/// Default location of the warehouse file.
pub const DEFAULT_DB_PATH: &str = "data/crashes.duckdb";
/// Default source table.
pub const DEFAULT_TABLE: &str = "processed_crash_data";
/// Default number of pooled read connections.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Where the crash data lives and how it is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// `DuckDB` database file (`CRASH_DB_PATH`).
    pub db_path: PathBuf,
    /// Source table (`CRASH_TABLE`).
    pub table: TableRef,
    /// Result cache time-to-live (`CRASH_CACHE_TTL_SECS`).
    pub cache_ttl: Duration,
    /// Pooled connections (`CRASH_DB_POOL_SIZE`).
    pub pool_size: usize,
}

impl WarehouseConfig {
    /// Reads the configuration from process environment variables, falling
    /// back to the defaults for anything unset or unparseable.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Query`] if `CRASH_TABLE` is not a valid
    /// table identifier.
    pub fn from_env() -> Result<Self, WarehouseError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Query`] if the table name is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WarehouseError> {
        let db_path =
            lookup("CRASH_DB_PATH").map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from);
        let table = TableRef::new(lookup("CRASH_TABLE").as_deref().unwrap_or(DEFAULT_TABLE))?;

        let cache_ttl = lookup("CRASH_CACHE_TTL_SECS")
            .and_then(|v| parse_or_warn("CRASH_CACHE_TTL_SECS", &v))
            .map_or(DEFAULT_TTL, Duration::from_secs);
        let pool_size = lookup("CRASH_DB_POOL_SIZE")
            .and_then(|v| parse_or_warn("CRASH_DB_POOL_SIZE", &v))
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_POOL_SIZE);

        Ok(Self {
            db_path,
            table,
            cache_ttl,
            pool_size,
        })
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        log::warn!("Ignoring invalid {key}={value:?}, using default");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = WarehouseConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.table.to_string(), "\"processed_crash_data\"");
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn variables_override_defaults() {
        let config = WarehouseConfig::from_lookup(lookup(&[
            ("CRASH_DB_PATH", "/tmp/x.duckdb"),
            ("CRASH_TABLE", "crash_data.processed_crash_data"),
            ("CRASH_CACHE_TTL_SECS", "60"),
            ("CRASH_DB_POOL_SIZE", "2"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/x.duckdb"));
        assert_eq!(
            config.table.to_string(),
            "\"crash_data\".\"processed_crash_data\""
        );
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.pool_size, 2);
    }

    #[test]
    fn unparseable_numbers_fall_back() {
        let config = WarehouseConfig::from_lookup(lookup(&[
            ("CRASH_CACHE_TTL_SECS", "soon"),
            ("CRASH_DB_POOL_SIZE", "0"),
        ]))
        .unwrap();
        assert_eq!(config.cache_ttl, DEFAULT_TTL);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn invalid_table_is_rejected() {
        let err = WarehouseConfig::from_lookup(lookup(&[("CRASH_TABLE", "a..b")])).unwrap_err();
        assert!(matches!(err, WarehouseError::Query(_)));
    }
}
