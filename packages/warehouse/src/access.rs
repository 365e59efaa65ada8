//! Cached data access: the single entry point reports use to run requests.

use std::sync::Arc;
use std::time::Duration;

use crash_dashboard_warehouse_models::QueryOutcome;

use crate::cache::{CacheStats, Clock, QueryCache, SystemClock};
use crate::{QueryExecutor, Warehouse};

/// A [`Warehouse`] behind a [`QueryCache`].
///
/// Successful results are cached under their request text; failures are
/// logged, reported as [`QueryOutcome::Failed`] and never cached, so the
/// next render retries them.
pub struct CachedWarehouse<W: Warehouse, C: Clock = SystemClock> {
    warehouse: W,
    cache: QueryCache<C>,
}

impl<W: Warehouse> CachedWarehouse<W> {
    /// Wraps `warehouse` with a system-clock cache of the given TTL.
    #[must_use]
    pub fn new(warehouse: W, ttl: Duration) -> Self {
        Self::with_cache(warehouse, QueryCache::new(ttl))
    }
}

impl<W: Warehouse, C: Clock> CachedWarehouse<W, C> {
    /// Wraps `warehouse` with an existing cache.
    #[must_use]
    pub const fn with_cache(warehouse: W, cache: QueryCache<C>) -> Self {
        Self { warehouse, cache }
    }

    /// The underlying warehouse.
    pub const fn warehouse(&self) -> &W {
        &self.warehouse
    }

    /// The result cache.
    pub const fn cache(&self) -> &QueryCache<C> {
        &self.cache
    }
}

impl<W: Warehouse, C: Clock> QueryExecutor for CachedWarehouse<W, C> {
    fn execute(&self, request_text: &str) -> QueryOutcome {
        if let Some(result) = self.cache.get(request_text) {
            log::debug!("Cache hit ({} rows)", result.len());
            return QueryOutcome::Loaded(result);
        }

        match self.warehouse.query(request_text) {
            Ok(table) => {
                let table = Arc::new(table);
                self.cache
                    .insert(request_text.to_string(), Arc::clone(&table));
                QueryOutcome::Loaded(table)
            }
            Err(e) => {
                log::error!("Error executing query: {e}");
                QueryOutcome::Failed {
                    message: format!("Error executing query: {e}"),
                }
            }
        }
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        Some(self.cache.stats())
    }

    fn clear_cache(&self) {
        self.cache.clear();
        log::info!("Result cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crash_dashboard_warehouse_models::{Row, ScalarValue, TabularResult};

    use super::*;
    use crate::cache::{DEFAULT_TTL, ManualClock};
    use crate::WarehouseError;

    /// Counts calls and answers `SELECT` statements with a one-row table.
    #[derive(Default)]
    struct CountingWarehouse {
        calls: AtomicUsize,
    }

    impl Warehouse for CountingWarehouse {
        fn query(&self, sql: &str) -> Result<TabularResult, WarehouseError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !sql.starts_with("SELECT") {
                return Err(WarehouseError::Conversion {
                    message: "syntax error".to_string(),
                });
            }
            let row: Row = [("call", ScalarValue::Int(i64::try_from(n).unwrap()))]
                .into_iter()
                .collect();
            Ok(TabularResult::new(vec!["call".to_string()], vec![row]))
        }
    }

    fn access() -> (
        Arc<ManualClock>,
        CachedWarehouse<CountingWarehouse, Arc<ManualClock>>,
    ) {
        let clock = Arc::new(ManualClock::new());
        let cache = QueryCache::with_clock(DEFAULT_TTL, Arc::clone(&clock));
        (
            clock,
            CachedWarehouse::with_cache(CountingWarehouse::default(), cache),
        )
    }

    #[test]
    fn identical_request_within_ttl_skips_the_warehouse() {
        let (clock, access) = access();

        let first = access.execute("SELECT 1");
        clock.advance(Duration::from_secs(59 * 60));
        let second = access.execute("SELECT 1");

        assert_eq!(first, second);
        assert_eq!(access.warehouse().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn expired_request_is_recomputed() {
        let (clock, access) = access();

        access.execute("SELECT 1");
        clock.advance(DEFAULT_TTL);
        let again = access.execute("SELECT 1");

        assert_eq!(access.warehouse().calls.load(Ordering::SeqCst), 2);
        assert_eq!(again.rows()[0].get("call"), Some(&ScalarValue::Int(1)));
    }

    #[test]
    fn different_texts_are_cached_separately() {
        let (_clock, access) = access();
        access.execute("SELECT 1");
        access.execute("SELECT 2");
        access.execute("SELECT 1");

        assert_eq!(access.warehouse().calls.load(Ordering::SeqCst), 2);
        assert_eq!(access.cache_stats().unwrap().entries, 2);
    }

    #[test]
    fn failures_are_reported_and_not_cached() {
        let (_clock, access) = access();

        let outcome = access.execute("garbage");
        assert!(!outcome.is_loaded());
        assert!(outcome.rows().is_empty());
        match &outcome {
            QueryOutcome::Failed { message } => assert!(message.contains("syntax error")),
            QueryOutcome::Loaded(_) => panic!("expected failure"),
        }

        access.execute("garbage");
        assert_eq!(access.warehouse().calls.load(Ordering::SeqCst), 2);
        assert_eq!(access.cache_stats().unwrap().entries, 0);
    }

    #[test]
    fn clear_cache_forces_a_new_call() {
        let (_clock, access) = access();
        access.execute("SELECT 1");
        access.clear_cache();
        access.execute("SELECT 1");
        assert_eq!(access.warehouse().calls.load(Ordering::SeqCst), 2);
    }
}
