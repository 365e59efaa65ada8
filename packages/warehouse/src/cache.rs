//! Process-wide, time-bounded result cache.
//!
//! Entries are keyed by the literal request text and live for a fixed
//! time-to-live. The time source is injectable so expiry can be tested
//! without sleeping.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crash_dashboard_warehouse_models::TabularResult;
use serde::Serialize;

/// Default time-to-live of a cached result (one hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// A monotonic time source.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// The real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// A cached result and when it was stored.
#[derive(Debug, Clone)]
struct CachedEntry {
    result: Arc<TabularResult>,
    stored_at: Instant,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries currently stored (expired ones linger until the next insert).
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that missed or found an expired entry.
    pub misses: u64,
    /// Time-to-live in seconds.
    pub ttl_secs: u64,
}

/// Request-text keyed result cache with a fixed time-to-live.
///
/// The lock is held only for lookups and inserts, never while a query runs,
/// so two concurrent misses on one key both execute and the last insert
/// wins.
pub struct QueryCache<C: Clock = SystemClock> {
    entries: Mutex<BTreeMap<String, CachedEntry>>,
    ttl: Duration,
    clock: C,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache<SystemClock> {
    /// Creates a cache backed by the system clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<C: Clock> QueryCache<C> {
    /// Creates a cache that reads time from `clock`.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached result for `key` if it is younger than the TTL.
    /// An expired entry is dropped.
    pub fn get(&self, key: &str) -> Option<Arc<TabularResult>> {
        let now = self.clock.now();
        let fresh = {
            let mut entries = self.lock();
            match entries.get(key) {
                Some(entry) if self.is_fresh(entry, now) => Some(Arc::clone(&entry.result)),
                Some(_) => {
                    entries.remove(key);
                    None
                }
                None => None,
            }
        };

        let counter = if fresh.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);

        fresh
    }

    /// Stores `result` under `key`, replacing any previous entry and
    /// dropping every expired one.
    pub fn insert(&self, key: String, result: Arc<TabularResult>) {
        let stored_at = self.clock.now();
        let mut entries = self.lock();
        entries.retain(|_, entry| self.is_fresh(entry, stored_at));
        entries.insert(key, CachedEntry { result, stored_at });
    }

    /// Removes entries older than the TTL and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns the configured time-to-live.
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.lock().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            ttl_secs: self.ttl.as_secs(),
        }
    }

    fn is_fresh(&self, entry: &CachedEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, CachedEntry>> {
        // Entries are plain values; a panic elsewhere cannot leave one
        // half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
