//! # Read-Through Rank Cache
//!
//! [`RetainBestCache`] sits in front of a slow [`DataSource`], remembers what
//! it fetched, and once `max_items` entries are resident makes room by
//! discarding the entry with the lowest [`rank`](Rankable::rank).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                     RetainBestCache<K, V, S>                             │
//!   │                                                                          │
//!   │   core: parking_lot::RwLock<RankCore<K, V>>                              │
//!   │         (primary index + rank index, one lock for both)                  │
//!   │                                                                          │
//!   │   source: S: DataSource<K, V>      (called with no lock held)            │
//!   │                                                                          │
//!   │   counters: CacheCounters          (relaxed atomics)                     │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Get Flow (two-phase)
//!
//! ```text
//!   get(key):
//!     ┌── read lock ──────────────────────┐
//!     │ primary.get(key) → hit? return    │
//!     └───────────────────────────────────┘
//!     source.fetch(key)                        ← unlocked, may block
//!       Err(e)     → return Err(e)             (nothing cached)
//!       Ok(None)   → return Ok(None)           (absence never cached)
//!       Ok(Some(v))
//!     ┌── write lock ─────────────────────┐
//!     │ key resident now? return resident │    ← another call won the race
//!     │ full? pop lowest rank             │
//!     │ insert into both indexes          │
//!     └───────────────────────────────────┘
//!     return v
//! ```
//!
//! Concurrent misses on the same key may each call the source; the first to
//! take the write lock is cached and every later one returns that resident
//! value, so all callers converge on a single `Arc`.
//!
//! ## Example Usage
//!
//! ```
//! use rankcache::cache::RetainBestCache;
//! use rankcache::source::{MapSource, Ranked};
//!
//! let source = MapSource::new();
//! source.insert("a", Ranked::new("alpha", 10));
//! source.insert("b", Ranked::new("beta", 5));
//! source.insert("c", Ranked::new("gamma", 7));
//!
//! let cache: RetainBestCache<&str, Ranked<&str>, _> = RetainBestCache::new(source, 2);
//! for key in ["a", "b", "c"] {
//!     cache.get(&key).unwrap();
//! }
//!
//! // "b" had the lowest rank when "c" arrived
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert!(cache.contains(&"c"));
//!
//! // Unknown keys are a normal `None`, not an error
//! assert!(cache.get(&"zzz").unwrap().is_none());
//! ```
//!
//! ## Layering
//!
//! `RetainBestCache<K, V, S>` implements `DataSource<K, Arc<V>>`, so one
//! cache can be the source of another:
//!
//! ```
//! use std::sync::Arc;
//!
//! use rankcache::cache::RetainBestCache;
//! use rankcache::source::MapSource;
//!
//! type L2 = RetainBestCache<u32, i64, MapSource<u32, i64>>;
//! type L1 = RetainBestCache<u32, Arc<i64>, L2>;
//!
//! let base: MapSource<u32, i64> = (0..10).map(|k| (k, i64::from(k))).collect();
//! let l1 = L1::new(L2::new(base, 8), 2);
//!
//! assert_eq!(l1.get(&3).unwrap().map(|v| **v), Some(3));
//! assert!(l1.contains(&3));
//! assert!(l1.source().contains(&3));
//! ```
//!
//! ## Thread Safety
//!
//! `RetainBestCache` is `Send + Sync` whenever `K`, `V` and `S` are; share it
//! with `Arc<RetainBestCache<..>>`. Hits take only the read lock. Evicted and
//! replaced values, and everything removed by `clear`, are dropped after the
//! write lock is released.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::InvariantError;
use crate::metrics::{CacheCounters, CacheMetricsSnapshot};
use crate::policy::rank::RankCore;
use crate::traits::{ConcurrentCache, DataSource, Rankable};

/// Bounded read-through cache that evicts the lowest-ranked value first.
pub struct RetainBestCache<K, V, S> {
    core: RwLock<RankCore<K, V>>,
    source: S,
    counters: CacheCounters,
}

impl<K, V, S> RetainBestCache<K, V, S>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache over `source` holding at most `max_items` values.
    ///
    /// See [`CacheBuilder`](crate::builder::CacheBuilder) for the fallible,
    /// step-by-step form.
    ///
    /// `max_items == 0` is allowed: every `get` then goes to the source and
    /// nothing is retained.
    ///
    /// # Example
    ///
    /// ```
    /// use rankcache::cache::RetainBestCache;
    /// use rankcache::source::MapSource;
    ///
    /// let cache: RetainBestCache<u32, i64, MapSource<u32, i64>> =
    ///     RetainBestCache::new(MapSource::new(), 100);
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(source: S, max_items: usize) -> Self {
        Self {
            core: RwLock::new(RankCore::new(max_items)),
            source,
            counters: CacheCounters::default(),
        }
    }

    /// Returns the value for `key`, fetching and caching it on a miss.
    ///
    /// - Hit: returns the resident value without contacting the source.
    /// - Miss: calls the source with no cache lock held. A present value is
    ///   cached (evicting the lowest-ranked entry if full) and returned.
    /// - `Ok(None)` from the source is returned as is and not cached.
    /// - `Err` from the source is returned unchanged; nothing is cached.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// use rankcache::cache::RetainBestCache;
    /// use rankcache::source::FnSource;
    ///
    /// let calls = AtomicUsize::new(0);
    /// let source = FnSource::new(|key: &u64| -> Result<Option<i64>, String> {
    ///     calls.fetch_add(1, Ordering::SeqCst);
    ///     Ok(Some(*key as i64))
    /// });
    /// let cache: RetainBestCache<u64, i64, _> = RetainBestCache::new(source, 4);
    ///
    /// assert_eq!(cache.get(&7).unwrap().as_deref(), Some(&7));
    /// assert_eq!(cache.get(&7).unwrap().as_deref(), Some(&7));
    /// assert_eq!(calls.load(Ordering::SeqCst), 1);
    /// ```
    pub fn get(&self, key: &K) -> Result<Option<Arc<V>>, S::Error>
    where
        S: DataSource<K, V>,
        V: Rankable,
    {
        self.counters.record_get_call();

        let hit = self.core.read().get(key).cloned();
        if let Some(value) = hit {
            self.counters.record_get_hit();
            trace!("cache hit");
            return Ok(Some(value));
        }
        self.counters.record_get_miss();

        let fetched = match self.source.fetch(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                self.counters.record_absent();
                trace!("key absent from data source");
                return Ok(None);
            },
            Err(err) => {
                self.counters.record_source_error();
                debug!("data source fetch failed");
                return Err(err);
            },
        };

        Ok(Some(self.admit(key.clone(), Arc::new(fetched))))
    }

    /// Returns the resident value for `key` without contacting the source.
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.core.read().get(key).cloned()
    }

    /// Checks whether `key` is resident.
    pub fn contains(&self, key: &K) -> bool {
        self.core.read().contains(key)
    }

    /// Returns the rank `key` was cached with.
    pub fn rank_of(&self, key: &K) -> Option<i64> {
        self.core.read().rank_of(key)
    }

    /// Places `value` in the cache directly, overwriting any resident value
    /// for `key`. Returns the replaced value.
    ///
    /// # Example
    ///
    /// ```
    /// use rankcache::cache::RetainBestCache;
    /// use rankcache::source::MapSource;
    ///
    /// let cache: RetainBestCache<&str, i64, MapSource<&str, i64>> =
    ///     RetainBestCache::new(MapSource::new(), 2);
    /// assert!(cache.insert("a", 1).is_none());
    /// assert_eq!(cache.insert("a", 5).as_deref(), Some(&1));
    /// assert_eq!(cache.rank_of(&"a"), Some(5));
    /// ```
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>>
    where
        V: Rankable,
    {
        self.insert_arc(key, Arc::new(value))
    }

    /// Like [`insert`](Self::insert) for values already behind an `Arc`.
    pub fn insert_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>>
    where
        V: Rankable,
    {
        let outcome = self.core.write().insert(key, value);
        if outcome.replaced.is_some() {
            self.counters.record_insert_update();
        } else if outcome.stored {
            self.counters.record_insert_new();
        }
        self.counters.record_evictions(u64::from(outcome.evicted.is_some()));
        outcome.replaced
    }

    /// Removes `key` from the cache. The source is not touched.
    pub fn invalidate(&self, key: &K) -> Option<Arc<V>> {
        let removed = self.core.write().remove(key);
        if removed.is_some() {
            self.counters.record_invalidation();
        }
        removed
    }

    /// Returns the entry that would be evicted next, with its rank.
    pub fn lowest(&self) -> Option<(K, Arc<V>, i64)> {
        self.core
            .read()
            .peek_lowest()
            .map(|(key, value, rank)| (key.clone(), Arc::clone(value), rank))
    }

    /// Drops every resident entry.
    pub fn clear(&self) {
        let drained = self.core.write().take();
        drop(drained);
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.core.read().len()
    }

    /// Returns `true` if nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.core.read().is_empty()
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        self.core.read().capacity()
    }

    /// Borrows the underlying data source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Snapshot of counters and gauges.
    pub fn metrics(&self) -> CacheMetricsSnapshot {
        let (len, capacity) = {
            let core = self.core.read();
            (core.len(), core.capacity())
        };
        self.counters.snapshot(len, capacity)
    }

    /// Verifies that both indexes agree and the size bound holds.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.core.read().check_invariants()
    }

    /// Second phase of a miss: re-check under the write lock, then insert.
    fn admit(&self, key: K, value: Arc<V>) -> Arc<V>
    where
        V: Rankable,
    {
        let mut core = self.core.write();
        if let Some(resident) = core.get(&key) {
            let resident = Arc::clone(resident);
            drop(core);
            self.counters.record_race_resolved();
            debug!("key cached by a concurrent fetch; keeping resident value");
            return resident;
        }

        let outcome = core.insert(key, Arc::clone(&value));
        drop(core);

        if outcome.stored {
            self.counters.record_insert_new();
        }
        self.counters.record_evictions(u64::from(outcome.evicted.is_some()));
        value
    }
}

/// A cache is itself a source, so caches can be stacked: a small cache in
/// front of a larger one, which in turn fronts the real upstream. The outer
/// cache stores the inner cache's `Arc<V>` and ranks it through `V`.
impl<K, V, S> DataSource<K, Arc<V>> for RetainBestCache<K, V, S>
where
    K: Eq + Hash + Clone,
    S: DataSource<K, V>,
    V: Rankable,
{
    type Error = S::Error;

    fn fetch(&self, key: &K) -> Result<Option<Arc<V>>, S::Error> {
        self.get(key)
    }
}

impl<K, V, S> ConcurrentCache for RetainBestCache<K, V, S>
where
    K: Send + Sync,
    V: Send + Sync,
    S: Send + Sync,
{
}

impl<K, V, S> fmt::Debug for RetainBestCache<K, V, S>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.read();
        f.debug_struct("RetainBestCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .finish_non_exhaustive()
    }
}
