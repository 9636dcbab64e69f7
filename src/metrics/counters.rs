use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::CacheMetricsSnapshot;

/// Lock-free counters shared by all callers of one cache.
#[derive(Debug, Default)]
pub struct CacheCounters {
    get_calls: AtomicU64,
    get_hits: AtomicU64,
    get_misses: AtomicU64,
    absent: AtomicU64,
    source_errors: AtomicU64,
    insert_new: AtomicU64,
    insert_updates: AtomicU64,
    race_resolved: AtomicU64,
    evicted_entries: AtomicU64,
    invalidations: AtomicU64,
}

impl CacheCounters {
    /// Snapshot all counters; gauges are filled in by the caller.
    pub fn snapshot(&self, cache_len: usize, capacity: usize) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            get_calls: self.get_calls.load(Ordering::Relaxed),
            get_hits: self.get_hits.load(Ordering::Relaxed),
            get_misses: self.get_misses.load(Ordering::Relaxed),
            absent: self.absent.load(Ordering::Relaxed),
            source_errors: self.source_errors.load(Ordering::Relaxed),
            insert_new: self.insert_new.load(Ordering::Relaxed),
            insert_updates: self.insert_updates.load(Ordering::Relaxed),
            race_resolved: self.race_resolved.load(Ordering::Relaxed),
            evicted_entries: self.evicted_entries.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            cache_len,
            capacity,
        }
    }

    #[inline]
    pub fn record_get_call(&self) {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_get_hit(&self) {
        self.get_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_get_miss(&self) {
        self.get_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_absent(&self) {
        self.absent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_source_error(&self) {
        self.source_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_insert_new(&self) {
        self.insert_new.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_insert_update(&self) {
        self.insert_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// A concurrent call inserted the key while this call was fetching.
    #[inline]
    pub fn record_race_resolved(&self) {
        self.race_resolved.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_evictions(&self, count: u64) {
        if count > 0 {
            self.evicted_entries.fetch_add(count, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }
}
