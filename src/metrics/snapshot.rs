/// Point-in-time copy of a cache's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub absent: u64,        // misses the source answered with `None`
    pub source_errors: u64, // misses the source failed on

    pub insert_new: u64,
    pub insert_updates: u64,
    pub race_resolved: u64, // fetched values dropped because another call won
    pub evicted_entries: u64,
    pub invalidations: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl CacheMetricsSnapshot {
    /// Fraction of `get` calls answered from the cache, or `0.0` before any call.
    ///
    /// # Example
    ///
    /// ```
    /// use rankcache::metrics::CacheMetricsSnapshot;
    ///
    /// let snap = CacheMetricsSnapshot {
    ///     get_calls: 4,
    ///     get_hits: 3,
    ///     ..Default::default()
    /// };
    /// assert_eq!(snap.hit_rate(), 0.75);
    /// assert_eq!(CacheMetricsSnapshot::default().hit_rate(), 0.0);
    /// ```
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            return 0.0;
        }
        self.get_hits as f64 / self.get_calls as f64
    }
}
