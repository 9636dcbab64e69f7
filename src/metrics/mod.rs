//! Hit/miss and eviction counters for [`RetainBestCache`].
//!
//! Counters are relaxed atomics so the hit path can record without taking
//! the cache's write lock. A [`CacheMetricsSnapshot`] is a plain copy taken
//! at one instant; counters recorded by different threads may be slightly
//! out of step with each other and with the gauges.
//!
//! [`RetainBestCache`]: crate::cache::RetainBestCache

pub mod counters;
pub mod snapshot;

pub use counters::CacheCounters;
pub use snapshot::CacheMetricsSnapshot;
