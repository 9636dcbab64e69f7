//! rankcache: a bounded read-through cache that retains the highest-ranked
//! values.
//!
//! [`RetainBestCache`](cache::RetainBestCache) fetches misses from a
//! [`DataSource`](traits::DataSource) and, once full, evicts the resident
//! value with the lowest [`Rankable::rank`](traits::Rankable::rank).
//!
//! ## Layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | `ds`       | `RankIndex`: ordered multimap keyed by `(rank, seq)`      |
//! | `store`    | `PrimaryIndex`: key → value + rank slot                   |
//! | `policy`   | `RankCore`: both indexes, insert/evict, single-threaded   |
//! | `cache`    | `RetainBestCache`: locking, two-phase read-through `get`  |
//! | `source`   | `MapSource`, `FnSource`, `Ranked`                         |
//! | `builder`  | `CacheBuilder`                                            |
//! | `metrics`  | Counters and `CacheMetricsSnapshot`                       |
//! | `error`    | `ConfigError`, `InvariantError`                           |

pub mod builder;
pub mod cache;
pub mod ds;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod source;
pub mod store;
pub mod traits;
