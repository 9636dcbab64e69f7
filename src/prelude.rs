pub use crate::builder::CacheBuilder;
pub use crate::cache::RetainBestCache;
pub use crate::ds::{RankIndex, RankSlot};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::metrics::CacheMetricsSnapshot;
pub use crate::policy::rank::{InsertOutcome, RankCore};
pub use crate::source::{FnSource, MapSource, Ranked};
pub use crate::traits::{ConcurrentCache, DataSource, Rankable};
