//! Step-by-step construction of a [`RetainBestCache`].
//!
//! The only recognised settings are the capacity (`max_items`) and the data
//! source. [`RetainBestCache::new`] takes both at once; the builder exists
//! for call sites that assemble configuration piecemeal and want a
//! [`ConfigError`] instead of a compile-time requirement.
//!
//! ## Example
//!
//! ```rust
//! use rankcache::builder::CacheBuilder;
//! use rankcache::cache::RetainBestCache;
//! use rankcache::source::{MapSource, Ranked};
//!
//! let source = MapSource::new();
//! source.insert(1u64, Ranked::new("one", 3));
//!
//! let cache: RetainBestCache<u64, Ranked<&str>, _> =
//!     CacheBuilder::new(100).source(source).try_build().unwrap();
//! assert_eq!(cache.get(&1).unwrap().map(|v| *v.value()), Some("one"));
//! ```

use std::hash::Hash;

use crate::cache::RetainBestCache;
use crate::error::ConfigError;

/// Builder for [`RetainBestCache`].
#[derive(Debug, Clone)]
pub struct CacheBuilder<S> {
    max_items: usize,
    source: Option<S>,
}

impl<S> CacheBuilder<S> {
    /// Create a builder for a cache holding at most `max_items` entries.
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            source: None,
        }
    }

    /// Change the capacity.
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Set the data source consulted on misses.
    pub fn source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    /// Build the cache.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if no source was set.
    pub fn try_build<K, V>(self) -> Result<RetainBestCache<K, V, S>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        let source = self.source.ok_or_else(|| ConfigError::missing("source"))?;
        Ok(RetainBestCache::new(source, self.max_items))
    }
}
