//! Ready-made data sources and rank carriers.
//!
//! ## Key Components
//! - [`Ranked`]: pairs any payload with a fixed rank.
//! - [`MapSource`]: in-memory, thread-safe source backed by a hash map.
//!   Useful as an upstream in tests and as a seedable stand-in for a remote
//!   store.
//! - [`FnSource`]: adapts a closure into a [`DataSource`].
//!
//! ## Example Usage
//!
//! ```
//! use rankcache::source::{FnSource, MapSource, Ranked};
//! use rankcache::traits::{DataSource, Rankable};
//!
//! let map = MapSource::new();
//! map.insert("home", Ranked::new("<html>", 90));
//! assert_eq!(map.fetch(&"home").unwrap().map(|v| v.rank()), Some(90));
//! assert!(map.fetch(&"missing").unwrap().is_none());
//!
//! let even_only = FnSource::new(|key: &u64| -> Result<Option<i64>, String> {
//!     Ok((key % 2 == 0).then_some(*key as i64))
//! });
//! assert_eq!(even_only.fetch(&4), Ok(Some(4)));
//! assert_eq!(even_only.fetch(&3), Ok(None));
//! ```
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::ops::Deref;

use parking_lot::RwLock;

use crate::traits::{DataSource, Rankable};

// ---------------------------------------------------------------------------
// Ranked
// ---------------------------------------------------------------------------

/// A payload with an externally assigned rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ranked<T> {
    value: T,
    rank: i64,
}

impl<T> Ranked<T> {
    /// Wraps `value` with `rank`.
    pub fn new(value: T, rank: i64) -> Self {
        Self { value, rank }
    }

    /// Returns the payload.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consumes the wrapper, returning the payload.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Rankable for Ranked<T> {
    #[inline]
    fn rank(&self) -> i64 {
        self.rank
    }
}

impl<T> Deref for Ranked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

// ---------------------------------------------------------------------------
// MapSource
// ---------------------------------------------------------------------------

/// In-memory source that never fails.
///
/// Values are cloned out on every fetch, so cheap-to-clone payloads (or
/// `Arc`s) are a good fit.
#[derive(Debug)]
pub struct MapSource<K, V> {
    data: RwLock<HashMap<K, V>>,
}

impl<K, V> MapSource<K, V>
where
    K: Eq + Hash,
{
    /// Creates an empty source.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Adds or replaces a value, returning the previous one.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.data.write().insert(key, value)
    }

    /// Removes a value.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.data.write().remove(key)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if the source holds nothing.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl<K, V> Default for MapSource<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for MapSource<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: RwLock::new(iter.into_iter().collect()),
        }
    }
}

impl<K, V> DataSource<K, V> for MapSource<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    type Error = Infallible;

    fn fetch(&self, key: &K) -> Result<Option<V>, Self::Error> {
        Ok(self.data.read().get(key).cloned())
    }
}

// ---------------------------------------------------------------------------
// FnSource
// ---------------------------------------------------------------------------

/// Closure-backed source.
pub struct FnSource<F, K, V, E> {
    fetch: F,
    _marker: PhantomData<fn(&K) -> Result<Option<V>, E>>,
}

impl<F, K, V, E> FnSource<F, K, V, E>
where
    F: Fn(&K) -> Result<Option<V>, E>,
{
    /// Wraps `fetch`.
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            _marker: PhantomData,
        }
    }
}

impl<F, K, V, E> fmt::Debug for FnSource<F, K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

impl<F, K, V, E> DataSource<K, V> for FnSource<F, K, V, E>
where
    F: Fn(&K) -> Result<Option<V>, E>,
{
    type Error = E;

    fn fetch(&self, key: &K) -> Result<Option<V>, E> {
        (self.fetch)(key)
    }
}
