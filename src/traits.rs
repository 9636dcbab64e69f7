//! # Collaborator Traits
//!
//! The cache depends on two external collaborators, each modelled as a small
//! trait:
//!
//! ```text
//!   ┌──────────────────────────────┐        ┌─────────────────────────────┐
//!   │     DataSource<K, V>         │        │         Rankable            │
//!   │                              │        │                             │
//!   │  fetch(&, &K)                │        │  rank(&) → i64              │
//!   │    → Result<Option<V>, E>    │        │                             │
//!   └──────────────┬───────────────┘        └──────────────┬──────────────┘
//!                  │ consulted on miss                      │ read once per insert
//!                  └───────────────┬────────────────────────┘
//!                                  ▼
//!                  ┌──────────────────────────────────┐
//!                  │   RetainBestCache<K, V, S>       │
//!                  │   get(&, &K) → Result<Option<Arc<V>>, E>
//!                  └──────────────────────────────────┘
//! ```
//!
//! ## Absence vs. failure
//!
//! | Source result | Meaning                      | Cache behaviour               |
//! |---------------|------------------------------|-------------------------------|
//! | `Ok(Some(v))` | Value found                  | Cache it, return it           |
//! | `Ok(None)`    | Key does not exist upstream  | Return `Ok(None)`, not cached |
//! | `Err(e)`      | Upstream failed              | Return `Err(e)` unchanged     |
//!
//! ## Thread Safety
//!
//! `fetch` takes `&self` and is called without any cache lock held, possibly
//! from many threads at once. Sources shared across threads must be
//! `Send + Sync`; interior state belongs behind the source's own locks.
use std::sync::Arc;

/// A value carrying an externally computed, immutable rank.
///
/// Lower ranks are evicted first. The cache reads the rank once, when the
/// value is inserted, and never asks again.
///
/// # Example
///
/// ```
/// use rankcache::traits::Rankable;
///
/// struct Page {
///     hits: u32,
/// }
///
/// impl Rankable for Page {
///     fn rank(&self) -> i64 {
///         i64::from(self.hits)
///     }
/// }
///
/// assert_eq!(Page { hits: 3 }.rank(), 3);
/// assert_eq!(42i64.rank(), 42);
/// ```
pub trait Rankable {
    /// Returns this value's rank.
    fn rank(&self) -> i64;
}

impl Rankable for i64 {
    #[inline]
    fn rank(&self) -> i64 {
        *self
    }
}

impl Rankable for i32 {
    #[inline]
    fn rank(&self) -> i64 {
        i64::from(*self)
    }
}

impl Rankable for u32 {
    #[inline]
    fn rank(&self) -> i64 {
        i64::from(*self)
    }
}

impl<T: Rankable + ?Sized> Rankable for Arc<T> {
    #[inline]
    fn rank(&self) -> i64 {
        (**self).rank()
    }
}

impl<T: Rankable + ?Sized> Rankable for Box<T> {
    #[inline]
    fn rank(&self) -> i64 {
        (**self).rank()
    }
}

/// Upstream store consulted on a cache miss.
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
///
/// use rankcache::traits::DataSource;
///
/// struct Squares;
///
/// impl DataSource<u32, i64> for Squares {
///     type Error = Infallible;
///
///     fn fetch(&self, key: &u32) -> Result<Option<i64>, Self::Error> {
///         if *key == 0 {
///             return Ok(None);
///         }
///         Ok(Some(i64::from(*key) * i64::from(*key)))
///     }
/// }
///
/// assert_eq!(Squares.fetch(&3), Ok(Some(9)));
/// assert_eq!(Squares.fetch(&0), Ok(None));
/// ```
pub trait DataSource<K, V> {
    /// Error raised when the upstream call itself fails.
    type Error;

    /// Fetches the value for `key`, or `Ok(None)` if it does not exist.
    fn fetch(&self, key: &K) -> Result<Option<V>, Self::Error>;
}

impl<K, V, S> DataSource<K, V> for &S
where
    S: DataSource<K, V> + ?Sized,
{
    type Error = S::Error;

    fn fetch(&self, key: &K) -> Result<Option<V>, Self::Error> {
        (**self).fetch(key)
    }
}

impl<K, V, S> DataSource<K, V> for Arc<S>
where
    S: DataSource<K, V> + ?Sized,
{
    type Error = S::Error;

    fn fetch(&self, key: &K) -> Result<Option<V>, Self::Error> {
        (**self).fetch(key)
    }
}

impl<K, V, S> DataSource<K, V> for Box<S>
where
    S: DataSource<K, V> + ?Sized,
{
    type Error = S::Error;

    fn fetch(&self, key: &K) -> Result<Option<V>, Self::Error> {
        (**self).fetch(key)
    }
}

/// Marker for cache types that are safe to share across threads.
///
/// # Example
///
/// ```
/// use rankcache::cache::RetainBestCache;
/// use rankcache::source::MapSource;
/// use rankcache::traits::ConcurrentCache;
///
/// fn assert_concurrent<C: ConcurrentCache>(_: &C) {}
///
/// let cache: RetainBestCache<u64, i64, MapSource<u64, i64>> =
///     RetainBestCache::new(MapSource::new(), 8);
/// assert_concurrent(&cache);
/// ```
pub trait ConcurrentCache: Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fails;

    impl DataSource<u8, i64> for Fails {
        type Error = &'static str;

        fn fetch(&self, _key: &u8) -> Result<Option<i64>, Self::Error> {
            Err("down")
        }
    }

    #[test]
    fn primitive_ranks_are_identity() {
        assert_eq!((-5i64).rank(), -5);
        assert_eq!((-5i32).rank(), -5);
        assert_eq!(u32::MAX.rank(), i64::from(u32::MAX));
    }

    #[test]
    fn smart_pointers_forward_rank() {
        assert_eq!(Arc::new(7i64).rank(), 7);
        assert_eq!(Box::new(8i32).rank(), 8);
    }

    #[test]
    fn wrapped_sources_forward_errors() {
        let shared = Arc::new(Fails);
        assert_eq!(shared.fetch(&1), Err("down"));

        let boxed: Box<dyn DataSource<u8, i64, Error = &'static str>> = Box::new(Fails);
        assert_eq!(boxed.fetch(&1), Err("down"));
        assert_eq!((&Fails).fetch(&1), Err("down"));
    }
}
