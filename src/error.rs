//! Error types for the rankcache library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when the primary index and rank index fall
//!   out of lock-step (`check_invariants` methods).
//! - [`ConfigError`]: Returned when cache configuration is incomplete
//!   (e.g. a builder without a data source).
//!
//! Data-source failures are not wrapped: [`RetainBestCache::get`] returns the
//! source's own error type unchanged.
//!
//! [`RetainBestCache::get`]: crate::cache::RetainBestCache::get
//!
//! ## Example Usage
//!
//! ```
//! use rankcache::builder::CacheBuilder;
//! use rankcache::cache::RetainBestCache;
//! use rankcache::error::ConfigError;
//! use rankcache::source::MapSource;
//!
//! type Cache = RetainBestCache<u64, i64, MapSource<u64, i64>>;
//!
//! let built: Result<Cache, ConfigError> = CacheBuilder::new(16)
//!     .source(MapSource::new())
//!     .try_build();
//! assert!(built.is_ok());
//!
//! // A missing source is caught without panicking
//! let missing: Result<Cache, ConfigError> = CacheBuilder::new(16).try_build();
//! assert!(missing.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when the two cache indexes disagree.
///
/// Produced by `check_invariants` on
/// [`RankCore`](crate::policy::rank::RankCore::check_invariants) and
/// [`RetainBestCache`](crate::cache::RetainBestCache::check_invariants).
/// Reaching one of these is a bug in the cache, never a runtime condition
/// callers are expected to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Reports two counts that were expected to match.
    pub fn count_mismatch(what: &str, left: usize, right: usize) -> Self {
        Self(format!("{what}: {left} != {right}"))
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache invariant violated: {}", self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration is invalid or incomplete.
///
/// Produced by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
///
/// # Example
///
/// ```
/// use rankcache::builder::CacheBuilder;
/// use rankcache::source::MapSource;
///
/// let err = CacheBuilder::<MapSource<u64, i64>>::new(4)
///     .try_build::<u64, i64>()
///     .unwrap_err();
/// assert_eq!(err.field(), Some("source"));
/// assert!(err.to_string().contains("source"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    field: Option<&'static str>,
    message: String,
}

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            field: None,
            message: msg.into(),
        }
    }

    /// Reports a required setting that was never provided.
    pub fn missing(field: &'static str) -> Self {
        Self {
            field: Some(field),
            message: format!("{field} is required"),
        }
    }

    /// Returns the offending setting, when known.
    #[inline]
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
