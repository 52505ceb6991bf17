//! Error types for evictlab.
//!
//! Cache operations themselves never fail: absent keys are misses and a
//! zero capacity is a legal, permanently empty cache. The errors here cover
//! the two places where something can be rejected.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned by the engines' `check_invariants` methods
//!   when an internal structure disagrees with itself.
//! - [`ConfigError`]: Returned when a policy label cannot be parsed.
//!
//! ## Example Usage
//!
//! ```
//! use evictlab::builder::CachePolicy;
//! use evictlab::error::ConfigError;
//!
//! let policy: Result<CachePolicy, ConfigError> = "lfu-iter".parse();
//! assert_eq!(policy, Ok(CachePolicy::LfuBucketed));
//!
//! let bad = "arc-iter".parse::<CachePolicy>();
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by `check_invariants` on every engine
/// (e.g. [`LruCache::check_invariants`](crate::policy::lru::LruCache::check_invariants)).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration cannot be interpreted.
///
/// Produced by [`CachePolicy::from_str`](crate::builder::CachePolicy) for
/// labels that name no engine.
///
/// # Example
///
/// ```
/// use evictlab::builder::CachePolicy;
///
/// let err = "mru".parse::<CachePolicy>().unwrap_err();
/// assert!(err.to_string().contains("mru"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
