//! Error types for the tallykit library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods used by tests).
//! - [`ConfigError`]: Returned when container configuration parameters are
//!   invalid (e.g. non-positive load factor).
//!
//! ## Example Usage
//!
//! ```
//! use tallykit::error::ConfigError;
//! use tallykit::map::chained::ChainedCounterMap;
//!
//! // Fallible constructor for user-configurable parameters
//! let map: Result<ChainedCounterMap<String>, ConfigError> =
//!     ChainedCounterMap::try_with_capacity_and_load_factor(19, 0.75);
//! assert!(map.is_ok());
//!
//! // Invalid load factor is caught without panicking
//! let bad = ChainedCounterMap::<String>::try_with_capacity_and_load_factor(19, 0.0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal container invariants are violated.
///
/// Produced by `check_invariants` methods on the map types (e.g.
/// [`AvlCounterMap::check_invariants`](crate::map::avl::AvlCounterMap::check_invariants)).
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

/// Error returned when container configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`OpenAddressingCounterMap::try_with_capacity_and_load_factor`](crate::map::open_addressing::OpenAddressingCounterMap::try_with_capacity_and_load_factor)
/// and by
/// [`ChainedCounterMap::set_max_load_factor`](crate::map::chained::ChainedCounterMap::set_max_load_factor).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use tallykit::map::open_addressing::OpenAddressingCounterMap;
///
/// let err = OpenAddressingCounterMap::<u64>::try_with_capacity_and_load_factor(101, 1.5)
///     .unwrap_err();
/// assert!(err.to_string().contains("load factor"));
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
