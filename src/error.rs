//! Error types for the cachedict library.
//!
//! ## Key Components
//!
//! - [`DictError`]: Returned by dictionary operations (lookups on missing keys,
//!   duplicate `add`, peeks on an empty dictionary, capacity overflow).
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use cachedict::error::DictError;
//! use cachedict::RecencyDictionary;
//!
//! let mut dict: RecencyDictionary<&str, i32> = RecencyDictionary::new();
//! dict.add("a", 1).unwrap();
//!
//! assert_eq!(dict.add("a", 2), Err(DictError::DuplicateKey));
//! assert_eq!(dict.get(&"missing"), Err(DictError::KeyNotFound));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// DictError
// ---------------------------------------------------------------------------

/// Error returned by dictionary operations.
///
/// Every error is raised before the dictionary is mutated, so a failed call
/// leaves the container exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictError {
    /// A configuration argument was rejected (e.g. an explicit bucket count
    /// that is not a power of two).
    InvalidArgument(&'static str),
    /// `add` was called with a key that is already present.
    DuplicateKey,
    /// An indexed lookup (`get`, `get_mut`) missed.
    KeyNotFound,
    /// A peek, pop or random selection was attempted on an empty dictionary.
    EmptyContainer,
    /// Predicate-based random selection found no matching entry.
    NoMatch,
    /// The bucket array would have to grow past the maximum supported size.
    CapacityExceeded { requested: usize, max: usize },
}

impl fmt::Display for DictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            DictError::DuplicateKey => f.write_str("an entry with the same key already exists"),
            DictError::KeyNotFound => f.write_str("key not found"),
            DictError::EmptyContainer => f.write_str("dictionary is empty"),
            DictError::NoMatch => f.write_str("no entry satisfies the predicate"),
            DictError::CapacityExceeded { requested, max } => {
                write!(f, "capacity {requested} exceeds maximum of {max}")
            },
        }
    }
}

impl std::error::Error for DictError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal dictionary invariants are violated.
///
/// Produced by `check_invariants` on
/// [`RecencyDictionary`](crate::RecencyDictionary) and
/// [`RouletteDictionary`](crate::RouletteDictionary).
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
// Tests
// ---------------------------------------------------------------------------
