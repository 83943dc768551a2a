//! # Dictionary Trait Hierarchy
//!
//! Shared interfaces for the two dictionaries, so cache layers and tests can
//! be written once against either container.
//!
//! ## Architecture
//!
//! ```text
//!                   ┌─────────────────────────────────────────┐
//!                   │          CoreDictionary<K, V>           │
//!                   │                                         │
//!                   │  set(&mut, K, V) → Result<Option<V>>    │
//!                   │  add(&mut, K, V) → Result<()>           │
//!                   │  lookup(&mut, &K) → Option<&V>          │
//!                   │  contains_key(&, &K) → bool             │
//!                   │  remove(&mut, &K) → Option<V>           │
//!                   │  len / is_empty / clear / trim          │
//!                   └────────────────────┬────────────────────┘
//!                                        │
//!                                        ▼
//!                   ┌─────────────────────────────────────────┐
//!                   │        EvictingDictionary<K, V>         │
//!                   │                                         │
//!                   │  capacity(&) → usize                    │
//!                   │  set_and_maintain_count(&mut, K, V)     │
//!                   │      → SetOutcome<K, V>                 │
//!                   └────────────────────┬────────────────────┘
//!                                        │
//!                ┌───────────────────────┴───────────────────────┐
//!                ▼                                               ▼
//!   ┌────────────────────────────┐                ┌────────────────────────────┐
//!   │   RecencyTracking<K, V>    │                │   RandomEviction<K, V>     │
//!   │                            │                │                            │
//!   │  least_recent / most_recent│                │  random_key                │
//!   │  pop_least_recent          │                │  random_entry              │
//!   │  touch / recency_rank      │                │  take_random               │
//!   └────────────────────────────┘                └────────────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait                | Extends              | Implemented by         |
//! |----------------------|----------------------|------------------------|
//! | `CoreDictionary`     | -                    | both dictionaries      |
//! | `EvictingDictionary` | `CoreDictionary`     | both dictionaries      |
//! | `RecencyTracking`    | `EvictingDictionary` | `RecencyDictionary`    |
//! | `RandomEviction`     | `EvictingDictionary` | `RouletteDictionary`   |
//!
//! The inherent methods on each dictionary are richer (borrowed-key lookups,
//! predicates, iteration); the traits cover what is common.

use crate::dict::SetOutcome;
use crate::error::DictError;

/// Operations every dictionary supports.
///
/// # Example
///
/// ```
/// use cachedict::traits::CoreDictionary;
/// use cachedict::{RecencyDictionary, RouletteDictionary};
///
/// fn load<D: CoreDictionary<u32, String>>(dict: &mut D) {
///     for i in 0..10 {
///         dict.set(i, i.to_string()).unwrap();
///     }
/// }
///
/// let mut recency = RecencyDictionary::new();
/// let mut roulette = RouletteDictionary::new();
/// load(&mut recency);
/// load(&mut roulette);
/// assert_eq!(recency.len(), roulette.len());
/// ```
pub trait CoreDictionary<K, V> {
    /// Number of live entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Membership test. Never changes eviction order.
    fn contains_key(&self, key: &K) -> bool;

    /// Looks up `key`. Recency-tracking dictionaries mark the entry as
    /// most recently used.
    fn lookup(&mut self, key: &K) -> Option<&V>;

    /// Inserts or overwrites, returning the previous value.
    fn set(&mut self, key: K, value: V) -> Result<Option<V>, DictError>;

    /// Inserts a key that must not already exist.
    fn add(&mut self, key: K, value: V) -> Result<(), DictError>;

    /// Removes `key`, returning its value.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes several keys; results are in input order.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|k| self.remove(k)).collect()
    }

    fn clear(&mut self);

    /// Shrinks the bucket array and node storage to fit the live entries.
    fn trim(&mut self);

    fn bucket_count(&self) -> usize;
}

/// Dictionaries that can hold themselves at a fixed entry count.
pub trait EvictingDictionary<K, V>: CoreDictionary<K, V> {
    /// Entry count that [`set_and_maintain_count`](Self::set_and_maintain_count)
    /// maintains.
    fn capacity(&self) -> usize;

    /// Inserts or overwrites; a new key arriving when `len() >= capacity()`
    /// (and the dictionary is non-empty) evicts one entry first.
    fn set_and_maintain_count(&mut self, key: K, value: V) -> SetOutcome<K, V>;
}

/// Eviction driven by access recency.
pub trait RecencyTracking<K, V>: EvictingDictionary<K, V> {
    fn least_recent(&self) -> Result<(&K, &V), DictError>;

    fn most_recent(&self) -> Result<(&K, &V), DictError>;

    fn pop_least_recent(&mut self) -> Result<(K, V), DictError>;

    /// Marks `key` as most recently used without reading it.
    fn touch(&mut self, key: &K) -> bool;

    /// 0 is the most recently used entry.
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// Eviction driven by random selection.
pub trait RandomEviction<K, V>: EvictingDictionary<K, V> {
    fn random_key(&self) -> Result<&K, DictError>;

    fn random_entry(&self) -> Result<(&K, &V), DictError>;

    /// Removes a randomly selected entry and returns it.
    fn take_random(&mut self) -> Result<(K, V), DictError>;
}
