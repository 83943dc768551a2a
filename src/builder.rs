//! Configuration layer for both dictionaries.
//!
//! [`DictBuilder`] collects capacity, eviction mode, an optional explicit
//! bucket count, the hasher and the random source, validates them once, and
//! builds either container. [`DictBuilder::build`] returns a [`Dict`], a
//! single wrapper over every eviction policy.
//!
//! ## Example
//!
//! ```rust
//! use cachedict::builder::{DictBuilder, DictPolicy};
//! use cachedict::random::LockedRandom;
//! use cachedict::EvictionMode;
//!
//! let mut recency = DictBuilder::new(100)
//!     .mode(EvictionMode::Mru)
//!     .buckets(256)
//!     .build_recency::<u64, String>()
//!     .unwrap();
//! recency.set(1, "one".to_string()).unwrap();
//! assert_eq!(recency.bucket_count(), 256);
//!
//! let roulette = DictBuilder::new(10)
//!     .random_source(LockedRandom::seeded(1))
//!     .build_roulette::<u64, u64>()
//!     .unwrap();
//! assert!(roulette.is_empty());
//!
//! let mut dict = DictBuilder::new(2).build::<u64, &str>(DictPolicy::Lru).unwrap();
//! dict.insert(1, "one");
//! dict.insert(2, "two");
//! dict.insert(3, "three");
//! assert!(!dict.contains(&1));
//! ```

use std::hash::{BuildHasher, Hash};

use rustc_hash::FxBuildHasher;

use crate::dict::{EvictionMode, RecencyDictionary, RouletteDictionary, SetOutcome};
use crate::ds::sizing;
use crate::error::DictError;
use crate::random::{RandomSource, ThreadLocalRandom};

/// Eviction policies a [`Dict`] can be built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictPolicy {
    /// Recency dictionary evicting the least recently used entry.
    Lru,
    /// Recency dictionary evicting the most recently used entry.
    Mru,
    /// Roulette dictionary evicting a random entry.
    Random,
}

/// One dictionary behind a policy chosen at runtime.
pub struct Dict<K, V, S = FxBuildHasher, R = ThreadLocalRandom> {
    inner: DictInner<K, V, S, R>,
}

enum DictInner<K, V, S, R> {
    Recency(RecencyDictionary<K, V, S>),
    Roulette(RouletteDictionary<K, V, R, S>),
}

impl<K, V, S, R> Dict<K, V, S, R>
where
    K: Hash + Eq,
    S: BuildHasher,
    R: RandomSource,
{
    /// Inserts or updates, evicting per policy once `len()` reaches
    /// `capacity()`.
    pub fn insert(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        match &mut self.inner {
            DictInner::Recency(dict) => dict.set_and_maintain_count(key, value),
            DictInner::Roulette(dict) => dict.set_and_maintain_count(key, value),
        }
    }

    /// Looks up `key`; recency policies mark it as used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match &mut self.inner {
            DictInner::Recency(dict) => dict.try_get(key),
            DictInner::Roulette(dict) => dict.try_get(key),
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        match &self.inner {
            DictInner::Recency(dict) => dict.contains_key(key),
            DictInner::Roulette(dict) => dict.contains_key(key),
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let entry = match &mut self.inner {
            DictInner::Recency(dict) => dict.remove_entry(key),
            DictInner::Roulette(dict) => dict.remove_entry(key),
        };
        entry.map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        match &self.inner {
            DictInner::Recency(dict) => dict.len(),
            DictInner::Roulette(dict) => dict.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        match &self.inner {
            DictInner::Recency(dict) => dict.capacity(),
            DictInner::Roulette(dict) => dict.capacity(),
        }
    }

    pub fn clear(&mut self) {
        match &mut self.inner {
            DictInner::Recency(dict) => dict.clear(),
            DictInner::Roulette(dict) => dict.clear(),
        }
    }

    pub fn trim(&mut self) {
        match &mut self.inner {
            DictInner::Recency(dict) => dict.trim(),
            DictInner::Roulette(dict) => dict.trim(),
        }
    }
}

/// Builder for dictionary instances.
#[derive(Debug, Clone)]
pub struct DictBuilder<S = FxBuildHasher, R = ThreadLocalRandom> {
    capacity: usize,
    mode: EvictionMode,
    buckets: Option<usize>,
    hasher: S,
    source: R,
}

impl DictBuilder {
    /// Starts a builder for `capacity` entries with every other setting at
    /// its default.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            mode: EvictionMode::Lru,
            buckets: None,
            hasher: FxBuildHasher,
            source: ThreadLocalRandom,
        }
    }
}

impl<S, R> DictBuilder<S, R> {
    /// Eviction mode for [`build_recency`](Self::build_recency).
    pub fn mode(mut self, mode: EvictionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Explicit initial bucket count, overriding the one derived from
    /// capacity. Must be a power of two, at least 8.
    pub fn buckets(mut self, buckets: usize) -> Self {
        self.buckets = Some(buckets);
        self
    }

    pub fn hasher<S2>(self, hasher: S2) -> DictBuilder<S2, R> {
        DictBuilder {
            capacity: self.capacity,
            mode: self.mode,
            buckets: self.buckets,
            hasher,
            source: self.source,
        }
    }

    /// Random source for [`build_roulette`](Self::build_roulette).
    pub fn random_source<R2>(self, source: R2) -> DictBuilder<S, R2> {
        DictBuilder {
            capacity: self.capacity,
            mode: self.mode,
            buckets: self.buckets,
            hasher: self.hasher,
            source,
        }
    }

    fn bucket_count(&self) -> Result<usize, DictError> {
        let derived = sizing::bucket_count_for(self.capacity)?;
        match self.buckets {
            Some(explicit) => sizing::validate_bucket_count(explicit),
            None => Ok(derived),
        }
    }

    /// # Errors
    ///
    /// [`DictError::CapacityExceeded`] for a capacity or bucket count over
    /// the maximum, [`DictError::InvalidArgument`] for a bucket count that
    /// is not a power of two or is below 8.
    pub fn build_recency<K, V>(self) -> Result<RecencyDictionary<K, V, S>, DictError>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        let bucket_count = self.bucket_count()?;
        Ok(RecencyDictionary::from_parts(
            bucket_count,
            self.capacity,
            self.mode,
            self.hasher,
        ))
    }

    /// # Errors
    ///
    /// As for [`build_recency`](Self::build_recency).
    pub fn build_roulette<K, V>(self) -> Result<RouletteDictionary<K, V, R, S>, DictError>
    where
        K: Hash + Eq,
        S: BuildHasher,
        R: RandomSource,
    {
        let bucket_count = self.bucket_count()?;
        Ok(RouletteDictionary::from_parts(
            bucket_count,
            self.capacity,
            self.hasher,
            self.source,
        ))
    }

    /// Builds a [`Dict`] for `policy`. The policy overrides any
    /// [`mode`](Self::mode) set earlier.
    pub fn build<K, V>(self, policy: DictPolicy) -> Result<Dict<K, V, S, R>, DictError>
    where
        K: Hash + Eq,
        S: BuildHasher,
        R: RandomSource,
    {
        let inner = match policy {
            DictPolicy::Lru => DictInner::Recency(self.mode(EvictionMode::Lru).build_recency()?),
            DictPolicy::Mru => DictInner::Recency(self.mode(EvictionMode::Mru).build_recency()?),
            DictPolicy::Random => DictInner::Roulette(self.build_roulette()?),
        };
        Ok(Dict { inner })
    }
}
