//! # Roulette Dictionary
//!
//! A chained hash table that can pick and evict a random entry in O(1)
//! expected time. There is no secondary ordering: the bucket array itself is
//! the wheel that gets spun.
//!
//! ## Architecture
//!
//! ```text
//!   buckets (BucketArray, len = 8)
//!   ┌───┬───┬───┬───┬───┬───┬───┬───┐
//!   │ ∅ │ ● │ ∅ │ ∅ │ ● │ ∅ │ ∅ │ ∅ │
//!   └───┴─┼─┴───┴───┴─┼─┴───┴───┴───┘
//!         ▼           ▼
//!        [a]◄─►[b]   [c]
//!
//!   random_key():
//!     1. r = source.next_index(8)          say r = 2
//!     2. scan forward (wrapping) from r    bucket 4 is the first occupied
//!     3. return the chain head             → c
//!
//!   random_key_where(pred):
//!     same start, then walk every chain in order (4, 5, …, 0, 1, …) until
//!     pred matches; each bucket is visited at most once
//! ```
//!
//! The start bucket is uniform, but within a chain only the head can be the
//! first candidate, so entries deeper in a chain are picked less often.
//! With the load factor kept at or below 1 the bias is small.
//!
//! ## Example Usage
//!
//! ```
//! use cachedict::random::LockedRandom;
//! use cachedict::{RouletteDictionary, SetOutcome};
//!
//! let mut dict = RouletteDictionary::with_random_source(2, LockedRandom::seeded(7));
//! dict.set_and_maintain_count("a", 1);
//! dict.set_and_maintain_count("b", 2);
//!
//! let outcome = dict.set_and_maintain_count("c", 3);
//! assert!(outcome.is_evicted());
//! assert_eq!(dict.len(), 2);
//! assert!(dict.contains_key(&"c"));
//! ```
//!
//! ## Thread Safety
//!
//! Mutation needs `&mut self`. Random reads only need `&self`, so the random
//! source must be safe to call through a shared reference; see
//! [`crate::random`].

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;
use std::mem;

use log::{debug, trace, warn};
use rustc_hash::FxBuildHasher;

use crate::dict::SetOutcome;
use crate::ds::bucket_array::{BucketArray, BucketIdIter, ChainLinks, ChainNode, ChainProbe};
use crate::ds::node_pool::{IntoValues, MAX_POOLED_NODES, NodeId, NodePool, Relocation};
use crate::ds::sizing;
use crate::error::{DictError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::RouletteMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::RouletteMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsSnapshotProvider, RouletteMetricsReadRecorder,
    RouletteMetricsRecorder,
};
use crate::random::{RandomSource, ThreadLocalRandom};
use crate::traits::{CoreDictionary, EvictingDictionary, RandomEviction};

struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    chain: ChainLinks,
}

impl<K, V> ChainNode for Entry<K, V> {
    #[inline]
    fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    fn chain(&self) -> &ChainLinks {
        &self.chain
    }

    #[inline]
    fn chain_mut(&mut self) -> &mut ChainLinks {
        &mut self.chain
    }
}

/// Hash table with uniform-start random selection and eviction.
///
/// `R` supplies bucket indices (default [`ThreadLocalRandom`]); `S` hashes
/// keys (default [`FxBuildHasher`]).
pub struct RouletteDictionary<K, V, R = ThreadLocalRandom, S = FxBuildHasher> {
    pool: NodePool<Entry<K, V>>,
    buckets: BucketArray,
    capacity: usize,
    hasher: S,
    source: R,
    #[cfg(feature = "metrics")]
    metrics: RouletteMetrics,
}

impl<K, V> RouletteDictionary<K, V> {
    /// Creates an empty dictionary with capacity 0 (8 buckets).
    pub fn new() -> Self {
        Self::from_parts(
            sizing::MIN_BUCKETS,
            0,
            FxBuildHasher,
            ThreadLocalRandom,
        )
    }

    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`](sizing::MAX_CAPACITY).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_random_source(capacity, ThreadLocalRandom)
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, DictError> {
        Self::try_with_random_source(capacity, ThreadLocalRandom)
    }
}

impl<K, V, R: RandomSource> RouletteDictionary<K, V, R> {
    /// Creates a dictionary drawing bucket indices from `source`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`](sizing::MAX_CAPACITY).
    pub fn with_random_source(capacity: usize, source: R) -> Self {
        match Self::try_with_random_source(capacity, source) {
            Ok(dict) => dict,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_with_random_source(capacity: usize, source: R) -> Result<Self, DictError> {
        let bucket_count = sizing::bucket_count_for(capacity)?;
        Ok(Self::from_parts(bucket_count, capacity, FxBuildHasher, source))
    }
}

impl<K, V, R, S> RouletteDictionary<K, V, R, S> {
    pub(crate) fn from_parts(bucket_count: usize, capacity: usize, hasher: S, source: R) -> Self {
        Self {
            pool: NodePool::with_capacity(capacity.min(bucket_count)),
            buckets: BucketArray::with_len(bucket_count),
            capacity,
            hasher,
            source,
            #[cfg(feature = "metrics")]
            metrics: RouletteMetrics::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// The entry count [`set_and_maintain_count`](Self::set_and_maintain_count)
    /// keeps the dictionary at.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn random_source(&self) -> &R {
        &self.source
    }

    pub fn pooled_nodes(&self) -> usize {
        self.pool.pooled()
    }

    /// Iterates in bucket order, each chain oldest first.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            pool: &self.pool,
            ids: self.buckets.iter_ids(&self.pool),
            remaining: self.pool.len(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Mutable values in bucket order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        let order: Vec<NodeId> = self.buckets.iter_ids(&self.pool).collect();
        let mut by_slot: Vec<Option<&mut V>> = self
            .pool
            .slots_mut()
            .map(|slot| slot.map(|entry| &mut entry.value))
            .collect();
        let values: Vec<&mut V> = order
            .into_iter()
            .filter_map(|id| by_slot[id.index()].take())
            .collect();
        ValuesMut {
            inner: values.into_iter(),
        }
    }

    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.pool.clear();
        self.buckets.clear();
    }

    /// Shrinks the bucket array to the smallest power of two holding `len`
    /// entries (minimum 8), drops pooled nodes and compacts the node arena.
    pub fn trim(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_trim();

        let pooled = self.pool.pooled();
        while let Some(step) = self.pool.compact_step() {
            if let Some(relocation) = step {
                self.apply_relocation(relocation);
            }
        }
        self.pool.shrink_to_fit();

        let from = self.buckets.len();
        let to = sizing::trimmed(self.pool.len());
        if to != from {
            self.buckets.rehash(&mut self.pool, to);
        }
        debug!(
            "roulette dictionary trimmed: buckets {from} -> {to}, dropped {pooled} pooled nodes"
        );
    }

    fn unlink_and_release(&mut self, id: NodeId) -> (K, V) {
        self.buckets.unlink(&mut self.pool, id);
        let Some((entry, moved)) = self.pool.release(id) else {
            unreachable!("released vacant node {}", id.index());
        };
        if let Some(relocation) = moved {
            self.apply_relocation(relocation);
        }
        (entry.key, entry.value)
    }

    fn apply_relocation(&mut self, relocation: Relocation) {
        trace!(
            "roulette dictionary node moved {} -> {}",
            relocation.from.index(),
            relocation.to.index()
        );
        self.buckets.relocate(&mut self.pool, relocation);
    }

    fn grow(&mut self) -> Result<(), DictError> {
        let from = self.buckets.len();
        let to = match sizing::grown(from) {
            Ok(to) => to,
            Err(err) => {
                warn!("roulette dictionary cannot grow past {from} buckets: {err}");
                return Err(err);
            },
        };
        self.buckets.rehash(&mut self.pool, to);
        debug!("roulette dictionary grew: buckets {from} -> {to}");

        #[cfg(feature = "metrics")]
        self.metrics.record_grow();

        Ok(())
    }

    fn link_new(&mut self, probe: ChainProbe, hash: u64, key: K, value: V) {
        let id = self.pool.insert(Entry {
            key,
            value,
            hash,
            chain: ChainLinks::default(),
        });
        self.buckets.append(&mut self.pool, probe.bucket, probe.tail, id);
    }
}

impl<K, V, R, S> RouletteDictionary<K, V, R, S>
where
    R: RandomSource,
{
    /// First occupied bucket at or after a uniformly drawn index.
    fn spin(&self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let start = self.source.next_index(self.buckets.len());
        self.buckets.next_occupied(start)
    }

    /// Scans chains from a random occupied bucket, wrapping once, and returns
    /// the first entry accepted by `pred`.
    fn select<F>(&self, mut pred: F) -> Result<NodeId, DictError>
    where
        F: FnMut(&K, &V) -> bool,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_random_pick_call();

        let first = self.spin().ok_or(DictError::EmptyContainer)?;
        let mask = self.buckets.mask();
        for offset in 0..self.buckets.len() {
            let bucket = (first + offset) & mask;
            for id in self.buckets.chain(&self.pool, bucket) {
                #[cfg(feature = "metrics")]
                self.metrics.record_random_scan_step();

                let entry = &self.pool[id];
                if pred(&entry.key, &entry.value) {
                    #[cfg(feature = "metrics")]
                    self.metrics.record_random_pick_found();

                    return Ok(id);
                }
            }
        }
        Err(DictError::NoMatch)
    }

    /// A random key.
    ///
    /// # Errors
    ///
    /// [`DictError::EmptyContainer`] if there are no entries.
    pub fn random_key(&self) -> Result<&K, DictError> {
        self.random_entry().map(|(key, _)| key)
    }

    pub fn random_value(&self) -> Result<&V, DictError> {
        self.random_entry().map(|(_, value)| value)
    }

    pub fn random_entry(&self) -> Result<(&K, &V), DictError> {
        self.random_entry_where(|_, _| true)
    }

    /// A random key whose entry satisfies `pred`.
    ///
    /// # Errors
    ///
    /// [`DictError::EmptyContainer`] if there are no entries, or
    /// [`DictError::NoMatch`] if no entry satisfies `pred`.
    pub fn random_key_where<F>(&self, pred: F) -> Result<&K, DictError>
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.random_entry_where(pred).map(|(key, _)| key)
    }

    pub fn random_value_where<F>(&self, pred: F) -> Result<&V, DictError>
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.random_entry_where(pred).map(|(_, value)| value)
    }

    pub fn random_entry_where<F>(&self, pred: F) -> Result<(&K, &V), DictError>
    where
        F: FnMut(&K, &V) -> bool,
    {
        let id = self.select(pred)?;
        let entry = &self.pool[id];
        Ok((&entry.key, &entry.value))
    }

    /// Removes a random entry. Returns `false` when empty.
    pub fn remove_random(&mut self) -> bool {
        self.take_random().is_ok()
    }

    /// Removes a random entry satisfying `pred`. Returns `false` when there
    /// is none.
    pub fn remove_random_where<F>(&mut self, pred: F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.take_random_where(pred).is_ok()
    }

    /// Removes a random entry and returns it.
    pub fn take_random(&mut self) -> Result<(K, V), DictError> {
        self.take_random_where(|_, _| true)
    }

    pub fn take_random_where<F>(&mut self, pred: F) -> Result<(K, V), DictError>
    where
        F: FnMut(&K, &V) -> bool,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_random_call();

        let id = self.select(pred)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_remove_random_found();

        Ok(self.unlink_and_release(id))
    }
}

impl<K, V, R, S> RouletteDictionary<K, V, R, S>
where
    K: Hash + Eq,
    R: RandomSource,
    S: BuildHasher,
{
    /// Creates a dictionary with an explicit hasher and random source.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`](sizing::MAX_CAPACITY).
    pub fn with_hasher_and_source(capacity: usize, hasher: S, source: R) -> Self {
        match Self::try_with_hasher_and_source(capacity, hasher, source) {
            Ok(dict) => dict,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_with_hasher_and_source(
        capacity: usize,
        hasher: S,
        source: R,
    ) -> Result<Self, DictError> {
        let bucket_count = sizing::bucket_count_for(capacity)?;
        Ok(Self::from_parts(bucket_count, capacity, hasher, source))
    }

    #[inline]
    fn hash_of<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        self.hasher.hash_one(key)
    }

    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        let found = self
            .buckets
            .probe(&self.pool, hash, |entry| entry.key.borrow() == key)
            .found;

        #[cfg(feature = "metrics")]
        self.metrics.record_lookup(found.is_some());

        found
    }

    /// # Errors
    ///
    /// [`DictError::KeyNotFound`] if the key is absent.
    pub fn get<Q>(&self, key: &Q) -> Result<&V, DictError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.try_get(key).ok_or(DictError::KeyNotFound)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, DictError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.try_get_mut(key).ok_or(DictError::KeyNotFound)
    }

    pub fn try_get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.find(key)?;
        Some(&self.pool[id].value)
    }

    pub fn try_get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.find(key)?;
        Some(&mut self.pool[id].value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        self.buckets
            .probe(&self.pool, hash, |entry| entry.key.borrow() == key)
            .found
            .is_some()
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Inserts or overwrites `key`. Never evicts.
    ///
    /// # Errors
    ///
    /// [`DictError::CapacityExceeded`] if a new key would require growing
    /// past the maximum bucket count. The dictionary is left unchanged.
    pub fn set(&mut self, key: K, value: V) -> Result<Option<V>, DictError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let hash = self.hash_of(&key);
        let probe = self.buckets.probe(&self.pool, hash, |entry| entry.key == key);
        if let Some(id) = probe.found {
            return Ok(Some(self.overwrite(id, value)));
        }
        self.insert_new(probe, hash, key, value)?;
        Ok(None)
    }

    /// Inserts a new key.
    ///
    /// # Errors
    ///
    /// [`DictError::DuplicateKey`] if `key` is already present.
    pub fn add(&mut self, key: K, value: V) -> Result<(), DictError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let hash = self.hash_of(&key);
        let probe = self.buckets.probe(&self.pool, hash, |entry| entry.key == key);
        if probe.found.is_some() {
            return Err(DictError::DuplicateKey);
        }
        self.insert_new(probe, hash, key, value)
    }

    /// Inserts or overwrites `key`, evicting a random entry first when a new
    /// key arrives while the dictionary already holds
    /// [`capacity`](Self::capacity) entries.
    ///
    /// The victim is the head of the first occupied bucket at or after a
    /// random index. When that is the new key's own bucket, the head seen
    /// while searching for the key is reused. The victim is unlinked before
    /// the new entry is appended.
    pub fn set_and_maintain_count(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let hash = self.hash_of(&key);
        let probe = self.buckets.probe(&self.pool, hash, |entry| entry.key == key);
        if let Some(id) = probe.found {
            return SetOutcome::Updated(self.overwrite(id, value));
        }

        let mut evict = !self.is_empty() && self.len() >= self.capacity;
        let mut probe = probe;
        if !evict && self.len() >= self.buckets.len() {
            match self.grow() {
                Ok(()) => probe = self.buckets.probe(&self.pool, hash, |_| false),
                // Only reachable at the bucket cap; make room instead of failing.
                Err(_) => evict = true,
            }
        }

        if !evict {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_new();

            self.link_new(probe, hash, key, value);
            return SetOutcome::Inserted;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();

        let Some(bucket) = self.spin() else {
            unreachable!("eviction from an empty roulette dictionary");
        };
        let victim = if bucket == probe.bucket {
            probe.head
        } else {
            self.buckets.head(bucket)
        };
        let Some(victim) = victim else {
            unreachable!("occupied bucket {bucket} has no head");
        };
        let (old_key, old_value) = self.unlink_and_release(victim);

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_evicted_entry();
            self.metrics.record_insert_new();
        }

        // The old tail may be gone or relocated; find the current one.
        let probe = self.buckets.probe(&self.pool, hash, |_| false);
        self.link_new(probe, hash, key, value);
        SetOutcome::Evicted(old_key, old_value)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        let id = self
            .buckets
            .probe(&self.pool, hash, |entry| entry.key.borrow() == key)
            .found?;
        Some(self.unlink_and_release(id))
    }

    fn overwrite(&mut self, id: NodeId, value: V) -> V {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_update();

        mem::replace(&mut self.pool[id].value, value)
    }

    fn insert_new(
        &mut self,
        probe: ChainProbe,
        hash: u64,
        key: K,
        value: V,
    ) -> Result<(), DictError> {
        let probe = if self.len() >= self.buckets.len() {
            self.grow()?;
            self.buckets.probe(&self.pool, hash, |_| false)
        } else {
            probe
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        self.link_new(probe, hash, key, value);
        Ok(())
    }

    /// Validates chains and the node pool.
    pub fn check_invariants(&self) -> Result<(), InvariantError>
    where
        K: fmt::Debug,
    {
        let len = self.pool.len();
        if self.pool.slots() != len + self.pool.pooled() {
            return Err(InvariantError::new(format!(
                "pool slots {} != len {} + pooled {}",
                self.pool.slots(),
                len,
                self.pool.pooled()
            )));
        }
        if self.pool.pooled() > MAX_POOLED_NODES {
            return Err(InvariantError::new(format!(
                "{} pooled nodes exceeds limit {MAX_POOLED_NODES}",
                self.pool.pooled()
            )));
        }
        sizing::validate_bucket_count(self.buckets.len())
            .map_err(|err| InvariantError::new(format!("bucket count: {err}")))?;

        let mut seen = 0usize;
        for bucket in 0..self.buckets.len() {
            let mut prev: Option<NodeId> = None;
            let mut current = self.buckets.head(bucket);
            while let Some(id) = current {
                seen += 1;
                if seen > len {
                    return Err(InvariantError::new(format!(
                        "chains hold more than {len} nodes (cycle?)"
                    )));
                }
                let entry = self.pool.get(id).ok_or_else(|| {
                    InvariantError::new(format!("bucket {bucket}: stale NodeId {id:?}"))
                })?;
                if entry.chain.prev != prev {
                    return Err(InvariantError::new(format!(
                        "bucket {bucket}: node {:?} prev pointer inconsistent",
                        entry.key
                    )));
                }
                if self.buckets.index_for(entry.hash) != bucket
                    || self.hash_of(&entry.key) != entry.hash
                {
                    return Err(InvariantError::new(format!(
                        "node {:?} is in bucket {bucket} but does not hash there",
                        entry.key
                    )));
                }
                let first = self
                    .buckets
                    .probe(&self.pool, entry.hash, |other| other.key == entry.key)
                    .found;
                if first != Some(id) {
                    return Err(InvariantError::new(format!(
                        "duplicate key {:?} in bucket {bucket}",
                        entry.key
                    )));
                }
                prev = Some(id);
                current = entry.chain.next;
            }
        }
        if seen != len {
            return Err(InvariantError::new(format!(
                "chains hold {seen} nodes but len = {len}"
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "metrics")]
impl<K, V, R, S> RouletteDictionary<K, V, R, S> {
    pub fn metrics_snapshot(&self) -> RouletteMetricsSnapshot {
        RouletteMetricsSnapshot {
            get_calls: self.metrics.get_calls.get(),
            get_hits: self.metrics.get_hits.get(),
            get_misses: self.metrics.get_misses.get(),
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            grows: self.metrics.grows,
            trims: self.metrics.trims,
            clears: self.metrics.clears,
            remove_random_calls: self.metrics.remove_random_calls,
            remove_random_found: self.metrics.remove_random_found,
            random_pick_calls: self.metrics.random_pick_calls.get(),
            random_pick_found: self.metrics.random_pick_found.get(),
            random_scan_steps: self.metrics.random_scan_steps.get(),
            len: self.len(),
            capacity: self.capacity,
            bucket_count: self.buckets.len(),
            pooled_nodes: self.pool.pooled(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, R, S> MetricsSnapshotProvider<RouletteMetricsSnapshot>
    for RouletteDictionary<K, V, R, S>
{
    fn snapshot(&self) -> RouletteMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V, R, S> CoreDictionary<K, V> for RouletteDictionary<K, V, R, S>
where
    K: Hash + Eq,
    R: RandomSource,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        RouletteDictionary::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        RouletteDictionary::contains_key(self, key)
    }

    fn lookup(&mut self, key: &K) -> Option<&V> {
        self.try_get(key)
    }

    fn set(&mut self, key: K, value: V) -> Result<Option<V>, DictError> {
        RouletteDictionary::set(self, key, value)
    }

    fn add(&mut self, key: K, value: V) -> Result<(), DictError> {
        RouletteDictionary::add(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    fn clear(&mut self) {
        RouletteDictionary::clear(self);
    }

    fn trim(&mut self) {
        RouletteDictionary::trim(self);
    }

    fn bucket_count(&self) -> usize {
        RouletteDictionary::bucket_count(self)
    }
}

impl<K, V, R, S> EvictingDictionary<K, V> for RouletteDictionary<K, V, R, S>
where
    K: Hash + Eq,
    R: RandomSource,
    S: BuildHasher,
{
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn set_and_maintain_count(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        RouletteDictionary::set_and_maintain_count(self, key, value)
    }
}

impl<K, V, R, S> RandomEviction<K, V> for RouletteDictionary<K, V, R, S>
where
    K: Hash + Eq,
    R: RandomSource,
    S: BuildHasher,
{
    fn random_key(&self) -> Result<&K, DictError> {
        RouletteDictionary::random_key(self)
    }

    fn random_entry(&self) -> Result<(&K, &V), DictError> {
        RouletteDictionary::random_entry(self)
    }

    fn take_random(&mut self) -> Result<(K, V), DictError> {
        RouletteDictionary::take_random(self)
    }
}

impl<K, V, R: Default, S: Default> Default for RouletteDictionary<K, V, R, S> {
    fn default() -> Self {
        Self::from_parts(sizing::MIN_BUCKETS, 0, S::default(), R::default())
    }
}

impl<K, V, R, S> fmt::Debug for RouletteDictionary<K, V, R, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouletteDictionary")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("bucket_count", &self.buckets.len())
            .field("entries", &DebugEntries(self))
            .finish()
    }
}

struct DebugEntries<'a, K, V, R, S>(&'a RouletteDictionary<K, V, R, S>);

impl<K: fmt::Debug, V: fmt::Debug, R, S> fmt::Debug for DebugEntries<'_, K, V, R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K, V, R, S> Extend<(K, V)> for RouletteDictionary<K, V, R, S>
where
    K: Hash + Eq,
    R: RandomSource,
    S: BuildHasher,
{
    /// # Panics
    ///
    /// Panics if the bucket array would have to grow past its maximum.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            if let Err(err) = self.set(key, value) {
                panic!("{err}");
            }
        }
    }
}

impl<K, V, R, S> FromIterator<(K, V)> for RouletteDictionary<K, V, R, S>
where
    K: Hash + Eq,
    R: RandomSource + Default,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::default();
        dict.extend(iter);
        dict
    }
}

impl<'a, K, V, R, S> IntoIterator for &'a RouletteDictionary<K, V, R, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, R, S> IntoIterator for RouletteDictionary<K, V, R, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Consumes the dictionary; the order is unspecified.
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.pool.len(),
            inner: self.pool.into_values(),
        }
    }
}

/// Borrowing iterator in bucket order.
pub struct Iter<'a, K, V> {
    pool: &'a NodePool<Entry<K, V>>,
    ids: BucketIdIter<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.ids.next()?;
        self.remaining -= 1;
        let entry = &self.pool[id];
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

pub struct ValuesMut<'a, V> {
    inner: std::vec::IntoIter<&'a mut V>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}

pub struct IntoIter<K, V> {
    inner: IntoValues<Entry<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        let entry = self.inner.next()?;
        self.remaining -= 1;
        Some((entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
