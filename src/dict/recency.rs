//! # Recency Dictionary
//!
//! A chained hash table whose entries are also threaded onto a recency list,
//! so a single node answers both "where is key K" and "who was touched
//! least/most recently". It is the building block for LRU and MRU caches:
//! [`RecencyDictionary::set_and_maintain_count`] inserts and evicts in one
//! step.
//!
//! ## Architecture
//!
//! ```text
//!   buckets (BucketArray, len = 8)        recency (RecencyList)
//!   ┌───┬───┬───┬───┬───┬───┬───┬───┐
//!   │ ∅ │ ● │ ∅ │ ● │ ∅ │ ∅ │ ∅ │ ∅ │     head ─► [C] ◄──► [A] ◄──► [B] ◄─ tail
//!   └───┴─┼─┴───┴─┼─┴───┴───┴───┴───┘             (MRU)              (LRU)
//!         ▼       ▼
//!        [A]◄─►[C] [B]                    chain links and recency links live in
//!                                         the same Entry inside one NodePool
//!
//!   Entry<K, V> { key, value, hash, chain: {prev, next}, links: {prev, next} }
//! ```
//!
//! ## Operations
//!
//! | Method                     | Complexity | Effect on recency            |
//! |----------------------------|------------|------------------------------|
//! | `get` / `try_get`          | O(1)       | hit moves entry to MRU       |
//! | `peek` / `contains_key`    | O(1)       | none                         |
//! | `set` / `add`              | O(1)*      | new or updated entry at MRU  |
//! | `set_and_maintain_count`   | O(1)*      | evicts LRU or MRU when full  |
//! | `remove`                   | O(1)       | entry leaves the list        |
//! | `pop_least_recent`         | O(1)       | tail leaves the list         |
//! | `recency_rank`             | O(n)       | none                         |
//! | `trim`                     | O(n)       | none                         |
//!
//! `*` amortized: a new key arriving when `len == bucket_count` doubles the
//! bucket array first. Growth rewires chain links only; recency links are
//! never touched by a rehash.
//!
//! ## Example Usage
//!
//! ```
//! use cachedict::{EvictionMode, RecencyDictionary, SetOutcome};
//!
//! let mut dict = RecencyDictionary::with_mode(2, EvictionMode::Lru);
//! dict.set_and_maintain_count("a", 1);
//! dict.set_and_maintain_count("b", 2);
//!
//! // "a" becomes most recent, so "b" is evicted next.
//! assert_eq!(dict.get(&"a"), Ok(&1));
//! assert_eq!(dict.set_and_maintain_count("c", 3), SetOutcome::Evicted("b", 2));
//!
//! let order: Vec<_> = dict.keys().copied().collect();
//! assert_eq!(order, vec!["c", "a"]);
//! ```
//!
//! ## Thread Safety
//!
//! Not internally synchronized. Every mutation takes `&mut self`, so share
//! it behind a lock if several threads need it.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;
use std::mem;

use log::{debug, trace, warn};
use rustc_hash::FxBuildHasher;

use crate::dict::{EvictionMode, SetOutcome};
use crate::ds::bucket_array::{BucketArray, ChainLinks, ChainNode, ChainProbe};
use crate::ds::node_pool::{MAX_POOLED_NODES, NodeId, NodePool, Relocation};
use crate::ds::recency_list::{RecencyIdIter, RecencyLinks, RecencyList, RecencyNode};
use crate::ds::sizing;
use crate::error::{DictError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::RecencyMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::RecencyMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsSnapshotProvider, RecencyMetricsReadRecorder,
    RecencyMetricsRecorder,
};
use crate::traits::{CoreDictionary, EvictingDictionary, RecencyTracking};

/// One key/value pair, linked into a bucket chain and the recency list.
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
    chain: ChainLinks,
    links: RecencyLinks,
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

impl<K, V> RecencyNode for Entry<K, V> {
    #[inline]
    fn recency(&self) -> &RecencyLinks {
        &self.links
    }

    #[inline]
    fn recency_mut(&mut self) -> &mut RecencyLinks {
        &mut self.links
    }
}

/// Hash table with an intrusive most-recent → least-recent ordering.
///
/// Lookups that hit ([`get`](Self::get), [`try_get`](Self::try_get),
/// [`touch`](Self::touch)) and every write move the entry to the MRU end.
/// [`peek`](Self::peek) and [`contains_key`](Self::contains_key) never do.
/// Iteration always runs MRU → LRU.
pub struct RecencyDictionary<K, V, S = FxBuildHasher> {
    pool: NodePool<Entry<K, V>>,
    buckets: BucketArray,
    recency: RecencyList,
    mode: EvictionMode,
    capacity: usize,
    hasher: S,
    #[cfg(feature = "metrics")]
    metrics: RecencyMetrics,
}

impl<K, V> RecencyDictionary<K, V, FxBuildHasher> {
    /// Creates an empty LRU dictionary with capacity 0 (8 buckets).
    pub fn new() -> Self {
        Self::from_parts(sizing::MIN_BUCKETS, 0, EvictionMode::Lru, FxBuildHasher)
    }

    /// Creates an LRU dictionary sized for `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`](sizing::MAX_CAPACITY).
    /// Use [`try_with_capacity`](Self::try_with_capacity) to handle that case.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_mode(capacity, EvictionMode::Lru)
    }

    /// Creates a dictionary sized for `capacity` entries with the given
    /// eviction mode.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`](sizing::MAX_CAPACITY).
    pub fn with_mode(capacity: usize, mode: EvictionMode) -> Self {
        match Self::try_with_mode(capacity, mode) {
            Ok(dict) => dict,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, DictError> {
        Self::try_with_mode(capacity, EvictionMode::Lru)
    }

    /// Fallible [`with_mode`](Self::with_mode).
    pub fn try_with_mode(capacity: usize, mode: EvictionMode) -> Result<Self, DictError> {
        let bucket_count = sizing::bucket_count_for(capacity)?;
        Ok(Self::from_parts(bucket_count, capacity, mode, FxBuildHasher))
    }
}

impl<K, V, S> RecencyDictionary<K, V, S> {
    /// Assembles a dictionary from already validated sizing.
    pub(crate) fn from_parts(
        bucket_count: usize,
        capacity: usize,
        mode: EvictionMode,
        hasher: S,
    ) -> Self {
        Self {
            pool: NodePool::with_capacity(capacity.min(bucket_count)),
            buckets: BucketArray::with_len(bucket_count),
            recency: RecencyList::new(),
            mode,
            capacity,
            hasher,
            #[cfg(feature = "metrics")]
            metrics: RecencyMetrics::default(),
        }
    }

    /// Number of live entries.
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

    /// Current number of buckets (always a power of two, at least 8).
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn mode(&self) -> EvictionMode {
        self.mode
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Vacant node slots currently held for reuse.
    pub fn pooled_nodes(&self) -> usize {
        self.pool.pooled()
    }

    /// Least recently used entry, without touching it.
    pub fn least_recent(&self) -> Result<(&K, &V), DictError> {
        let id = self.recency.tail().ok_or(DictError::EmptyContainer)?;
        let entry = &self.pool[id];
        Ok((&entry.key, &entry.value))
    }

    /// Most recently used entry, without touching it.
    pub fn most_recent(&self) -> Result<(&K, &V), DictError> {
        let id = self.recency.head().ok_or(DictError::EmptyContainer)?;
        let entry = &self.pool[id];
        Ok((&entry.key, &entry.value))
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_least_recent(&mut self) -> Result<(K, V), DictError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_call();

        let id = self.recency.tail().ok_or(DictError::EmptyContainer)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_found();

        Ok(self.unlink_and_release(id))
    }

    /// Removes and returns the most recently used entry.
    pub fn pop_most_recent(&mut self) -> Result<(K, V), DictError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_call();

        let id = self.recency.head().ok_or(DictError::EmptyContainer)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_pop_found();

        Ok(self.unlink_and_release(id))
    }

    /// Removes the least recently used entry. Returns `false` when empty.
    pub fn remove_least_recent(&mut self) -> bool {
        self.pop_least_recent().is_ok()
    }

    /// Removes the most recently used entry. Returns `false` when empty.
    pub fn remove_most_recent(&mut self) -> bool {
        self.pop_most_recent().is_ok()
    }

    /// Iterates over entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            pool: &self.pool,
            ids: self.recency.iter_ids(&self.pool),
            remaining: self.pool.len(),
        }
    }

    /// Keys, most recent first.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Values, most recent first.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Mutable values, most recent first. Recency is not affected.
    ///
    /// # Performance
    ///
    /// Unlike [`values`](Self::values) this is not a free view: every call
    /// walks the recency list and allocates two `len()`-sized vectors before
    /// yielding anything.
    pub fn values_mut(&mut self) -> ValuesMut<'_, V> {
        let order: Vec<NodeId> = self.recency.iter_ids(&self.pool).collect();
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

    /// Drops every entry. The bucket count is kept; use [`trim`](Self::trim)
    /// to release memory.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.pool.clear();
        self.buckets.clear();
        self.recency.clear();
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
            "recency dictionary trimmed: buckets {from} -> {to}, dropped {pooled} pooled nodes"
        );
    }

    /// Unlinks `id` from its chain and the recency list, then frees it.
    fn unlink_and_release(&mut self, id: NodeId) -> (K, V) {
        self.buckets.unlink(&mut self.pool, id);
        self.recency.detach(&mut self.pool, id);
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
            "recency dictionary node moved {} -> {}",
            relocation.from.index(),
            relocation.to.index()
        );
        self.buckets.relocate(&mut self.pool, relocation);
        self.recency.relocate(&mut self.pool, relocation);
    }

    /// Doubles the bucket array.
    fn grow(&mut self) -> Result<(), DictError> {
        let from = self.buckets.len();
        let to = match sizing::grown(from) {
            Ok(to) => to,
            Err(err) => {
                warn!("recency dictionary cannot grow past {from} buckets: {err}");
                return Err(err);
            },
        };
        self.buckets.rehash(&mut self.pool, to);
        debug!("recency dictionary grew: buckets {from} -> {to}");

        #[cfg(feature = "metrics")]
        self.metrics.record_grow();

        Ok(())
    }

    /// Links a fresh entry at the chain tail and the MRU end.
    fn link_new(&mut self, probe: ChainProbe, hash: u64, key: K, value: V) {
        let id = self.pool.insert(Entry {
            key,
            value,
            hash,
            chain: ChainLinks::default(),
            links: RecencyLinks::default(),
        });
        self.buckets.append(&mut self.pool, probe.bucket, probe.tail, id);
        self.recency.push_front(&mut self.pool, id);
    }
}

impl<K, V, S> RecencyDictionary<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a dictionary with an explicit hasher.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`](sizing::MAX_CAPACITY).
    pub fn with_capacity_and_hasher(capacity: usize, mode: EvictionMode, hasher: S) -> Self {
        match Self::try_with_capacity_and_hasher(capacity, mode, hasher) {
            Ok(dict) => dict,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible [`with_capacity_and_hasher`](Self::with_capacity_and_hasher).
    pub fn try_with_capacity_and_hasher(
        capacity: usize,
        mode: EvictionMode,
        hasher: S,
    ) -> Result<Self, DictError> {
        let bucket_count = sizing::bucket_count_for(capacity)?;
        Ok(Self::from_parts(bucket_count, capacity, mode, hasher))
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
        self.buckets
            .probe(&self.pool, hash, |entry| entry.key.borrow() == key)
            .found
    }

    /// Returns the value for `key` and marks it most recently used.
    ///
    /// # Errors
    ///
    /// [`DictError::KeyNotFound`] if the key is absent.
    pub fn get<Q>(&mut self, key: &Q) -> Result<&V, DictError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.try_get(key).ok_or(DictError::KeyNotFound)
    }

    /// Mutable [`get`](Self::get).
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, DictError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.try_get_mut(key).ok_or(DictError::KeyNotFound)
    }

    /// Like [`get`](Self::get) but reports a miss as `None`.
    pub fn try_get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.touch_id(key)?;
        Some(&self.pool[id].value)
    }

    pub fn try_get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.touch_id(key)?;
        Some(&mut self.pool[id].value)
    }

    fn touch_id<Q>(&mut self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self.find(key);

        #[cfg(feature = "metrics")]
        if found.is_some() {
            self.metrics.record_get_hit();
        } else {
            self.metrics.record_get_miss();
        }

        let id = found?;
        self.recency.move_to_front(&mut self.pool, id);
        Some(id)
    }

    /// Looks up `key` without changing its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_peek_call();

        let id = self.find(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_peek_found();

        Some(&self.pool[id].value)
    }

    /// Membership test; never touches recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Linear scan for `value`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }

    /// Marks `key` as most recently used. Returns `false` if absent.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();

        let Some(id) = self.find(key) else {
            return false;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_touch_found();

        self.recency.move_to_front(&mut self.pool, id);
        true
    }

    /// Position of `key` in recency order (0 = most recent). O(n).
    pub fn recency_rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_recency_rank_call();

        let target = self.find(key)?;
        for (rank, id) in self.recency.iter_ids(&self.pool).enumerate() {
            #[cfg(feature = "metrics")]
            self.metrics.record_recency_rank_scan_step();

            if id == target {
                #[cfg(feature = "metrics")]
                self.metrics.record_recency_rank_found();

                return Some(rank);
            }
        }
        None
    }

    /// Inserts or overwrites `key`, making it most recently used.
    ///
    /// Returns the previous value when the key already existed. Never evicts.
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
    /// [`DictError::DuplicateKey`] if `key` is already present (the existing
    /// value is kept), or [`DictError::CapacityExceeded`] as for
    /// [`set`](Self::set).
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

    /// Inserts or overwrites `key`, evicting one entry first when a new key
    /// arrives while the dictionary already holds [`capacity`](Self::capacity)
    /// entries.
    ///
    /// The victim is the least recently used entry in [`EvictionMode::Lru`]
    /// and the most recently used one in [`EvictionMode::Mru`]. It is fully
    /// unlinked before the new key's bucket is walked, so a victim sharing
    /// that bucket never leaves the chain half-updated.
    pub fn set_and_maintain_count(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let hash = self.hash_of(&key);
        let probe = self.buckets.probe(&self.pool, hash, |entry| entry.key == key);
        if let Some(id) = probe.found {
            return SetOutcome::Updated(self.overwrite(id, value));
        }

        let mut evict = !self.is_empty() && self.len() >= self.capacity;
        if !evict && self.len() >= self.buckets.len() && self.grow().is_err() {
            // Only reachable at the bucket cap; make room instead of failing.
            evict = true;
        }

        if !evict {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_new();

            let probe = self.buckets.probe(&self.pool, hash, |_| false);
            self.link_new(probe, hash, key, value);
            return SetOutcome::Inserted;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();

        let victim = match self.mode {
            EvictionMode::Lru => self.recency.tail(),
            EvictionMode::Mru => self.recency.head(),
        };
        let Some(victim) = victim else {
            unreachable!("eviction from an empty recency list");
        };
        let (old_key, old_value) = self.unlink_and_release(victim);

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_evicted_entry();
            self.metrics.record_insert_new();
        }

        // The victim may have shared the bucket or been relocated; walk again.
        let probe = self.buckets.probe(&self.pool, hash, |_| false);
        self.link_new(probe, hash, key, value);
        SetOutcome::Evicted(old_key, old_value)
    }

    /// Removes `key`. Returns `false` if it was absent.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Removes `key` and returns the stored pair.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.find(key)?;
        Some(self.unlink_and_release(id))
    }

    fn overwrite(&mut self, id: NodeId, value: V) -> V {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_update();

        let old = mem::replace(&mut self.pool[id].value, value);
        self.recency.move_to_front(&mut self.pool, id);
        old
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

    /// Validates chains, the recency list and the node pool.
    ///
    /// Intended for tests and fuzzing; walks every entry.
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

        // Chains
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
                if self.buckets.index_for(entry.hash) != bucket {
                    return Err(InvariantError::new(format!(
                        "node {:?} sits in bucket {bucket}, hash maps to {}",
                        entry.key,
                        self.buckets.index_for(entry.hash)
                    )));
                }
                if self.hash_of(&entry.key) != entry.hash {
                    return Err(InvariantError::new(format!(
                        "node {:?} cached hash is stale",
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

        // Recency list
        let mut count = 0usize;
        let mut prev: Option<NodeId> = None;
        let mut current = self.recency.head();
        while let Some(id) = current {
            count += 1;
            if count > len {
                return Err(InvariantError::new(format!(
                    "recency list longer than {len} (cycle?)"
                )));
            }
            let entry = self
                .pool
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("recency: stale NodeId {id:?}")))?;
            if entry.links.prev != prev {
                return Err(InvariantError::new(format!(
                    "recency: node {:?} prev pointer inconsistent",
                    entry.key
                )));
            }
            prev = Some(id);
            current = entry.links.next;
        }
        if count != len {
            return Err(InvariantError::new(format!(
                "recency list holds {count} nodes but len = {len}"
            )));
        }
        if self.recency.tail() != prev {
            return Err(InvariantError::new("recency tail does not match last node"));
        }

        Ok(())
    }
}

#[cfg(feature = "metrics")]
impl<K, V, S> RecencyDictionary<K, V, S> {
    pub fn metrics_snapshot(&self) -> RecencyMetricsSnapshot {
        RecencyMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            grows: self.metrics.grows,
            trims: self.metrics.trims,
            clears: self.metrics.clears,
            pop_calls: self.metrics.pop_calls,
            pop_found: self.metrics.pop_found,
            touch_calls: self.metrics.touch_calls,
            touch_found: self.metrics.touch_found,
            peek_calls: self.metrics.peek_calls.get(),
            peek_found: self.metrics.peek_found.get(),
            recency_rank_calls: self.metrics.recency_rank_calls.get(),
            recency_rank_found: self.metrics.recency_rank_found.get(),
            recency_rank_scan_steps: self.metrics.recency_rank_scan_steps.get(),
            len: self.len(),
            capacity: self.capacity,
            bucket_count: self.buckets.len(),
            pooled_nodes: self.pool.pooled(),
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, S> MetricsSnapshotProvider<RecencyMetricsSnapshot> for RecencyDictionary<K, V, S> {
    fn snapshot(&self) -> RecencyMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V, S> CoreDictionary<K, V> for RecencyDictionary<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn len(&self) -> usize {
        RecencyDictionary::len(self)
    }

    fn contains_key(&self, key: &K) -> bool {
        RecencyDictionary::contains_key(self, key)
    }

    fn lookup(&mut self, key: &K) -> Option<&V> {
        self.try_get(key)
    }

    fn set(&mut self, key: K, value: V) -> Result<Option<V>, DictError> {
        RecencyDictionary::set(self, key, value)
    }

    fn add(&mut self, key: K, value: V) -> Result<(), DictError> {
        RecencyDictionary::add(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    fn clear(&mut self) {
        RecencyDictionary::clear(self);
    }

    fn trim(&mut self) {
        RecencyDictionary::trim(self);
    }

    fn bucket_count(&self) -> usize {
        RecencyDictionary::bucket_count(self)
    }
}

impl<K, V, S> EvictingDictionary<K, V> for RecencyDictionary<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn set_and_maintain_count(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        RecencyDictionary::set_and_maintain_count(self, key, value)
    }
}

impl<K, V, S> RecencyTracking<K, V> for RecencyDictionary<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn least_recent(&self) -> Result<(&K, &V), DictError> {
        RecencyDictionary::least_recent(self)
    }

    fn most_recent(&self) -> Result<(&K, &V), DictError> {
        RecencyDictionary::most_recent(self)
    }

    fn pop_least_recent(&mut self) -> Result<(K, V), DictError> {
        RecencyDictionary::pop_least_recent(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        RecencyDictionary::touch(self, key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        RecencyDictionary::recency_rank(self, key)
    }
}

impl<K, V, S: Default> Default for RecencyDictionary<K, V, S> {
    fn default() -> Self {
        Self::from_parts(sizing::MIN_BUCKETS, 0, EvictionMode::Lru, S::default())
    }
}

impl<K, V, S> fmt::Debug for RecencyDictionary<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecencyDictionary")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("mode", &self.mode)
            .field("bucket_count", &self.buckets.len())
            .field("entries", &DebugEntries(self))
            .finish()
    }
}

struct DebugEntries<'a, K, V, S>(&'a RecencyDictionary<K, V, S>);

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for DebugEntries<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for RecencyDictionary<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Calls [`set`](RecencyDictionary::set) for each pair; later pairs end
    /// up more recent.
    ///
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

impl<K, V, S> FromIterator<(K, V)> for RecencyDictionary<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::default();
        dict.extend(iter);
        dict
    }
}

impl<'a, K, V, S> IntoIterator for &'a RecencyDictionary<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for RecencyDictionary<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, S>;

    /// Consumes the dictionary, yielding entries most recent first.
    fn into_iter(self) -> Self::IntoIter {
        IntoIter { dict: self }
    }
}

/// Borrowing iterator, MRU → LRU.
pub struct Iter<'a, K, V> {
    pool: &'a NodePool<Entry<K, V>>,
    ids: RecencyIdIter<'a, Entry<K, V>>,
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

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = self.ids.next_back()?;
        self.remaining -= 1;
        let entry = &self.pool[id];
        Some((&entry.key, &entry.value))
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

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
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

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// Mutable values, MRU → LRU.
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

impl<V> DoubleEndedIterator for ValuesMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}

/// Owning iterator, MRU → LRU.
pub struct IntoIter<K, V, S> {
    dict: RecencyDictionary<K, V, S>,
}

impl<K, V, S> Iterator for IntoIter<K, V, S> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.dict.pop_most_recent().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.dict.len(), Some(self.dict.len()))
    }
}

impl<K, V, S> DoubleEndedIterator for IntoIter<K, V, S> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.dict.pop_least_recent().ok()
    }
}

impl<K, V, S> ExactSizeIterator for IntoIter<K, V, S> {}
