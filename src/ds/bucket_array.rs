//! Power-of-two bucket array with chained collision resolution.
//!
//! Each bucket holds the head of a doubly linked chain of pool nodes whose
//! hash maps to that bucket. Chain links live inside the nodes (see
//! [`ChainNode`]) so that a node can be unlinked in O(1) given its id.
//!
//! ## Architecture
//!
//! ```text
//!   heads (len = 8, mask = 7)            NodePool
//!   ┌───┬───┬───┬───┬───┬───┬───┬───┐
//!   │ ∅ │ a │ ∅ │ ∅ │ c │ ∅ │ ∅ │ ∅ │
//!   └───┴─┬─┴───┴───┴─┬─┴───┴───┴───┘
//!         ▼           ▼
//!        [a] ◄──► [b] [c]               chain order = insertion order
//! ```
//!
//! New nodes are appended at the chain tail, so a chain is ordered from the
//! oldest to the newest entry. Rehashing preserves that relative order.

use crate::ds::node_pool::{NodeId, NodePool, Relocation};

/// Chain links stored inside every node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainLinks {
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

/// A node that can be threaded onto a bucket chain.
pub trait ChainNode {
    /// Cached hash of the node's key.
    fn hash(&self) -> u64;
    fn chain(&self) -> &ChainLinks;
    fn chain_mut(&mut self) -> &mut ChainLinks;
}

/// Result of walking one chain for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainProbe {
    pub bucket: usize,
    pub head: Option<NodeId>,
    pub tail: Option<NodeId>,
    pub found: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct BucketArray {
    heads: Vec<Option<NodeId>>,
}

impl BucketArray {
    /// Creates `len` empty buckets. `len` must be a power of two.
    pub fn with_len(len: usize) -> Self {
        debug_assert!(len.is_power_of_two());
        Self {
            heads: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    #[inline]
    pub fn mask(&self) -> usize {
        self.heads.len() - 1
    }

    #[inline]
    pub fn index_for(&self, hash: u64) -> usize {
        (hash as usize) & self.mask()
    }

    #[inline]
    pub fn head(&self, bucket: usize) -> Option<NodeId> {
        self.heads[bucket]
    }

    /// Walks the chain for `hash`, stopping at the first node `matches`
    /// accepts. Cached hashes are compared before `matches` is called.
    pub fn probe<N, F>(&self, pool: &NodePool<N>, hash: u64, mut matches: F) -> ChainProbe
    where
        N: ChainNode,
        F: FnMut(&N) -> bool,
    {
        let bucket = self.index_for(hash);
        let head = self.heads[bucket];
        let mut tail = None;
        let mut current = head;
        while let Some(id) = current {
            let node = &pool[id];
            if node.hash() == hash && matches(node) {
                return ChainProbe {
                    bucket,
                    head,
                    tail: None,
                    found: Some(id),
                };
            }
            tail = Some(id);
            current = node.chain().next;
        }
        ChainProbe {
            bucket,
            head,
            tail,
            found: None,
        }
    }

    /// Appends `id` after `tail` in `bucket` (or as the head when `tail` is
    /// `None`).
    pub fn append<N: ChainNode>(
        &mut self,
        pool: &mut NodePool<N>,
        bucket: usize,
        tail: Option<NodeId>,
        id: NodeId,
    ) {
        *pool[id].chain_mut() = ChainLinks {
            prev: tail,
            next: None,
        };
        match tail {
            Some(tail) => pool[tail].chain_mut().next = Some(id),
            None => self.heads[bucket] = Some(id),
        }
    }

    /// Unlinks `id` from its chain. The node stays in the pool.
    pub fn unlink<N: ChainNode>(&mut self, pool: &mut NodePool<N>, id: NodeId) {
        let (ChainLinks { prev, next }, hash) = {
            let node = &pool[id];
            (*node.chain(), node.hash())
        };

        match prev {
            Some(prev) => pool[prev].chain_mut().next = next,
            None => {
                let bucket = self.index_for(hash);
                self.heads[bucket] = next;
            },
        }
        if let Some(next) = next {
            pool[next].chain_mut().prev = prev;
        }

        *pool[id].chain_mut() = ChainLinks::default();
    }

    /// Re-points the chain links that referenced `relocation.from`.
    pub fn relocate<N: ChainNode>(&mut self, pool: &mut NodePool<N>, relocation: Relocation) {
        let Relocation { to, .. } = relocation;
        let (ChainLinks { prev, next }, hash) = {
            let node = &pool[to];
            (*node.chain(), node.hash())
        };

        match prev {
            Some(prev) => pool[prev].chain_mut().next = Some(to),
            None => {
                let bucket = self.index_for(hash);
                self.heads[bucket] = Some(to);
            },
        }
        if let Some(next) = next {
            pool[next].chain_mut().prev = Some(to);
        }
    }

    /// Rebuilds every chain into `new_len` buckets, keeping each chain's
    /// relative order. Only chain links are touched.
    pub fn rehash<N: ChainNode>(&mut self, pool: &mut NodePool<N>, new_len: usize) {
        debug_assert!(new_len.is_power_of_two());
        let old = std::mem::replace(&mut self.heads, vec![None; new_len]);
        let mut tails: Vec<Option<NodeId>> = vec![None; new_len];

        for head in old {
            let mut current = head;
            while let Some(id) = current {
                current = pool[id].chain().next;
                let bucket = self.index_for(pool[id].hash());
                let tail = tails[bucket];
                self.append(pool, bucket, tail, id);
                tails[bucket] = Some(id);
            }
        }
    }

    /// Returns the first occupied bucket at or after `start`, wrapping around.
    pub fn next_occupied(&self, start: usize) -> Option<usize> {
        let len = self.heads.len();
        (0..len)
            .map(|offset| (start + offset) & (len - 1))
            .find(|&bucket| self.heads[bucket].is_some())
    }

    /// Drops every chain head. Nodes must be cleared from the pool separately.
    pub fn clear(&mut self) {
        self.heads.fill(None);
    }

    /// Iterates over node ids in one bucket's chain, head to tail.
    pub fn chain<'a, N: ChainNode>(
        &self,
        pool: &'a NodePool<N>,
        bucket: usize,
    ) -> ChainIter<'a, N> {
        ChainIter {
            pool,
            current: self.heads[bucket],
        }
    }

    /// Iterates over every node id, bucket by bucket.
    pub fn iter_ids<'a, N: ChainNode>(&'a self, pool: &'a NodePool<N>) -> BucketIdIter<'a, N> {
        BucketIdIter {
            heads: &self.heads,
            pool,
            bucket: 0,
            current: None,
        }
    }
}

/// Iterator over one chain.
pub struct ChainIter<'a, N> {
    pool: &'a NodePool<N>,
    current: Option<NodeId>,
}

impl<N: ChainNode> Iterator for ChainIter<'_, N> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.pool[id].chain().next;
        Some(id)
    }
}

/// Iterator over all chains in bucket order.
pub struct BucketIdIter<'a, N> {
    heads: &'a [Option<NodeId>],
    pool: &'a NodePool<N>,
    bucket: usize,
    current: Option<NodeId>,
}

impl<N: ChainNode> Iterator for BucketIdIter<'_, N> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            if let Some(id) = self.current {
                self.current = self.pool[id].chain().next;
                return Some(id);
            }
            let head = self.heads.get(self.bucket)?;
            self.bucket += 1;
            self.current = *head;
        }
    }
}
