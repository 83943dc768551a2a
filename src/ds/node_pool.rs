//! Node arena with a bounded free-list.
//!
//! Dictionary entries live in a `NodePool` and refer to each other by
//! [`NodeId`]. Released slots are kept on a free-list so that the common cache
//! pattern (remove one, add one) reuses storage instead of growing the arena.
//!
//! ## Architecture
//!
//! ```text
//!   slots: Vec<Option<T>>                 free: Vec<usize>  (≤ MAX_POOLED_NODES)
//!   ┌─────┬─────┬─────┬─────┬─────┐       ┌─────┬─────┐
//!   │ n0  │ --- │ n2  │ n3  │ --- │       │  1  │  4  │
//!   └─────┴─────┴─────┴─────┴─────┘       └─────┴─────┘
//!
//!   release(n2) with a full free-list:
//!     1. take n2 out of slot 2
//!     2. move the last live node (n3) into slot 2, shrink the arena
//!     3. report Relocation { from: 3, to: 2 } so the owner re-points links
//! ```
//!
//! The free-list never exceeds [`MAX_POOLED_NODES`], which keeps
//! `slots.len() == len() + pooled()` and bounds dead storage.

use std::ops::{Index, IndexMut};

/// Upper bound on vacant slots kept for reuse.
pub const MAX_POOLED_NODES: usize = 10;

/// Owning iterator returned by [`NodePool::into_values`].
pub type IntoValues<T> = std::iter::Flatten<std::vec::IntoIter<Option<T>>>;

/// Stable handle to a node stored in a [`NodePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A live node moved to a new slot while the pool compacted itself.
///
/// Every link that pointed at `from` must be re-pointed at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug)]
pub struct NodePool<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> NodePool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::with_capacity(MAX_POOLED_NODES),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(MAX_POOLED_NODES),
            len: 0,
        }
    }

    /// Stores `value`, reusing a pooled slot when one is available.
    pub fn insert(&mut self, value: T) -> NodeId {
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(value);
            idx
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        };
        self.len += 1;
        NodeId(idx)
    }

    /// Removes the node at `id` and returns it.
    ///
    /// The vacated slot goes onto the free-list while there is room. Once the
    /// free-list is full the arena compacts instead, which may move another
    /// live node; that move is reported as a [`Relocation`].
    ///
    /// The caller must have unlinked `id` from every structure beforehand.
    pub fn release(&mut self, id: NodeId) -> Option<(T, Option<Relocation>)> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.len -= 1;

        if self.free.len() < MAX_POOLED_NODES {
            self.free.push(id.0);
            return Some((value, None));
        }

        Some((value, self.fill_hole(id.0)))
    }

    /// Closes the hole at `hole` by shrinking the arena.
    fn fill_hole(&mut self, hole: usize) -> Option<Relocation> {
        let last = self.slots.len() - 1;
        if hole == last {
            self.slots.pop();
            return None;
        }
        if self.slots[last].is_none() {
            // The tail slot is itself pooled: drop it and pool the new hole.
            if let Some(pos) = self.free.iter().position(|&idx| idx == last) {
                self.free.swap_remove(pos);
            }
            self.slots.pop();
            self.free.push(hole);
            return None;
        }
        self.slots.swap(hole, last);
        self.slots.pop();
        Some(Relocation {
            from: NodeId(last),
            to: NodeId(hole),
        })
    }

    /// Performs one step of full compaction, dropping one pooled slot.
    ///
    /// Returns `None` once the free-list is empty. Each step that has to move
    /// a live node reports the move; the owner must apply it before the next
    /// step.
    pub fn compact_step(&mut self) -> Option<Option<Relocation>> {
        if matches!(self.slots.last(), Some(None)) {
            let last = self.slots.len() - 1;
            if let Some(pos) = self.free.iter().position(|&idx| idx == last) {
                self.free.swap_remove(pos);
            }
            self.slots.pop();
            return Some(None);
        }
        let hole = self.free.pop()?;
        let last = self.slots.len() - 1;
        self.slots.swap(hole, last);
        self.slots.pop();
        Some(Some(Relocation {
            from: NodeId(last),
            to: NodeId(hole),
        }))
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of vacant slots waiting for reuse.
    pub fn pooled(&self) -> usize {
        self.free.len()
    }

    /// Number of slots, live or pooled.
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }

    pub fn shrink_to_fit(&mut self) {
        self.slots.shrink_to_fit();
    }

    /// Iterates over live node ids in slot order.
    pub fn iter_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|_| NodeId(idx)))
    }

    /// Mutable access to every slot, indexed by `NodeId::index`.
    pub fn slots_mut(&mut self) -> impl Iterator<Item = Option<&mut T>> + '_ {
        self.slots.iter_mut().map(Option::as_mut)
    }

    /// Consumes the pool, yielding live nodes in slot order.
    pub fn into_values(self) -> IntoValues<T> {
        self.slots.into_iter().flatten()
    }
}

impl<T> Default for NodePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<NodeId> for NodePool<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match self.slots.get(id.0) {
            Some(Some(value)) => value,
            _ => panic!("stale NodeId {}", id.0),
        }
    }
}

impl<T> IndexMut<NodeId> for NodePool<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.slots.get_mut(id.0) {
            Some(Some(value)) => value,
            _ => panic!("stale NodeId {}", id.0),
        }
    }
}
