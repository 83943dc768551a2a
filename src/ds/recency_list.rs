//! Intrusive recency list threaded through a `NodePool`.
//!
//! The list itself only owns `head` and `tail`; the `prev`/`next` links live
//! inside the pool nodes (see [`RecencyNode`]). This lets the same node sit on
//! a bucket chain and on the recency list at the same time.
//!
//! ## Architecture
//!
//! ```text
//!   pool (NodePool<N>)
//!   ┌────────┬──────────────────────────────────────────────┐
//!   │ NodeId │ recency { prev, next }                       │
//!   ├────────┼──────────────────────────────────────────────┤
//!   │ id_1   │ { prev: None,       next: Some(id_2) }       │
//!   │ id_2   │ { prev: Some(id_1), next: Some(id_3) }       │
//!   │ id_3   │ { prev: Some(id_2), next: None }             │
//!   └────────┴──────────────────────────────────────────────┘
//!
//!   head ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail
//!           (MRU)                    (LRU)
//! ```
//!
//! ## Operations
//! - `push_front(id)`: attach at head
//! - `move_to_front(id)`: detach + attach at head
//! - `detach(id)`: unlink, node stays in the pool
//! - `relocate(r)`: re-point links after pool compaction
//!
//! All operations are O(1) except iteration.

use crate::ds::node_pool::{NodeId, NodePool, Relocation};

/// Recency links stored inside every node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecencyLinks {
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

/// A node that can be threaded onto a [`RecencyList`].
pub trait RecencyNode {
    fn recency(&self) -> &RecencyLinks;
    fn recency_mut(&mut self) -> &mut RecencyLinks;
}

#[derive(Debug, Clone, Copy, Default)]
/// Head/tail of an intrusive most-recent → least-recent list.
pub struct RecencyList {
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl RecencyList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recently used node.
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Returns the least recently used node.
    pub fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Attaches a detached node at the front (MRU).
    pub fn push_front<N: RecencyNode>(&mut self, pool: &mut NodePool<N>, id: NodeId) {
        let old_head = self.head;
        *pool[id].recency_mut() = RecencyLinks {
            prev: None,
            next: old_head,
        };
        match old_head {
            Some(old_head) => pool[old_head].recency_mut().prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    /// Unlinks a node from the list; the node stays in the pool.
    pub fn detach<N: RecencyNode>(&mut self, pool: &mut NodePool<N>, id: NodeId) {
        let RecencyLinks { prev, next } = *pool[id].recency();

        match prev {
            Some(prev) => pool[prev].recency_mut().next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => pool[next].recency_mut().prev = prev,
            None => self.tail = prev,
        }

        *pool[id].recency_mut() = RecencyLinks::default();
    }

    /// Moves an existing node to the front.
    pub fn move_to_front<N: RecencyNode>(&mut self, pool: &mut NodePool<N>, id: NodeId) {
        if self.head == Some(id) {
            return;
        }
        self.detach(pool, id);
        self.push_front(pool, id);
    }

    /// Re-points links that referenced `relocation.from`.
    pub fn relocate<N: RecencyNode>(&mut self, pool: &mut NodePool<N>, relocation: Relocation) {
        let Relocation { to, .. } = relocation;
        let RecencyLinks { prev, next } = *pool[to].recency();

        match prev {
            Some(prev) => pool[prev].recency_mut().next = Some(to),
            None => self.head = Some(to),
        }
        match next {
            Some(next) => pool[next].recency_mut().prev = Some(to),
            None => self.tail = Some(to),
        }
    }

    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }

    /// Iterates node ids from most to least recent.
    pub fn iter_ids<'a, N: RecencyNode>(&self, pool: &'a NodePool<N>) -> RecencyIdIter<'a, N> {
        RecencyIdIter {
            pool,
            front: self.head,
            back: self.tail,
        }
    }
}

/// Iterator over node ids, MRU to LRU. Double-ended.
pub struct RecencyIdIter<'a, N> {
    pool: &'a NodePool<N>,
    front: Option<NodeId>,
    back: Option<NodeId>,
}

impl<N: RecencyNode> Iterator for RecencyIdIter<'_, N> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.front?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.front = self.pool[id].recency().next;
        }
        Some(id)
    }
}

impl<N: RecencyNode> DoubleEndedIterator for RecencyIdIter<'_, N> {
    fn next_back(&mut self) -> Option<NodeId> {
        let id = self.back?;
        if self.front == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.back = self.pool[id].recency().prev;
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct TestNode {
        value: u32,
        links: RecencyLinks,
    }

    impl RecencyNode for TestNode {
        fn recency(&self) -> &RecencyLinks {
            &self.links
        }
        fn recency_mut(&mut self) -> &mut RecencyLinks {
            &mut self.links
        }
    }

    fn push(list: &mut RecencyList, pool: &mut NodePool<TestNode>, value: u32) -> NodeId {
        let id = pool.insert(TestNode {
            value,
            links: RecencyLinks::default(),
        });
        list.push_front(pool, id);
        id
    }

    fn values(list: &RecencyList, pool: &NodePool<TestNode>) -> Vec<u32> {
        list.iter_ids(pool).map(|id| pool[id].value).collect()
    }

    #[test]
    fn push_front_orders_mru_first() {
        let mut pool = NodePool::new();
        let mut list = RecencyList::new();
        let a = push(&mut list, &mut pool, 1);
        push(&mut list, &mut pool, 2);
        let c = push(&mut list, &mut pool, 3);

        assert_eq!(values(&list, &pool), vec![3, 2, 1]);
        assert_eq!(list.head(), Some(c));
        assert_eq!(list.tail(), Some(a));
    }

    #[test]
    fn move_to_front_edges() {
        let mut pool = NodePool::new();
        let mut list = RecencyList::new();
        let a = push(&mut list, &mut pool, 1);
        let b = push(&mut list, &mut pool, 2);
        let c = push(&mut list, &mut pool, 3);

        list.move_to_front(&mut pool, c);
        assert_eq!(values(&list, &pool), vec![3, 2, 1]);

        list.move_to_front(&mut pool, a);
        assert_eq!(values(&list, &pool), vec![1, 3, 2]);
        assert_eq!(list.tail(), Some(b));

        list.move_to_front(&mut pool, c);
        assert_eq!(values(&list, &pool), vec![3, 1, 2]);
    }

    #[test]
    fn detach_middle_and_ends() {
        let mut pool = NodePool::new();
        let mut list = RecencyList::new();
        let a = push(&mut list, &mut pool, 1);
        let b = push(&mut list, &mut pool, 2);
        let c = push(&mut list, &mut pool, 3);

        list.detach(&mut pool, b);
        assert_eq!(values(&list, &pool), vec![3, 1]);
        list.detach(&mut pool, c);
        assert_eq!(list.head(), Some(a));
        assert_eq!(list.tail(), Some(a));
        list.detach(&mut pool, a);
        assert!(list.is_empty());
        assert_eq!(list.tail(), None);
    }

    #[test]
    fn reverse_iteration_is_lru_first() {
        let mut pool = NodePool::new();
        let mut list = RecencyList::new();
        for v in 1..=4 {
            push(&mut list, &mut pool, v);
        }
        let back: Vec<_> = list.iter_ids(&pool).rev().map(|id| pool[id].value).collect();
        assert_eq!(back, vec![1, 2, 3, 4]);

        let mut iter = list.iter_ids(&pool);
        assert_eq!(iter.next().map(|id| pool[id].value), Some(4));
        assert_eq!(iter.next_back().map(|id| pool[id].value), Some(1));
        assert_eq!(iter.next().map(|id| pool[id].value), Some(3));
        assert_eq!(iter.next_back().map(|id| pool[id].value), Some(2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn relocate_updates_head_and_tail() {
        let mut pool = NodePool::new();
        let mut list = RecencyList::new();
        let ids: Vec<_> = (0..12).map(|v| push(&mut list, &mut pool, v)).collect();
        for &id in ids.iter().take(10) {
            list.detach(&mut pool, id);
            assert!(pool.release(id).unwrap().1.is_none());
        }
        // List is now [11, 10]; releasing 10 moves 11 into slot 10.
        list.detach(&mut pool, ids[10]);
        let (_, moved) = pool.release(ids[10]).unwrap();
        let moved = moved.expect("pool should compact");
        list.relocate(&mut pool, moved);

        assert_eq!(list.head(), Some(moved.to));
        assert_eq!(list.tail(), Some(moved.to));
        assert_eq!(values(&list, &pool), vec![11]);
    }
}
