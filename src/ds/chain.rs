//! Singly linked chain backed by `SlotArena`.
//!
//! The chained engines walk this structure linearly on purpose: it is the
//! pointer-chasing counterpart of the indexed engines. Links are
//! `Option<SlotId>` instead of owning pointers, so a node has exactly one
//! owner (the arena), unlinking cannot leave a dangling reference, and a
//! node can be released at most once.
//!
//! ```text
//!   head
//!    │
//!    ▼
//!   [id_4] ──► [id_1] ──► [id_7] ──► [id_2] ──► None
//!                                      ▲
//!                                   tail: found by walking until next == None
//! ```
//!
//! Every traversal is a loop, so neither lookups nor teardown grow the call
//! stack with the chain length.

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;
use crate::metrics::AllocationTracker;

#[derive(Debug)]
struct ChainNode<T> {
    value: T,
    next: Option<SlotId>,
}

/// Position of a node together with its predecessor (`None` for the head).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    pub prev: Option<SlotId>,
    pub id: SlotId,
}

#[derive(Debug)]
pub struct Chain<T> {
    arena: SlotArena<ChainNode<T>>,
    head: Option<SlotId>,
    tracker: AllocationTracker,
}

impl<T> Chain<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tracker: AllocationTracker::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn tracker(&self) -> &AllocationTracker {
        &self.tracker
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Allocates a node in front of the current head.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(ChainNode {
            value,
            next: self.head,
        });
        self.tracker.record_allocation();
        self.head = Some(id);
        id
    }

    /// First node (from the head) whose value satisfies `pred`.
    pub fn position<F>(&self, mut pred: F) -> Option<ChainLink>
    where
        F: FnMut(&T) -> bool,
    {
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self.arena.get(id)?;
            if pred(&node.value) {
                return Some(ChainLink { prev, id });
            }
            prev = Some(id);
            current = node.next;
        }
        None
    }

    /// The last node, i.e. the one whose `next` is `None`.
    pub fn tail(&self) -> Option<ChainLink> {
        let mut prev = None;
        let mut current = self.head?;
        loop {
            let node = self.arena.get(current)?;
            match node.next {
                Some(next) => {
                    prev = Some(current);
                    current = next;
                },
                None => return Some(ChainLink { prev, id: current }),
            }
        }
    }

    /// Node with the smallest `key(value)`; on ties the one nearest the head wins.
    pub fn min_by_key<F, O>(&self, mut key: F) -> Option<ChainLink>
    where
        F: FnMut(&T) -> O,
        O: Ord,
    {
        let mut best: Option<(ChainLink, O)> = None;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self.arena.get(id)?;
            let candidate = key(&node.value);
            let better = match &best {
                Some((_, best_key)) => candidate < *best_key,
                None => true,
            };
            if better {
                best = Some((ChainLink { prev, id }, candidate));
            }
            prev = Some(id);
            current = node.next;
        }
        best.map(|(link, _)| link)
    }

    /// Splices the node at `link` out and reattaches it as the new head.
    pub fn move_to_front(&mut self, link: ChainLink) -> bool {
        let Some(prev) = link.prev else {
            return self.head == Some(link.id);
        };
        let Some(next) = self.arena.get(link.id).map(|node| node.next) else {
            return false;
        };
        if let Some(prev_node) = self.arena.get_mut(prev) {
            prev_node.next = next;
        }
        let old_head = self.head;
        if let Some(node) = self.arena.get_mut(link.id) {
            node.next = old_head;
        }
        self.head = Some(link.id);
        true
    }

    /// Unlinks the node at `link` and releases it, returning its value.
    pub fn remove(&mut self, link: ChainLink) -> Option<T> {
        let next = self.arena.get(link.id)?.next;
        match link.prev {
            Some(prev) => {
                let prev_node = self.arena.get_mut(prev)?;
                if prev_node.next != Some(link.id) {
                    return None;
                }
                prev_node.next = next;
            },
            None => {
                if self.head != Some(link.id) {
                    return None;
                }
                self.head = next;
            },
        }
        let node = self.arena.remove(link.id)?;
        self.tracker.record_release();
        Some(node.value)
    }

    pub fn iter(&self) -> ChainIter<'_, T> {
        ChainIter {
            chain: self,
            current: self.head,
        }
    }

    /// Verifies the chain is acyclic, covers every arena node and that the
    /// allocation tallies balance against the live node count.
    pub fn check_links(&self) -> Result<(), InvariantError> {
        let mut count = 0usize;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("stale chain link {:?}", id)))?;
            count += 1;
            if count > self.len() {
                return Err(InvariantError::new("cycle detected in chain"));
            }
            current = node.next;
        }
        if count != self.len() {
            return Err(InvariantError::new(format!(
                "walked {} chain nodes but arena holds {}",
                count,
                self.len()
            )));
        }
        if self.tracker.live() != self.len() as u64 {
            return Err(InvariantError::new(format!(
                "{} allocations - {} releases != {} live nodes",
                self.tracker.allocations(),
                self.tracker.deallocations(),
                self.len()
            )));
        }
        Ok(())
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Chain<T> {
    fn drop(&mut self) {
        let mut current = self.head.take();
        while let Some(id) = current {
            current = match self.arena.remove(id) {
                Some(node) => {
                    self.tracker.record_release();
                    node.next
                },
                None => None,
            };
        }
    }
}

pub struct ChainIter<'a, T> {
    chain: &'a Chain<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for ChainIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.chain.arena.get(id)?;
        self.current = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Copy>(chain: &Chain<T>) -> Vec<T> {
        chain.iter().copied().collect()
    }

    #[test]
    fn push_front_builds_head_first_order() {
        let mut chain = Chain::new();
        chain.push_front(1);
        chain.push_front(2);
        chain.push_front(3);
        assert_eq!(values(&chain), vec![3, 2, 1]);
        assert_eq!(chain.len(), 3);
        chain.check_links().unwrap();
    }

    #[test]
    fn position_reports_predecessor() {
        let mut chain = Chain::new();
        let a = chain.push_front('a');
        let b = chain.push_front('b');
        chain.push_front('c');

        let link = chain.position(|v| *v == 'a').unwrap();
        assert_eq!(link, ChainLink { prev: Some(b), id: a });
        assert!(chain.position(|v| *v == 'z').is_none());
    }

    #[test]
    fn tail_of_single_and_empty_chain() {
        let mut chain: Chain<u8> = Chain::new();
        assert!(chain.tail().is_none());
        let only = chain.push_front(9);
        assert_eq!(chain.tail(), Some(ChainLink { prev: None, id: only }));
    }

    #[test]
    fn move_to_front_relinks_middle_and_tail() {
        let mut chain = Chain::new();
        for v in [1, 2, 3, 4] {
            chain.push_front(v);
        }
        // 4 3 2 1
        let link = chain.position(|v| *v == 2).unwrap();
        assert!(chain.move_to_front(link));
        assert_eq!(values(&chain), vec![2, 4, 3, 1]);

        let tail = chain.tail().unwrap();
        assert!(chain.move_to_front(tail));
        assert_eq!(values(&chain), vec![1, 2, 4, 3]);

        let head = chain.position(|v| *v == 1).unwrap();
        assert!(chain.move_to_front(head));
        assert_eq!(values(&chain), vec![1, 2, 4, 3]);
        chain.check_links().unwrap();
    }

    #[test]
    fn remove_releases_exactly_once() {
        let mut chain = Chain::new();
        for v in [1, 2, 3] {
            chain.push_front(v);
        }
        let link = chain.position(|v| *v == 2).unwrap();
        assert_eq!(chain.remove(link), Some(2));
        assert_eq!(chain.remove(link), None);
        assert_eq!(values(&chain), vec![3, 1]);
        assert_eq!(chain.tracker().allocations(), 3);
        assert_eq!(chain.tracker().deallocations(), 1);
        chain.check_links().unwrap();
    }

    #[test]
    fn min_by_key_prefers_head_on_ties() {
        let mut chain = Chain::new();
        chain.push_front(("old", 1));
        chain.push_front(("mid", 3));
        chain.push_front(("new", 1));

        let link = chain.min_by_key(|(_, f)| *f).unwrap();
        assert_eq!(chain.get(link.id), Some(&("new", 1)));
        assert_eq!(link.prev, None);
    }

    #[test]
    fn drop_releases_every_node() {
        let tracker = {
            let mut chain = Chain::new();
            for v in 0..100 {
                chain.push_front(v);
            }
            chain.tracker().clone()
        };
        assert_eq!(tracker.allocations(), 100);
        assert_eq!(tracker.deallocations(), 100);
    }

    #[test]
    fn drop_of_long_chain_does_not_recurse() {
        let mut chain = Chain::with_capacity(200_000);
        for v in 0..200_000u32 {
            chain.push_front(v);
        }
        let tracker = chain.tracker().clone();
        drop(chain);
        assert_eq!(tracker.live(), 0);
    }
}
