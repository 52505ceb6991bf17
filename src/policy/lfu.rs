//! # LFU engine (bucketed)
//!
//! O(1) LFU built from frequency buckets. Each live frequency owns a doubly
//! linked list of entries; `min_freq` names the bucket the next victim comes
//! from.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────────────┐
//!   │                            LfuCache<K, V>                               │
//!   │                                                                         │
//!   │   index: FxHashMap<K, SlotId>          nodes: SlotArena<Node<K, V>>     │
//!   │   ┌────────┬────────┐                  ┌──────────────────────────────┐ │
//!   │   │ key_a  │ id_0 ──┼─────────────────►│ id_0 {a, v, freq 3, ◄ ►}     │ │
//!   │   │ key_b  │ id_1 ──┼─────────────────►│ id_1 {b, v, freq 1, ◄ ►}     │ │
//!   │   │ key_c  │ id_2 ──┼─────────────────►│ id_2 {c, v, freq 1, ◄ ►}     │ │
//!   │   └────────┴────────┘                  └──────────────────────────────┘ │
//!   │                                                                         │
//!   │   buckets: FxHashMap<u64, FreqList>                                     │
//!   │                                                                         │
//!   │   freq 1:  head ──► [id_2] ◄──► [id_1] ◄── tail   ◄── min_freq          │
//!   │   freq 3:  head ──► [id_0] ◄── tail                                     │
//!   └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - **touch**: unlink from bucket `f`; drop the bucket if it empties and, if
//!   it was `min_freq`, advance `min_freq` to `f + 1`; push to the front of
//!   bucket `f + 1`.
//! - **evict**: pop the tail of bucket `min_freq`, i.e. the entry with the
//!   lowest count that was touched longest ago among its peers.
//! - **insert**: count 1, front of bucket 1, `min_freq = 1`.
//!
//! `put` on a key that is already present overwrites the value and counts as
//! a touch.
//!
//! ## Example
//!
//! ```
//! use evictlab::policy::lfu::LfuCache;
//! use evictlab::traits::EvictionCache;
//!
//! let mut cache = LfuCache::new(2);
//! cache.put("hot", 1);
//! cache.put("cold", 2);
//! cache.get(&"hot");
//! cache.get(&"hot");
//! cache.put("new", 3);
//!
//! assert!(!cache.contains(&"cold"));
//! assert_eq!(cache.frequency(&"hot"), Some(3));
//! assert_eq!(cache.frequency(&"new"), Some(1));
//! ```

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;
use crate::metrics::{CoreMetricsRecorder, MemoryEstimate, OpCounters};
use crate::notify::EvictionNotifier;
use crate::traits::EvictionCache;

use super::check_counters;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    freq: u64,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug, Default, Clone, Copy)]
struct FreqList {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl FreqList {
    fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// O(1) LFU cache with per-frequency recency lists.
pub struct LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    index: FxHashMap<K, SlotId>,
    nodes: SlotArena<Node<K, V>>,
    buckets: FxHashMap<u64, FreqList>,
    min_freq: u64,
    capacity: usize,
    counters: OpCounters,
    notifier: EvictionNotifier<K>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        tracing::debug!(policy = "LFU", implementation = "iter", capacity, "cache created");
        LfuCache {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            nodes: SlotArena::with_capacity(capacity),
            buckets: FxHashMap::default(),
            min_freq: 0,
            capacity,
            counters: OpCounters::new(),
            notifier: EvictionNotifier::none(),
        }
    }

    pub fn with_notifier(capacity: usize, notifier: EvictionNotifier<K>) -> Self {
        let mut cache = Self::new(capacity);
        cache.notifier = notifier;
        cache
    }

    /// Access count of `key`, or `None` if it is not cached. Does not touch.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = self.index.get(key)?;
        self.nodes.get(*id).map(|node| node.freq)
    }

    /// The entry that would be evicted next, without touching it.
    pub fn peek_lfu(&self) -> Option<(&K, &V)> {
        let id = self.buckets.get(&self.min_freq)?.tail?;
        self.nodes.get(id).map(|node| (&node.key, &node.value))
    }

    fn list_push_front(nodes: &mut SlotArena<Node<K, V>>, list: &mut FreqList, id: SlotId) {
        let old_head = list.head;
        if let Some(node) = nodes.get_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => {
                if let Some(node) = nodes.get_mut(head) {
                    node.prev = Some(id);
                }
            },
            None => list.tail = Some(id),
        }
        list.head = Some(id);
        list.len += 1;
    }

    fn list_remove(nodes: &mut SlotArena<Node<K, V>>, list: &mut FreqList, id: SlotId) {
        let Some((prev, next)) = nodes.get(id).map(|node| (node.prev, node.next)) else {
            return;
        };
        match prev {
            Some(prev_id) => {
                if let Some(node) = nodes.get_mut(prev_id) {
                    node.next = next;
                }
            },
            None => list.head = next,
        }
        match next {
            Some(next_id) => {
                if let Some(node) = nodes.get_mut(next_id) {
                    node.prev = prev;
                }
            },
            None => list.tail = prev,
        }
        if let Some(node) = nodes.get_mut(id) {
            node.prev = None;
            node.next = None;
        }
        list.len = list.len.saturating_sub(1);
    }

    /// Moves `id` from its bucket to the front of the next one up.
    fn touch(&mut self, id: SlotId) {
        let Some(freq) = self.nodes.get(id).map(|node| node.freq) else {
            return;
        };

        let emptied = match self.buckets.get_mut(&freq) {
            Some(list) => {
                Self::list_remove(&mut self.nodes, list, id);
                list.is_empty()
            },
            None => false,
        };
        let next_freq = freq.saturating_add(1);
        if emptied {
            self.buckets.remove(&freq);
            if self.min_freq == freq {
                self.min_freq = next_freq;
            }
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.freq = next_freq;
        }
        let list = self.buckets.entry(next_freq).or_default();
        Self::list_push_front(&mut self.nodes, list, id);
    }

    /// Evicts the least recently touched entry of the `min_freq` bucket.
    fn evict_one(&mut self) {
        let min_freq = self.min_freq;
        let Some(list) = self.buckets.get_mut(&min_freq) else {
            return;
        };
        let Some(id) = list.tail else {
            return;
        };
        Self::list_remove(&mut self.nodes, list, id);
        if list.is_empty() {
            self.buckets.remove(&min_freq);
        }

        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        self.index.remove(&node.key);
        self.counters.record_eviction();
        tracing::trace!(
            policy = "LFU",
            implementation = "iter",
            size = self.nodes.len(),
            freq = node.freq,
            "evicted least frequently used entry"
        );
        self.notifier.notify(&node.key);
    }

    /// Verifies index/arena agreement, bucket membership and links,
    /// `min_freq` and the counters.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let len = self.nodes.len();
        if len > self.capacity {
            return Err(InvariantError::new(format!(
                "size {} exceeds capacity {}",
                len, self.capacity
            )));
        }
        if self.index.len() != len {
            return Err(InvariantError::new(format!(
                "index holds {} keys but arena holds {} nodes",
                self.index.len(),
                len
            )));
        }
        for (key, &id) in &self.index {
            match self.nodes.get(id) {
                Some(node) if node.key == *key => {},
                _ => {
                    return Err(InvariantError::new(format!(
                        "index handle {:?} does not point at its key",
                        id
                    )));
                },
            }
        }

        let mut bucketed = 0usize;
        for (&freq, list) in &self.buckets {
            if list.is_empty() {
                return Err(InvariantError::new(format!("empty bucket {} retained", freq)));
            }
            let mut prev = None;
            let mut current = list.head;
            let mut walked = 0usize;
            while let Some(id) = current {
                let node = self.nodes.get(id).ok_or_else(|| {
                    InvariantError::new(format!("bucket {} links stale handle {:?}", freq, id))
                })?;
                if node.freq != freq {
                    return Err(InvariantError::new(format!(
                        "node with count {} filed under bucket {}",
                        node.freq, freq
                    )));
                }
                if node.prev != prev {
                    return Err(InvariantError::new(format!(
                        "broken back link in bucket {}",
                        freq
                    )));
                }
                walked += 1;
                if walked > list.len {
                    return Err(InvariantError::new(format!("cycle in bucket {}", freq)));
                }
                prev = Some(id);
                current = node.next;
            }
            if walked != list.len || list.tail != prev {
                return Err(InvariantError::new(format!(
                    "bucket {} records len {} but walked {}",
                    freq, list.len, walked
                )));
            }
            bucketed += walked;
        }
        if bucketed != len {
            return Err(InvariantError::new(format!(
                "buckets hold {} nodes but arena holds {}",
                bucketed, len
            )));
        }

        if let Some(&lowest) = self.buckets.keys().min()
            && lowest != self.min_freq
        {
            return Err(InvariantError::new(format!(
                "min_freq {} but lowest bucket is {}",
                self.min_freq, lowest
            )));
        }
        check_counters(&self.counters)
    }
}

impl<K, V> EvictionCache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn put(&mut self, key: K, value: V) {
        self.counters.record_put();
        if self.capacity == 0 {
            return;
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(node) = self.nodes.get_mut(id) {
                node.value = value;
            }
            self.touch(id);
            return;
        }

        if self.nodes.len() >= self.capacity {
            self.evict_one();
        }

        let id = self.nodes.insert(Node {
            key: key.clone(),
            value,
            freq: 1,
            prev: None,
            next: None,
        });
        self.index.insert(key, id);
        let list = self.buckets.entry(1).or_default();
        Self::list_push_front(&mut self.nodes, list, id);
        self.min_freq = 1;
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        let Some(&id) = self.index.get(key) else {
            self.counters.record_get_miss();
            return None;
        };
        self.counters.record_get_hit();
        self.touch(id);
        self.nodes.get(id).map(|node| &node.value)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn size(&self) -> usize {
        self.nodes.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn counters(&self) -> &OpCounters {
        &self.counters
    }

    fn estimate_memory(&self) -> MemoryEstimate {
        let len = self.nodes.len();
        let links = 2 * std::mem::size_of::<Option<SlotId>>();
        let index = MemoryEstimate::index_slot_bytes::<K, SlotId>();
        let headers = self.buckets.len() * MemoryEstimate::index_slot_bytes::<u64, FreqList>();
        MemoryEstimate::for_nodes::<(K, V)>(self.capacity, len, len * (index + links) + headers)
    }

    fn set_notifier(&mut self, notifier: EvictionNotifier<K>) -> EvictionNotifier<K> {
        std::mem::replace(&mut self.notifier, notifier)
    }

    /// Keys in eviction order: ascending count, and within a count the
    /// least recently touched first.
    fn keys(&self) -> Vec<K> {
        let mut freqs: Vec<u64> = self.buckets.keys().copied().collect();
        freqs.sort_unstable();

        let mut keys = Vec::with_capacity(self.nodes.len());
        for freq in freqs {
            let mut current = self.buckets.get(&freq).and_then(|list| list.tail);
            while let Some(id) = current {
                let Some(node) = self.nodes.get(id) else {
                    break;
                };
                keys.push(node.key.clone());
                current = node.prev;
            }
        }
        keys
    }

    fn policy_name(&self) -> &'static str {
        "LFU"
    }

    fn impl_name(&self) -> &'static str {
        "iter"
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("len", &self.nodes.len())
            .field("capacity", &self.capacity)
            .field("min_freq", &self.min_freq)
            .field("buckets", &self.buckets.len())
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}
