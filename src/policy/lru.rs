//! # LRU engine (indexed)
//!
//! Classic O(1) LRU: a hash index from key to `SlotId` plus a doubly linked
//! recency list whose nodes live in a slot arena.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                           LruCache<K, V>                             │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, SlotId> (index into the list arena)            │   │
//!   │   │                                                              │   │
//!   │   │  ┌─────────┬────────────────────────────────────────────┐    │   │
//!   │   │  │   Key   │  SlotId                                    │    │   │
//!   │   │  ├─────────┼────────────────────────────────────────────┤    │   │
//!   │   │  │  key_1  │  ────────────────────────────────────────┐ │    │   │
//!   │   │  │  key_2  │  ──────────────────────────────────┐     │ │    │   │
//!   │   │  │  key_3  │  ────────────────────────────┐     │     │ │    │   │
//!   │   │  └─────────┴──────────────────────────────┼─────┼─────┼─┘    │   │
//!   │   └───────────────────────────────────────────┼─────┼─────┼──────┘   │
//!   │                                               │     │     │          │
//!   │   ┌───────────────────────────────────────────┼─────┼─────┼──────┐   │
//!   │   │  IntrusiveList<(K, V)> (recency order)    ▼     ▼     ▼      │   │
//!   │   │  head ──► ┌──────┐ ◄──► ┌──────┐ ◄──► ┌──────┐ ◄── tail      │   │
//!   │   │    (MRU)  │ id_3 │      │ id_2 │      │ id_1 │   (LRU)       │   │
//!   │   │           └──────┘      └──────┘      └──────┘               │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The list arena owns every `(key, value)` pair; the index only holds
//! handles. Relocating an entry to the head is a relink of `SlotId`s, so the
//! payload is never copied and no handle is invalidated by a move.
//!
//! ## Operations
//!
//! | Method            | Complexity | Notes                                   |
//! |-------------------|------------|-----------------------------------------|
//! | `get`             | O(1)       | Hit moves the entry to the head         |
//! | `put` (update)    | O(1)       | Overwrite in place, move to head        |
//! | `put` (new, full) | O(1)       | Pop tail, unindex, notify, push head    |
//! | `peek_lru`        | O(1)       | Tail without touching                   |
//!
//! ## Example
//!
//! ```
//! use evictlab::policy::lru::LruCache;
//! use evictlab::traits::EvictionCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.put(1, 10);
//! cache.put(2, 20);
//! cache.get(&1);
//! cache.put(3, 30);
//!
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.get(&1), Some(&10));
//! assert_eq!(cache.get(&3), Some(&30));
//! assert_eq!(cache.counters().evictions, 1);
//! ```

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;
use crate::metrics::{CoreMetricsRecorder, MemoryEstimate, OpCounters};
use crate::notify::EvictionNotifier;
use crate::traits::EvictionCache;

use super::check_counters;

type Entry<K, V> = (K, V);

/// O(1) LRU cache over a hash index and an arena-backed recency list.
pub struct LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    index: FxHashMap<K, SlotId>,
    order: IntrusiveList<Entry<K, V>>,
    capacity: usize,
    counters: OpCounters,
    notifier: EvictionNotifier<K>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache. A capacity of 0 yields a cache that never
    /// holds anything.
    pub fn new(capacity: usize) -> Self {
        tracing::debug!(policy = "LRU", implementation = "iter", capacity, "cache created");
        LruCache {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            order: IntrusiveList::with_capacity(capacity),
            capacity,
            counters: OpCounters::new(),
            notifier: EvictionNotifier::none(),
        }
    }

    /// Creates an empty cache with `notifier` already installed.
    pub fn with_notifier(capacity: usize, notifier: EvictionNotifier<K>) -> Self {
        let mut cache = Self::new(capacity);
        cache.notifier = notifier;
        cache
    }

    /// The entry that would be evicted next, without touching it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.order.back().map(|(k, v)| (k, v))
    }

    /// Removes the tail entry as a capacity eviction.
    fn evict_lru(&mut self) {
        let Some((key, _value)) = self.order.pop_back() else {
            return;
        };
        self.index.remove(&key);
        self.counters.record_eviction();
        tracing::trace!(
            policy = "LRU",
            implementation = "iter",
            size = self.order.len(),
            "evicted least recently used entry"
        );
        self.notifier.notify(&key);
    }

    /// Verifies capacity, index/list agreement, list links and counters.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.order.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "size {} exceeds capacity {}",
                self.order.len(),
                self.capacity
            )));
        }
        if self.index.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but list holds {} entries",
                self.index.len(),
                self.order.len()
            )));
        }
        self.order.check_links()?;
        for (key, &id) in &self.index {
            match self.order.get(id) {
                Some((stored, _)) if stored == key => {},
                Some(_) => {
                    return Err(InvariantError::new(format!(
                        "index handle {:?} points at a different key",
                        id
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!("index handle {:?} is stale", id)));
                },
            }
        }
        check_counters(&self.counters)
    }
}

impl<K, V> EvictionCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn put(&mut self, key: K, value: V) {
        self.counters.record_put();
        if self.capacity == 0 {
            return;
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(id) {
                entry.1 = value;
            }
            self.order.move_to_front(id);
            return;
        }

        if self.order.len() >= self.capacity {
            self.evict_lru();
        }

        let id = self.order.push_front((key.clone(), value));
        self.index.insert(key, id);
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        let Some(&id) = self.index.get(key) else {
            self.counters.record_get_miss();
            return None;
        };
        self.counters.record_get_hit();
        self.order.move_to_front(id);
        self.order.get(id).map(|(_, value)| value)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn size(&self) -> usize {
        self.order.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn counters(&self) -> &OpCounters {
        &self.counters
    }

    /// Overhead: two list links per node plus one index slot per entry.
    fn estimate_memory(&self) -> MemoryEstimate {
        let len = self.order.len();
        let links = 2 * std::mem::size_of::<Option<SlotId>>();
        let index = MemoryEstimate::index_slot_bytes::<K, SlotId>();
        MemoryEstimate::for_nodes::<Entry<K, V>>(self.capacity, len, len * (links + index))
    }

    fn set_notifier(&mut self, notifier: EvictionNotifier<K>) -> EvictionNotifier<K> {
        std::mem::replace(&mut self.notifier, notifier)
    }

    fn keys(&self) -> Vec<K> {
        self.order.iter().map(|(k, _)| k.clone()).collect()
    }

    fn policy_name(&self) -> &'static str {
        "LRU"
    }

    fn impl_name(&self) -> &'static str {
        "iter"
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.order.len())
            .field("capacity", &self.capacity)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_notifier() -> (EvictionNotifier<u32>, Rc<RefCell<Vec<u32>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (
            EvictionNotifier::new(move |k: &u32| sink.borrow_mut().push(*k)),
            seen,
        )
    }

    mod basic_behavior {
        use super::*;

        #[test]
        fn new_cache_is_empty() {
            let cache: LruCache<u32, u32> = LruCache::new(10);
            assert_eq!(cache.size(), 0);
            assert_eq!(cache.capacity(), 10);
            assert!(cache.is_empty());
            assert_eq!(*cache.counters(), OpCounters::default());
        }

        #[test]
        fn get_returns_inserted_value() {
            let mut cache = LruCache::new(3);
            cache.put(1, 100);
            assert_eq!(cache.get(&1), Some(&100));
            assert_eq!(cache.get(&2), None);
            assert!(cache.contains(&1));
        }

        #[test]
        fn put_overwrites_existing_key() {
            let mut cache = LruCache::new(3);
            cache.put(1, 100);
            cache.put(1, 200);
            assert_eq!(cache.size(), 1);
            assert_eq!(cache.get(&1), Some(&200));
            assert_eq!(cache.counters().puts, 2);
            assert_eq!(cache.counters().evictions, 0);
        }

        #[test]
        fn zero_capacity_counts_but_stores_nothing() {
            let mut cache = LruCache::new(0);
            cache.put(1, 1);
            cache.put(2, 2);
            assert_eq!(cache.size(), 0);
            assert_eq!(cache.get(&1), None);
            assert_eq!(cache.counters().puts, 2);
            assert_eq!(cache.counters().misses, 1);
            assert_eq!(cache.counters().evictions, 0);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn labels() {
            let cache: LruCache<u8, u8> = LruCache::new(1);
            assert_eq!(cache.policy_name(), "LRU");
            assert_eq!(cache.impl_name(), "iter");
        }
    }

    mod recency_order {
        use super::*;

        #[test]
        fn touched_key_survives_eviction() {
            let mut cache = LruCache::new(2);
            cache.put(1, 10);
            cache.put(2, 20);
            assert_eq!(cache.get(&1), Some(&10));
            cache.put(3, 30);

            assert_eq!(cache.get(&2), None);
            assert_eq!(cache.get(&1), Some(&10));
            assert_eq!(cache.get(&3), Some(&30));
        }

        #[test]
        fn keys_are_most_recent_first() {
            let mut cache = LruCache::new(4);
            for k in 1..=4 {
                cache.put(k, k);
            }
            cache.get(&2);
            cache.put(3, 33);
            assert_eq!(cache.keys(), vec![3, 2, 4, 1]);
            assert_eq!(cache.peek_lru(), Some((&1, &1)));
        }

        #[test]
        fn contains_does_not_touch() {
            let mut cache = LruCache::new(2);
            cache.put(1, 1);
            cache.put(2, 2);
            assert!(cache.contains(&1));
            cache.put(3, 3);
            assert!(!cache.contains(&1));
        }

        #[test]
        fn single_slot_cache_always_holds_latest() {
            let mut cache = LruCache::new(1);
            for k in 0..10 {
                cache.put(k, k);
                assert_eq!(cache.keys(), vec![k]);
            }
            assert_eq!(cache.counters().evictions, 9);
        }
    }

    mod notifier {
        use super::*;

        #[test]
        fn notifier_receives_evicted_keys_in_order() {
            let (notifier, seen) = recording_notifier();
            let mut cache = LruCache::with_notifier(2, notifier);
            for k in 1..=5 {
                cache.put(k, k);
            }
            assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        }

        #[test]
        fn overwrite_never_notifies() {
            let (notifier, seen) = recording_notifier();
            let mut cache = LruCache::with_notifier(1, notifier);
            cache.put(1, 1);
            cache.put(1, 2);
            assert!(seen.borrow().is_empty());
        }

        #[test]
        fn set_notifier_returns_previous_and_replaces() {
            let (first, first_seen) = recording_notifier();
            let (second, second_seen) = recording_notifier();
            let mut cache = LruCache::new(1);

            assert!(!cache.set_notifier(first).is_installed());
            cache.put(1, 1);
            cache.put(2, 2);

            let previous = cache.set_notifier(second);
            assert!(previous.is_installed());
            cache.put(3, 3);

            assert!(cache.clear_notifier().is_installed());
            cache.put(4, 4);

            assert_eq!(*first_seen.borrow(), vec![1]);
            assert_eq!(*second_seen.borrow(), vec![2]);
            assert_eq!(cache.counters().evictions, 3);
        }
    }

    mod diagnostics {
        use super::*;

        #[test]
        fn memory_estimate_tracks_size_and_capacity() {
            let mut cache: LruCache<u64, u64> = LruCache::new(8);
            let empty = cache.estimate_memory();
            assert_eq!(empty.actual, 0);
            assert_eq!(empty.overhead, 0);
            assert_eq!(empty.theoretical, 8 * std::mem::size_of::<(u64, u64)>());

            for k in 0..4 {
                cache.put(k, k);
            }
            let half = cache.estimate_memory();
            assert_eq!(half.actual, 4 * std::mem::size_of::<(u64, u64)>());
            assert!(half.overhead > 0);
            assert!((half.efficiency_pct() - 50.0).abs() < f64::EPSILON);
        }

        #[test]
        fn invariants_hold_through_churn() {
            let mut cache = LruCache::new(5);
            for i in 0..200u32 {
                let k = (i * 7) % 13;
                if i % 3 == 0 {
                    cache.get(&k);
                } else {
                    cache.put(k, i);
                }
                cache.check_invariants().unwrap();
            }
        }

        #[test]
        fn debug_shows_len_and_capacity() {
            let mut cache = LruCache::new(4);
            cache.put(1, 1);
            let dbg = format!("{:?}", cache);
            assert!(dbg.contains("len: 1"));
            assert!(dbg.contains("capacity: 4"));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::VecDeque;

        #[derive(Debug, Clone)]
        enum Op {
            Put(u8, u16),
            Get(u8),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..24, any::<u16>()).prop_map(|(k, v)| Op::Put(k, v)),
                (0u8..24).prop_map(Op::Get),
            ]
        }

        proptest! {
            #[test]
            fn prop_matches_reference_model(
                capacity in 0usize..10,
                ops in prop::collection::vec(op_strategy(), 0..200)
            ) {
                let mut cache = LruCache::new(capacity);
                // front = most recent
                let mut model: VecDeque<(u8, u16)> = VecDeque::new();
                for op in ops {
                    match op {
                        Op::Put(k, v) => {
                            cache.put(k, v);
                            if capacity == 0 {
                                continue;
                            }
                            if let Some(pos) = model.iter().position(|(mk, _)| *mk == k) {
                                model.remove(pos);
                            } else if model.len() == capacity {
                                model.pop_back();
                            }
                            model.push_front((k, v));
                        },
                        Op::Get(k) => {
                            let expected = model.iter().position(|(mk, _)| *mk == k).map(|pos| {
                                let entry = model.remove(pos).unwrap();
                                model.push_front(entry);
                                entry.1
                            });
                            prop_assert_eq!(cache.get(&k).copied(), expected);
                        },
                    }
                    prop_assert!(cache.size() <= capacity);
                    prop_assert!(cache.check_invariants().is_ok());
                }
                let model_keys: Vec<u8> = model.iter().map(|(k, _)| *k).collect();
                prop_assert_eq!(cache.keys(), model_keys);
            }
        }
    }
}
