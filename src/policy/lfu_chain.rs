//! # LFU engine (chained)
//!
//! Index-free LFU over a singly linked [`Chain`]. Each node carries its own
//! access count; the chain order never changes after insertion, and the
//! victim is found with a full walk.
//!
//! ```text
//!   head (newest insert)                           tail (oldest insert)
//!    │
//!    ▼
//!   [k5 f1] ──► [k2 f4] ──► [k9 f1] ──► [k3 f2] ──► None
//!      ▲
//!      └── victim: first minimum met walking from the head
//! ```
//!
//! ## Tie-break
//!
//! The minimum search keeps the first node with the lowest count. New nodes
//! enter at the head, so among entries sharing the lowest count the most
//! recently *inserted* one is evicted. [`LfuCache`](super::lfu::LfuCache)
//! instead evicts the least recently *touched* one, so the two engines agree
//! only while evictions never face a tie.
//!
//! ```
//! use evictlab::policy::lfu_chain::LfuChainCache;
//! use evictlab::traits::EvictionCache;
//!
//! let mut cache = LfuChainCache::new(2);
//! cache.put(1, "a");
//! cache.put(2, "b");
//! cache.put(3, "c");
//!
//! // 1 and 2 tie at count 1; 2 sits nearer the head.
//! assert!(cache.contains(&1));
//! assert!(!cache.contains(&2));
//! ```

use std::fmt;

use crate::ds::chain::Chain;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;
use crate::metrics::{AllocationTracker, CoreMetricsRecorder, MemoryEstimate, OpCounters};
use crate::notify::EvictionNotifier;
use crate::traits::{AllocationTracking, EvictionCache};

use super::{check_counters, check_unique_keys};

#[derive(Debug)]
struct ChainEntry<K, V> {
    key: K,
    value: V,
    freq: u64,
}

/// O(n) LFU cache over an arena-backed singly linked chain.
pub struct LfuChainCache<K, V> {
    chain: Chain<ChainEntry<K, V>>,
    capacity: usize,
    counters: OpCounters,
    notifier: EvictionNotifier<K>,
}

impl<K, V> LfuChainCache<K, V>
where
    K: Eq + Clone,
{
    pub fn new(capacity: usize) -> Self {
        tracing::debug!(policy = "LFU", implementation = "rec", capacity, "cache created");
        LfuChainCache {
            chain: Chain::with_capacity(capacity),
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
        self.chain
            .iter()
            .find(|entry| entry.key == *key)
            .map(|entry| entry.freq)
    }

    fn evict_min(&mut self) {
        let Some(victim) = self.chain.min_by_key(|entry| entry.freq) else {
            return;
        };
        let Some(entry) = self.chain.remove(victim) else {
            return;
        };
        self.counters.record_eviction();
        tracing::trace!(
            policy = "LFU",
            implementation = "rec",
            size = self.chain.len(),
            freq = entry.freq,
            "evicted least frequently used entry"
        );
        self.notifier.notify(&entry.key);
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.chain.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "size {} exceeds capacity {}",
                self.chain.len(),
                self.capacity
            )));
        }
        self.chain.check_links()?;
        if self.chain.iter().any(|entry| entry.freq == 0) {
            return Err(InvariantError::new("cached entry with a zero access count"));
        }
        check_unique_keys(self.chain.iter().map(|entry| &entry.key))?;
        check_counters(&self.counters)
    }
}

impl<K, V> EvictionCache<K, V> for LfuChainCache<K, V>
where
    K: Eq + Clone,
{
    fn put(&mut self, key: K, value: V) {
        self.counters.record_put();

        if let Some(link) = self.chain.position(|entry| entry.key == key) {
            if let Some(entry) = self.chain.get_mut(link.id) {
                entry.value = value;
                entry.freq = entry.freq.saturating_add(1);
            }
            return;
        }

        if self.capacity == 0 {
            return;
        }
        if self.chain.len() >= self.capacity {
            self.evict_min();
        }
        self.chain.push_front(ChainEntry {
            key,
            value,
            freq: 1,
        });
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        let Some(link) = self.chain.position(|entry| entry.key == *key) else {
            self.counters.record_get_miss();
            return None;
        };
        self.counters.record_get_hit();
        let entry = self.chain.get_mut(link.id)?;
        entry.freq = entry.freq.saturating_add(1);
        Some(&entry.value)
    }

    fn contains(&self, key: &K) -> bool {
        self.chain.iter().any(|entry| entry.key == *key)
    }

    fn size(&self) -> usize {
        self.chain.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn counters(&self) -> &OpCounters {
        &self.counters
    }

    fn estimate_memory(&self) -> MemoryEstimate {
        let len = self.chain.len();
        let link = std::mem::size_of::<Option<SlotId>>();
        MemoryEstimate::for_nodes::<ChainEntry<K, V>>(self.capacity, len, len * link)
    }

    fn set_notifier(&mut self, notifier: EvictionNotifier<K>) -> EvictionNotifier<K> {
        std::mem::replace(&mut self.notifier, notifier)
    }

    /// Keys from newest to oldest insertion.
    fn keys(&self) -> Vec<K> {
        self.chain.iter().map(|entry| entry.key.clone()).collect()
    }

    fn policy_name(&self) -> &'static str {
        "LFU"
    }

    fn impl_name(&self) -> &'static str {
        "rec"
    }
}

impl<K, V> AllocationTracking for LfuChainCache<K, V> {
    fn allocation_tracker(&self) -> AllocationTracker {
        self.chain.tracker().clone()
    }
}

impl<K, V> fmt::Debug for LfuChainCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuChainCache")
            .field("len", &self.chain.len())
            .field("capacity", &self.capacity)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod basic_behavior {
        use super::*;

        #[test]
        fn counts_follow_gets_and_overwrites() {
            let mut cache = LfuChainCache::new(3);
            cache.put(1, 'a');
            cache.get(&1);
            cache.put(1, 'b');
            assert_eq!(cache.frequency(&1), Some(3));
            assert_eq!(cache.get(&1), Some(&'b'));
            assert_eq!(cache.frequency(&9), None);
        }

        #[test]
        fn chain_order_is_insertion_order() {
            let mut cache = LfuChainCache::new(4);
            for k in 1..=3 {
                cache.put(k, k);
            }
            cache.get(&1);
            cache.put(2, 20);
            assert_eq!(cache.keys(), vec![3, 2, 1]);
        }

        #[test]
        fn zero_capacity_is_a_counted_no_op() {
            let mut cache = LfuChainCache::new(0);
            cache.put(1, 1);
            assert_eq!(cache.size(), 0);
            assert_eq!(cache.allocations(), 0);
            assert_eq!(cache.counters().puts, 1);
        }

        #[test]
        fn labels() {
            let cache: LfuChainCache<u8, u8> = LfuChainCache::new(1);
            assert_eq!(cache.policy_name(), "LFU");
            assert_eq!(cache.impl_name(), "rec");
        }
    }

    mod eviction_order {
        use super::*;

        #[test]
        fn lowest_count_is_evicted() {
            let mut cache = LfuChainCache::new(2);
            cache.put(1, 10);
            cache.put(2, 20);
            cache.get(&1);
            cache.put(3, 30);
            assert!(!cache.contains(&2));
            assert!(cache.contains(&1));
            assert!(cache.contains(&3));
        }

        #[test]
        fn ties_evict_most_recent_insert() {
            let mut cache = LfuChainCache::new(3);
            cache.put(1, ());
            cache.put(2, ());
            cache.put(3, ());
            cache.put(4, ());
            assert_eq!(cache.keys(), vec![4, 2, 1]);

            // an older node with a lower count still loses
            cache.get(&4);
            cache.get(&2);
            cache.put(5, ());
            assert_eq!(cache.keys(), vec![5, 4, 2]);
        }

        #[test]
        fn evictions_release_nodes() {
            let mut cache = LfuChainCache::new(2);
            for k in 0..6u32 {
                cache.put(k, k);
            }
            assert_eq!(cache.counters().evictions, 4);
            assert_eq!(cache.allocations(), 6);
            assert_eq!(cache.deallocations(), 4);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn drop_releases_remaining_nodes() {
            let mut cache = LfuChainCache::new(10_000);
            for k in 0..10_000u32 {
                cache.put(k, ());
            }
            let tracker = cache.allocation_tracker();
            drop(cache);
            assert_eq!(tracker.live(), 0);
            assert_eq!(tracker.deallocations(), 10_000);
        }
    }
}
