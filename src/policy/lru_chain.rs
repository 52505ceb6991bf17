//! # LRU engine (chained)
//!
//! Index-free LRU over a singly linked [`Chain`]. Every lookup walks from
//! the head, so `get` and `put` are O(n); this engine exists as the
//! pointer-chasing baseline for the indexed [`LruCache`](super::lru::LruCache).
//!
//! ```text
//!   head (MRU)                                   tail (LRU)
//!    │                                              │
//!    ▼                                              ▼
//!   [k3,v3] ──► [k1,v1] ──► [k4,v4] ──► [k2,v2] ──► None
//!
//!   get(k4): walk keeping (prev, cur), unlink cur, relink at head
//!
//!   [k4,v4] ──► [k3,v3] ──► [k1,v1] ──► [k2,v2] ──► None
//! ```
//!
//! Nodes live in a slot arena and every allocation and release is counted,
//! so a driver can confirm through [`AllocationTracking`] that nothing leaks
//! across evictions or on drop.

use std::fmt;

use crate::ds::chain::Chain;
use crate::error::InvariantError;
use crate::metrics::{AllocationTracker, CoreMetricsRecorder, MemoryEstimate, OpCounters};
use crate::notify::EvictionNotifier;
use crate::traits::{AllocationTracking, EvictionCache};

use super::{check_counters, check_unique_keys};

#[derive(Debug)]
struct ChainEntry<K, V> {
    key: K,
    value: V,
}

/// O(n) LRU cache over an arena-backed singly linked chain.
pub struct LruChainCache<K, V> {
    chain: Chain<ChainEntry<K, V>>,
    capacity: usize,
    counters: OpCounters,
    notifier: EvictionNotifier<K>,
}

impl<K, V> LruChainCache<K, V>
where
    K: Eq + Clone,
{
    pub fn new(capacity: usize) -> Self {
        tracing::debug!(policy = "LRU", implementation = "rec", capacity, "cache created");
        LruChainCache {
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

    /// Releases the tail node as a capacity eviction.
    fn evict_tail(&mut self) {
        let Some(tail) = self.chain.tail() else {
            return;
        };
        let Some(entry) = self.chain.remove(tail) else {
            return;
        };
        self.counters.record_eviction();
        tracing::trace!(
            policy = "LRU",
            implementation = "rec",
            size = self.chain.len(),
            "evicted least recently used entry"
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
        check_unique_keys(self.chain.iter().map(|entry| &entry.key))?;
        check_counters(&self.counters)
    }
}

impl<K, V> EvictionCache<K, V> for LruChainCache<K, V>
where
    K: Eq + Clone,
{
    fn put(&mut self, key: K, value: V) {
        self.counters.record_put();

        if let Some(link) = self.chain.position(|entry| entry.key == key) {
            self.chain.move_to_front(link);
            if let Some(entry) = self.chain.get_mut(link.id) {
                entry.value = value;
            }
            return;
        }

        if self.capacity == 0 {
            return;
        }
        if self.chain.len() >= self.capacity {
            self.evict_tail();
        }
        self.chain.push_front(ChainEntry { key, value });
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        let Some(link) = self.chain.position(|entry| entry.key == *key) else {
            self.counters.record_get_miss();
            return None;
        };
        self.counters.record_get_hit();
        self.chain.move_to_front(link);
        self.chain.get(link.id).map(|entry| &entry.value)
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
        let link = std::mem::size_of::<Option<crate::ds::SlotId>>();
        MemoryEstimate::for_nodes::<ChainEntry<K, V>>(self.capacity, len, len * link)
    }

    fn set_notifier(&mut self, notifier: EvictionNotifier<K>) -> EvictionNotifier<K> {
        std::mem::replace(&mut self.notifier, notifier)
    }

    fn keys(&self) -> Vec<K> {
        self.chain.iter().map(|entry| entry.key.clone()).collect()
    }

    fn policy_name(&self) -> &'static str {
        "LRU"
    }

    fn impl_name(&self) -> &'static str {
        "rec"
    }
}

impl<K, V> AllocationTracking for LruChainCache<K, V> {
    fn allocation_tracker(&self) -> AllocationTracker {
        self.chain.tracker().clone()
    }
}

impl<K, V> fmt::Debug for LruChainCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruChainCache")
            .field("len", &self.chain.len())
            .field("capacity", &self.capacity)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}
