//! # Cache Capability Contract
//!
//! Every engine in [`crate::policy`] implements [`EvictionCache`], so a
//! benchmarking driver can hold any of them as `Box<dyn EvictionCache<K, V>>`
//! and compare them on identical workloads.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │             EvictionCache<K, V>              │
//!                    │                                              │
//!                    │  put(&mut, K, V)                             │
//!                    │  get(&mut, &K) → Option<&V>                  │
//!                    │  contains(&, &K) → bool                      │
//!                    │  size(&) / capacity(&) → usize               │
//!                    │  counters(&) → &OpCounters                   │
//!                    │  estimate_memory(&) → MemoryEstimate         │
//!                    │  set_notifier(&mut, EvictionNotifier<K>)     │
//!                    │  keys(&) → Vec<K>                            │
//!                    └──────────────────────┬───────────────────────┘
//!                                           │
//!          ┌───────────────────┬────────────┴──────┬───────────────────┐
//!          ▼                   ▼                   ▼                   ▼
//!   ┌─────────────┐    ┌───────────────┐    ┌─────────────┐    ┌───────────────┐
//!   │  LruCache   │    │ LruChainCache │    │  LfuCache   │    │ LfuChainCache │
//!   │ LRU / iter  │    │  LRU / rec    │    │ LFU / iter  │    │  LFU / rec    │
//!   │ O(1)        │    │  O(n)         │    │ O(1) amort. │    │  O(n)         │
//!   └─────────────┘    └───────┬───────┘    └─────────────┘    └───────┬───────┘
//!                              │                                       │
//!                              └──────────────┬────────────────────────┘
//!                                             ▼
//!                               ┌───────────────────────────┐
//!                               │    AllocationTracking     │
//!                               │ allocations/deallocations │
//!                               └───────────────────────────┘
//! ```
//!
//! ## Semantics shared by all engines
//!
//! | Call        | Counter effect                  | Structural effect                         |
//! |-------------|---------------------------------|-------------------------------------------|
//! | `put` new   | `puts += 1`, maybe `evictions += 1` | evict one victim when full, then insert |
//! | `put` known | `puts += 1`                     | overwrite value, touch                    |
//! | `get` hit   | `gets += 1`, `hits += 1`        | touch                                     |
//! | `get` miss  | `gets += 1`, `misses += 1`      | none                                      |
//!
//! With `capacity() == 0` every `put` is counted and otherwise ignored.
//! No call can fail; absent keys are reported as `None`.
//!
//! ## Thread Safety
//!
//! Engines are single-threaded. The installed notifier is an arbitrary
//! `FnMut`, so sharing an engine across threads needs an outer lock and a
//! notifier that is safe to call from whichever thread holds it.

use crate::metrics::{AllocationTracker, MemoryEstimate, OpCounters};
use crate::notify::EvictionNotifier;

/// Operations every eviction engine supports.
///
/// # Example
///
/// ```
/// use evictlab::policy::lfu::LfuCache;
/// use evictlab::policy::lru::LruCache;
/// use evictlab::traits::EvictionCache;
///
/// fn hit_trace(cache: &mut dyn EvictionCache<u32, u32>, keys: &[u32]) -> Vec<bool> {
///     keys.iter()
///         .map(|k| {
///             let hit = cache.get(k).is_some();
///             if !hit {
///                 cache.put(*k, k * 10);
///             }
///             hit
///         })
///         .collect()
/// }
///
/// let keys = [1, 2, 1, 3, 1, 2];
/// let mut lru: LruCache<u32, u32> = LruCache::new(2);
/// let mut lfu: LfuCache<u32, u32> = LfuCache::new(2);
/// assert_eq!(hit_trace(&mut lru, &keys), vec![false, false, true, false, true, false]);
/// assert_eq!(hit_trace(&mut lfu, &keys), vec![false, false, true, false, true, false]);
/// ```
pub trait EvictionCache<K, V> {
    /// Inserts or overwrites `key`.
    ///
    /// If the key is new and the cache is full, exactly one entry chosen by
    /// the policy is evicted first and the notifier is called with its key.
    fn put(&mut self, key: K, value: V);

    /// Looks up `key`, touching it on a hit.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks presence without touching recency or frequency state.
    fn contains(&self, key: &K) -> bool;

    /// Number of live entries.
    fn size(&self) -> usize;

    /// Maximum number of live entries, fixed at construction.
    fn capacity(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Running operation tallies. Never reset by the engine.
    fn counters(&self) -> &OpCounters;

    /// Footprint diagnostics for the current contents.
    fn estimate_memory(&self) -> MemoryEstimate;

    /// Installs `notifier`, returning whichever one was installed before.
    fn set_notifier(&mut self, notifier: EvictionNotifier<K>) -> EvictionNotifier<K>;

    /// Removes the installed notifier, if any.
    fn clear_notifier(&mut self) -> EvictionNotifier<K> {
        self.set_notifier(EvictionNotifier::none())
    }

    /// Live keys in the engine's own traversal order.
    ///
    /// For LRU engines this is most- to least-recently used.
    fn keys(&self) -> Vec<K>;

    /// Policy label, `"LRU"` or `"LFU"`.
    fn policy_name(&self) -> &'static str;

    /// Implementation label, `"iter"` (indexed) or `"rec"` (chained).
    fn impl_name(&self) -> &'static str;
}

/// Node accounting exposed by the chained engines for leak detection.
pub trait AllocationTracking {
    /// Nodes created so far.
    fn allocations(&self) -> u64 {
        self.allocation_tracker().allocations()
    }

    /// Nodes released so far, including releases performed on drop.
    fn deallocations(&self) -> u64 {
        self.allocation_tracker().deallocations()
    }

    /// A handle onto the same counters that outlives the engine.
    fn allocation_tracker(&self) -> AllocationTracker;
}
