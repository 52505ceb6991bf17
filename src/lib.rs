//! evictlab: side-by-side LRU and LFU eviction engines.
//!
//! Four bounded key/value caches share one contract,
//! [`EvictionCache`](traits::EvictionCache):
//!
//! - [`LruCache`](policy::lru::LruCache): hash index plus recency list, O(1).
//! - [`LruChainCache`](policy::lru_chain::LruChainCache): singly linked chain, O(n).
//! - [`LfuCache`](policy::lfu::LfuCache): frequency buckets with `min_freq`, O(1).
//! - [`LfuChainCache`](policy::lfu_chain::LfuChainCache): singly linked chain, O(n).
//!
//! Every engine keeps [`OpCounters`](metrics::OpCounters), reports a
//! [`MemoryEstimate`](metrics::MemoryEstimate) and calls an optional
//! [`EvictionNotifier`](notify::EvictionNotifier) for each capacity eviction.
//! The chained engines also count node allocations so a driver can check
//! for leaks.
//!
//! Engines emit `tracing` events (`debug` on construction, `trace` per
//! eviction); installing a subscriber is left to the caller.

pub mod builder;
pub mod ds;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod policy;
pub mod prelude;
pub mod traits;
