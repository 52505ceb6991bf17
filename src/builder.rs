//! Unified builder over the four eviction engines.
//!
//! A driver names an engine by its `algo`/`impl` pair, gets back a boxed
//! [`EvictionCache`], and runs the same workload against each one.
//!
//! ## Example
//!
//! ```rust
//! use evictlab::builder::{CacheBuilder, CachePolicy};
//!
//! for policy in CachePolicy::ALL {
//!     let mut cache = CacheBuilder::<u64>::new(2).build::<String>(policy);
//!     cache.put(1, "one".to_string());
//!     cache.put(2, "two".to_string());
//!     cache.get(&1);
//!     cache.put(3, "three".to_string());
//!
//!     assert_eq!(cache.size(), 2);
//!     assert!(!cache.contains(&2), "{} kept key 2", policy);
//! }
//! ```

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::notify::EvictionNotifier;
use crate::policy::lfu::LfuCache;
use crate::policy::lfu_chain::LfuChainCache;
use crate::policy::lru::LruCache;
use crate::policy::lru_chain::LruChainCache;
use crate::traits::EvictionCache;

/// Available eviction engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    /// LRU over a hash index and a doubly linked list. Label `lru-iter`.
    LruIndexed,
    /// LRU over a singly linked chain with linear search. Label `lru-rec`.
    LruChained,
    /// LFU over frequency buckets with `min_freq`. Label `lfu-iter`.
    LfuBucketed,
    /// LFU over a singly linked chain with linear search. Label `lfu-rec`.
    LfuChained,
}

impl CachePolicy {
    pub const ALL: [CachePolicy; 4] = [
        CachePolicy::LruIndexed,
        CachePolicy::LruChained,
        CachePolicy::LfuBucketed,
        CachePolicy::LfuChained,
    ];

    /// `"LRU"` or `"LFU"`.
    pub fn algo(self) -> &'static str {
        match self {
            CachePolicy::LruIndexed | CachePolicy::LruChained => "LRU",
            CachePolicy::LfuBucketed | CachePolicy::LfuChained => "LFU",
        }
    }

    /// `"iter"` for the indexed engines, `"rec"` for the chained ones.
    pub fn implementation(self) -> &'static str {
        match self {
            CachePolicy::LruIndexed | CachePolicy::LfuBucketed => "iter",
            CachePolicy::LruChained | CachePolicy::LfuChained => "rec",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.algo().to_ascii_lowercase(),
            self.implementation()
        )
    }
}

impl FromStr for CachePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase().replace('_', "-");
        match label.as_str() {
            "lru-iter" => Ok(CachePolicy::LruIndexed),
            "lru-rec" => Ok(CachePolicy::LruChained),
            "lfu-iter" => Ok(CachePolicy::LfuBucketed),
            "lfu-rec" => Ok(CachePolicy::LfuChained),
            _ => Err(ConfigError::new(format!(
                "unknown cache policy `{}` (expected one of lru-iter, lru-rec, lfu-iter, lfu-rec)",
                s
            ))),
        }
    }
}

/// Builder for boxed cache engines keyed by `K`.
pub struct CacheBuilder<K> {
    capacity: usize,
    notifier: EvictionNotifier<K>,
}

impl<K> CacheBuilder<K> {
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            notifier: EvictionNotifier::none(),
        }
    }

    /// Installs `notifier` on the engine that gets built.
    pub fn notifier(mut self, notifier: EvictionNotifier<K>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Build an engine for `policy`.
    ///
    /// ```rust
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// use evictlab::builder::{CacheBuilder, CachePolicy};
    /// use evictlab::notify::EvictionNotifier;
    ///
    /// let evicted = Rc::new(Cell::new(0));
    /// let seen = Rc::clone(&evicted);
    /// let mut cache = CacheBuilder::new(1)
    ///     .notifier(EvictionNotifier::new(move |_: &u32| seen.set(seen.get() + 1)))
    ///     .build::<()>("lfu-rec".parse().unwrap());
    ///
    /// cache.put(1, ());
    /// cache.put(2, ());
    /// assert_eq!(evicted.get(), 1);
    /// assert_eq!(cache.policy_name(), "LFU");
    /// ```
    pub fn build<V>(self, policy: CachePolicy) -> Box<dyn EvictionCache<K, V>>
    where
        K: Eq + Hash + Clone + 'static,
        V: 'static,
    {
        let CacheBuilder { capacity, notifier } = self;
        match policy {
            CachePolicy::LruIndexed => Box::new(LruCache::with_notifier(capacity, notifier)),
            CachePolicy::LruChained => Box::new(LruChainCache::with_notifier(capacity, notifier)),
            CachePolicy::LfuBucketed => Box::new(LfuCache::with_notifier(capacity, notifier)),
            CachePolicy::LfuChained => Box::new(LfuChainCache::with_notifier(capacity, notifier)),
        }
    }
}

impl<K> fmt::Debug for CacheBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("capacity", &self.capacity)
            .field("notifier", &self.notifier)
            .finish()
    }
}
