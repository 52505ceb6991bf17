//! Eviction engines.
//!
//! | Module        | Engine          | Policy | Lookup            | Victim selection          |
//! |---------------|-----------------|--------|-------------------|---------------------------|
//! | [`lru`]       | `LruCache`      | LRU    | hash index, O(1)  | list tail, O(1)           |
//! | [`lru_chain`] | `LruChainCache` | LRU    | chain walk, O(n)  | chain tail walk, O(n)     |
//! | [`lfu`]       | `LfuCache`      | LFU    | hash index, O(1)  | `min_freq` bucket, O(1)   |
//! | [`lfu_chain`] | `LfuChainCache` | LFU    | chain walk, O(n)  | minimum-count walk, O(n)  |

pub mod lfu;
pub mod lfu_chain;
pub mod lru;
pub mod lru_chain;

use crate::error::InvariantError;
use crate::metrics::OpCounters;

/// `hits + misses == gets`, and no more evictions than puts.
pub(crate) fn check_counters(counters: &OpCounters) -> Result<(), InvariantError> {
    if counters.hits + counters.misses != counters.gets {
        return Err(InvariantError::new(format!(
            "hits {} + misses {} != gets {}",
            counters.hits, counters.misses, counters.gets
        )));
    }
    if counters.evictions > counters.puts {
        return Err(InvariantError::new(format!(
            "evictions {} exceed puts {}",
            counters.evictions, counters.puts
        )));
    }
    Ok(())
}

/// Quadratic duplicate scan for the index-free engines.
pub(crate) fn check_unique_keys<'a, K, I>(keys: I) -> Result<(), InvariantError>
where
    K: Eq + 'a,
    I: Iterator<Item = &'a K>,
{
    let mut seen: Vec<&K> = Vec::new();
    for key in keys {
        if seen.iter().any(|other| *other == key) {
            return Err(InvariantError::new(format!(
                "duplicate key at position {} of the chain",
                seen.len()
            )));
        }
        seen.push(key);
    }
    Ok(())
}
