pub use crate::builder::{CacheBuilder, CachePolicy};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::metrics::{AllocationTracker, MemoryEstimate, OpCounters};
pub use crate::notify::EvictionNotifier;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lfu_chain::LfuChainCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::lru_chain::LruChainCache;
pub use crate::traits::{AllocationTracking, EvictionCache};
