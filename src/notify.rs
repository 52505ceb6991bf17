//! Single-slot eviction notification.
//!
//! Every engine carries one [`EvictionNotifier`]. When a capacity-triggered
//! eviction removes an entry the notifier is called with the evicted key;
//! with nothing installed the eviction proceeds silently. Installing a new
//! callback replaces the previous one; there is no listener fan-out.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use evictlab::notify::EvictionNotifier;
//! use evictlab::policy::lru::LruCache;
//! use evictlab::traits::EvictionCache;
//!
//! let evicted = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&evicted);
//!
//! let mut cache = LruCache::new(1);
//! cache.set_notifier(EvictionNotifier::new(move |k: &u32| sink.borrow_mut().push(*k)));
//! cache.put(1, "a");
//! cache.put(2, "b");
//! assert_eq!(*evicted.borrow(), vec![1]);
//! ```

use std::fmt;

type Callback<K> = Box<dyn FnMut(&K)>;

/// Optional callback invoked with each evicted key.
pub struct EvictionNotifier<K> {
    callback: Option<Callback<K>>,
}

impl<K> EvictionNotifier<K> {
    /// Wraps `f` as an installed notifier.
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(&K) + 'static,
    {
        Self {
            callback: Some(Box::new(f)),
        }
    }

    /// A notifier with no callback installed.
    pub fn none() -> Self {
        Self { callback: None }
    }

    pub fn is_installed(&self) -> bool {
        self.callback.is_some()
    }

    /// Calls the installed callback, if any.
    #[inline]
    pub(crate) fn notify(&mut self, key: &K) {
        if let Some(callback) = self.callback.as_mut() {
            callback(key);
        }
    }
}

impl<K> Default for EvictionNotifier<K> {
    fn default() -> Self {
        Self::none()
    }
}

impl<K> fmt::Debug for EvictionNotifier<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionNotifier")
            .field("installed", &self.is_installed())
            .finish()
    }
}
