use std::rc::Rc;

use crate::metrics::cell::MetricsCell;

#[derive(Debug, Default)]
struct AllocationCells {
    allocations: MetricsCell,
    deallocations: MetricsCell,
}

/// Node allocation/release tallies for the chained engines.
///
/// Cloning hands out another view of the same counters, so a harness can
/// keep one across the engine's drop and check that every node created was
/// released exactly once.
#[derive(Debug, Clone, Default)]
pub struct AllocationTracker {
    inner: Rc<AllocationCells>,
}

impl AllocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_allocation(&self) {
        self.inner.allocations.incr();
    }

    #[inline]
    pub(crate) fn record_release(&self) {
        self.inner.deallocations.incr();
    }

    pub fn allocations(&self) -> u64 {
        self.inner.allocations.get()
    }

    pub fn deallocations(&self) -> u64 {
        self.inner.deallocations.get()
    }

    /// Nodes created but not yet released.
    pub fn live(&self) -> u64 {
        self.allocations().saturating_sub(self.deallocations())
    }
}
