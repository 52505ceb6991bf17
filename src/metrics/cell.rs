use std::cell::Cell;

/// A monotonic counter that can be bumped through a shared reference.
///
/// Not `Sync`: engines are single-threaded and the counter is only ever
/// shared between an engine and the harness observing it.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }
}
