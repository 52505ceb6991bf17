/// Byte-level footprint diagnostics reported by `estimate_memory`.
///
/// - `theoretical`: `capacity * size_of::<node>()`
/// - `actual`: `size * size_of::<node>()`
/// - `overhead`: structural bookkeeping (links, index slots, bucket headers)
///
/// Purely diagnostic; nothing in the engines depends on these numbers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryEstimate {
    pub theoretical: usize,
    pub actual: usize,
    pub overhead: usize,
}

impl MemoryEstimate {
    pub(crate) fn for_nodes<N>(capacity: usize, len: usize, overhead: usize) -> Self {
        let node = std::mem::size_of::<N>();
        Self {
            theoretical: capacity * node,
            actual: len * node,
            overhead,
        }
    }

    /// Bytes one hash-index entry costs: the stored key and handle plus the
    /// table's control byte.
    pub(crate) fn index_slot_bytes<K, H>() -> usize {
        std::mem::size_of::<(K, H)>() + 1
    }

    /// `actual / theoretical` as a percentage; `0.0` for zero capacity.
    pub fn efficiency_pct(&self) -> f64 {
        if self.theoretical == 0 {
            return 0.0;
        }
        self.actual as f64 / self.theoretical as f64 * 100.0
    }

    /// `overhead / actual` as a percentage; `0.0` for an empty cache.
    pub fn overhead_pct(&self) -> f64 {
        if self.actual == 0 {
            return 0.0;
        }
        self.overhead as f64 / self.actual as f64 * 100.0
    }
}
