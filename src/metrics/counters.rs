/// Recording side of the operation counters.
///
/// Engines only ever write through this trait; readers go through
/// [`OpCounters`]'s public fields or the rate helpers.
pub trait CoreMetricsRecorder {
    fn record_put(&mut self);
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_eviction(&mut self);
}

/// Monotonic operation tallies owned by every engine.
///
/// `hits + misses == gets` holds after every call, and `evictions` only
/// counts capacity-triggered removals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpCounters {
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    pub gets: u64,
    pub evictions: u64,
}

impl OpCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hits as a percentage of gets; `0.0` before the first get.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            return 0.0;
        }
        self.hits as f64 / self.gets as f64 * 100.0
    }

    /// Misses as a percentage of gets; `0.0` before the first get.
    pub fn miss_rate(&self) -> f64 {
        if self.gets == 0 {
            return 0.0;
        }
        self.misses as f64 / self.gets as f64 * 100.0
    }

    /// Total public calls observed (`gets + puts`).
    pub fn operations(&self) -> u64 {
        self.gets + self.puts
    }
}

impl CoreMetricsRecorder for OpCounters {
    #[inline]
    fn record_put(&mut self) {
        self.puts += 1;
    }

    #[inline]
    fn record_get_hit(&mut self) {
        self.gets += 1;
        self.hits += 1;
    }

    #[inline]
    fn record_get_miss(&mut self) {
        self.gets += 1;
        self.misses += 1;
    }

    #[inline]
    fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}
