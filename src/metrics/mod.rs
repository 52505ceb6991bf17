//! Instrumentation shared by every engine: operation counters, memory
//! estimates and node allocation tallies.

pub mod allocation;
pub mod cell;
pub mod counters;
pub mod memory;

pub use allocation::AllocationTracker;
pub use counters::{CoreMetricsRecorder, OpCounters};
pub use memory::MemoryEstimate;
