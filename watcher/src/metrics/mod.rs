pub mod counters;

pub use counters::CycleCounters;
