use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default, Debug)]
pub struct CycleCounters {
    pub cycles: Arc<AtomicU64>,
    pub fetch_failures: Arc<AtomicU64>,

    // per instrument
    pub evaluated: Arc<AtomicU64>,
    pub parse_failures: Arc<AtomicU64>,

    // delivery
    pub notifications_sent: Arc<AtomicU64>,
    pub delivery_failures: Arc<AtomicU64>,
}

impl CycleCounters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
