use tracing::Span;

use super::TraceId;

/// Root span for one sampling cycle.
pub fn cycle_span(cycle: u64, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "cycle",
        cycle = cycle,
        trace_id = %trace_id.as_str()
    )
}

/// Child span (inherits trace_id from the current root).
pub fn child_span(name: &'static str, instrument: &str) -> Span {
    tracing::debug_span!("child", name = %name, instrument = %instrument)
}
