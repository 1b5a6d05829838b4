// Metrics hooks for the `matcher` crate.
//
// Callers install a global `MatchMetrics` implementation via [`set_match_metrics`],
// then every `Matcher` reports per-batch sizes and latency for each call to
// [`Matcher::run_batch`](crate::Matcher::run_batch). This keeps instrumentation
// decoupled from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Sizes and timing of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub lost: usize,
    pub found: usize,
    /// Pairs actually scored.
    pub evaluated: usize,
    /// Pairs with a non-zero score.
    pub retained: usize,
    /// Retained pairs at or above the notification threshold.
    pub notify_eligible: usize,
    pub latency: Duration,
}

/// Metrics observer for batch runs.
pub trait MatchMetrics: Send + Sync {
    /// Record the outcome of one batch.
    fn record_batch(&self, stats: &BatchStats);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global match metrics recorder.
///
/// This is typically called once during service startup so all `Matcher`
/// instances share the same metrics backend.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
