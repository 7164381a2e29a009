// Metrics hooks for the `xmatch_rows` crate.
//
// Callers install a global `MatchMetrics` implementation via [`set_match_metrics`],
// then every `RowMatcher` reports latency and pair counts for each call to
// [`RowMatcher::find_pair_matches`]. This keeps instrumentation decoupled from
// any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::PairMode;

/// Metrics observer for pair-matching runs.
pub trait MatchMetrics: Send + Sync {
    /// Record the outcome of a run.
    ///
    /// `rows1` and `rows2` are the input table sizes, `latency` the
    /// wall-clock duration of the run, and `pairs` the number of links
    /// returned after the pair-mode filter.
    fn record_match(
        &self,
        mode: PairMode,
        rows1: usize,
        rows2: usize,
        latency: Duration,
        pairs: usize,
    );
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
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
