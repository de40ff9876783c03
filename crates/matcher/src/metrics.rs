// Metrics hooks for the `matcher` crate.
//
// Callers install a global `SearchMetrics` implementation via [`set_search_metrics`],
// then every `SearchEngine` reports per-query latency, hit count, and outcome,
// plus a summary for each catalog rebuild. The crate itself stays independent
// of any particular metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use index::BuildStats;
use once_cell::sync::OnceCell;

/// Metrics observer for search operations.
pub trait SearchMetrics: Send + Sync {
    /// Record the outcome of one search.
    ///
    /// `outcome` is `"ok"`, `"empty_query"`, or a failure code such as
    /// `"provider_unavailable"`. `hit_count` is the number of results returned.
    fn record_search(&self, outcome: &str, latency: Duration, hit_count: usize);

    /// Record a successful catalog (re)build.
    fn record_rebuild(&self, _stats: &BuildStats) {}
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn SearchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn SearchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn SearchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global search metrics recorder.
///
/// Usually called once at service startup.
pub fn set_search_metrics(recorder: Option<Arc<dyn SearchMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
