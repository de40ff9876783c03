//! Prometheus wiring for [`matcher::SearchMetrics`].

use index::BuildStats;
use matcher::{set_search_metrics, SearchMetrics};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;

/// Forwards search and rebuild events to the global `metrics` recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusSearchMetrics;

impl SearchMetrics for PrometheusSearchMetrics {
    fn record_search(&self, outcome: &str, latency: Duration, hit_count: usize) {
        metrics::counter!("semsearch_searches_total", "outcome" => outcome.to_owned())
            .increment(1);
        metrics::histogram!("semsearch_search_latency_seconds", "outcome" => outcome.to_owned())
            .record(latency.as_secs_f64());
        metrics::histogram!("semsearch_search_hits").record(hit_count as f64);
    }

    fn record_rebuild(&self, stats: &BuildStats) {
        metrics::counter!("semsearch_catalog_rebuilds_total").increment(1);
        metrics::gauge!("semsearch_catalog_items").set(stats.indexed as f64);
        metrics::gauge!("semsearch_catalog_degenerate_items").set(stats.degenerate as f64);
        metrics::histogram!("semsearch_catalog_build_seconds")
            .record(stats.elapsed_ms as f64 / 1000.0);
    }
}

/// Install the process-wide Prometheus recorder and hook the engine metrics into it.
///
/// Call once, before the engine is built, so the initial build is recorded.
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    set_search_metrics(Some(Arc::new(PrometheusSearchMetrics)));
    Ok(handle)
}
