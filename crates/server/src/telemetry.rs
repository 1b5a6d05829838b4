//! Bridges matcher batch statistics and HTTP traffic into the `metrics`
//! facade, rendered for Prometheus at `GET /metrics`.

use matcher::{BatchStats, MatchMetrics};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// [`MatchMetrics`] implementation backed by the global `metrics` recorder.
#[derive(Debug, Default)]
pub struct PrometheusMatchMetrics;

impl MatchMetrics for PrometheusMatchMetrics {
    fn record_batch(&self, stats: &BatchStats) {
        metrics::counter!("lostfound_match_batches_total").increment(1);
        metrics::counter!("lostfound_match_pairs_evaluated_total").increment(stats.evaluated as u64);
        metrics::counter!("lostfound_match_pairs_retained_total").increment(stats.retained as u64);
        metrics::gauge!("lostfound_match_last_batch_lost").set(stats.lost as f64);
        metrics::gauge!("lostfound_match_last_batch_found").set(stats.found as f64);
        metrics::gauge!("lostfound_match_last_batch_notify_eligible")
            .set(stats.notify_eligible as f64);
        metrics::histogram!("lostfound_match_batch_seconds").record(stats.latency.as_secs_f64());
    }
}

pub fn record_request(method: &str, status: u16, seconds: f64) {
    metrics::counter!(
        "lostfound_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("lostfound_http_request_seconds").record(seconds);
}

pub fn record_notifications(sent: usize, failed: usize) {
    metrics::counter!("lostfound_notifications_sent_total").increment(sent as u64);
    metrics::counter!("lostfound_notifications_failed_total").increment(failed as u64);
}

/// Install the process-wide Prometheus recorder.
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}
