use axum::response::IntoResponse;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

/// Install the global Prometheus recorder and register report metrics.
pub fn install_recorder() -> Result<Arc<PrometheusHandle>, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    metrics::describe_counter!(
        "reports_requested_total",
        "Reports stored and enqueued for generation"
    );
    metrics::describe_counter!(
        "report_publish_failures_total",
        "Reports stored but not accepted by the queue"
    );
    metrics::describe_counter!(
        "reports_completed_total",
        "Reports completed by the consumer"
    );
    metrics::describe_counter!(
        "reports_failed_total",
        "Report requests dropped by the consumer, by failing stage"
    );
    metrics::describe_histogram!(
        "report_processing_seconds",
        "Time to process one report request"
    );

    Ok(Arc::new(handle))
}

/// Prometheus metrics scrape endpoint.
/// Returns metrics in Prometheus text exposition format.
pub async fn prometheus_metrics(
    axum::extract::State(handle): axum::extract::State<Arc<PrometheusHandle>>,
) -> impl IntoResponse {
    handle.render()
}
