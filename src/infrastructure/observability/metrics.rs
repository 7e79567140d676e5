//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_default_metrics();

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    gauge!("config_proxy_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", truncate_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record the outcome of a cache read (hit, miss or unavailable)
pub fn record_cache_lookup(backend: &'static str, outcome: &'static str) {
    counter!(
        "config_cache_lookups_total",
        "backend" => backend,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record the outcome of a cache population attempt
pub fn record_cache_write(backend: &'static str, outcome: &'static str) {
    counter!(
        "config_cache_writes_total",
        "backend" => backend,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record a fetch against the authoritative store
pub fn record_source_fetch(store: &'static str, success: bool, duration: Duration) {
    let status = if success { "success" } else { "error" };

    counter!("config_source_fetches_total", "store" => store, "status" => status).increment(1);
    histogram!("config_source_fetch_duration_seconds", "store" => store)
        .record(duration.as_secs_f64());
}

/// Cap label length so unmatched paths cannot blow up cardinality
fn truncate_path(path: &str) -> String {
    if path.len() > 50 {
        path.chars().take(50).collect()
    } else {
        path.to_string()
    }
}
