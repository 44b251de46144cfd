//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the mediashelf server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Scanner and organizer activity (collected dynamically)
//! - Core scanner, organizer and verification metrics

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mediashelf_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediashelf_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "mediashelf_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Activity (collected dynamically)
// =============================================================================

/// Scanner running state (1 = scanning, 0 = idle).
pub static SCANNER_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "mediashelf_scanner_active",
        "Whether a library scan is running (1) or not (0)",
    )
    .unwrap()
});

/// Organizer running state (1 = organizing, 0 = idle).
pub static ORGANIZER_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "mediashelf_organizer_active",
        "Whether an organize run is in progress (1) or not (0)",
    )
    .unwrap()
});

/// Items held from the last scan.
pub static SCANNED_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "mediashelf_scanned_items",
        "Number of media items found by the last scan",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Activity
    registry.register(Box::new(SCANNER_ACTIVE.clone())).unwrap();
    registry
        .register(Box::new(ORGANIZER_ACTIVE.clone()))
        .unwrap();
    registry.register(Box::new(SCANNED_ITEMS.clone())).unwrap();

    // Core metrics (scanner, organizer, verification queue)
    for metric in mediashelf_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    SCANNER_ACTIVE.set(state.scanner().is_scanning().await as i64);
    ORGANIZER_ACTIVE.set(state.organizer().is_organizing().await as i64);
    SCANNED_ITEMS.set(state.scanner().scanned_items().await.len() as i64);
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("uuid pattern must compile")
});

static NUMERIC_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d+(/|$)").expect("numeric pattern must compile"));

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_SEGMENT.replace_all(path, "{id}");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/v1/verify/queue/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/verify/queue/{id}");
    }

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(normalize_path("/api/v1/items/42"), "/api/v1/items/{id}");
        assert_eq!(normalize_path("/api/v1/items/42/x"), "/api/v1/items/{id}/x");
    }

    #[test]
    fn test_normalize_path_static() {
        assert_eq!(normalize_path("/api/v1/scanner/status"), "/api/v1/scanner/status");
    }

    #[test]
    fn test_encode_includes_core_metrics() {
        mediashelf_core::metrics::VERIFY_QUEUE_DEPTH
            .with_label_values(&["queued"])
            .set(0);
        let text = encode_metrics();
        assert!(text.contains("mediashelf_verify_queue_depth"));
    }
}
