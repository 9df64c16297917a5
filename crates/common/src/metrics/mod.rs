//! Metrics and observability utilities
//!
//! Prometheus metrics with latency-oriented histograms and a shared naming
//! prefix.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Colloquium metrics
pub const METRICS_PREFIX: &str = "colloquium";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, // 1ms
    0.005, // 5ms
    0.010, // 10ms
    0.025, // 25ms
    0.050, // 50ms
    0.100, // 100ms
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_page_views_total", METRICS_PREFIX),
        Unit::Count,
        "Pages rendered, by template"
    );

    describe_counter!(
        format!("{}_not_found_total", METRICS_PREFIX),
        Unit::Count,
        "Detail lookups for absent or hidden rows"
    );

    describe_counter!(
        format!("{}_admin_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Admin list queries, by entity"
    );

    describe_histogram!(
        format!("{}_admin_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Admin list query latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Count a rendered page
pub fn record_page_view(template: &str) {
    counter!(
        format!("{}_page_views_total", METRICS_PREFIX),
        "template" => template.to_string()
    )
    .increment(1);
}

/// Count a detail lookup that found nothing visible
pub fn record_not_found(resource_type: &str) {
    counter!(
        format!("{}_not_found_total", METRICS_PREFIX),
        "resource" => resource_type.to_string()
    )
    .increment(1);
}

/// Record one admin list query
pub fn record_admin_query(entity: &str, duration_secs: f64, rows: usize) {
    counter!(
        format!("{}_admin_queries_total", METRICS_PREFIX),
        "entity" => entity.to_string(),
        "empty" => (rows == 0).to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_admin_query_duration_seconds", METRICS_PREFIX),
        "entity" => entity.to_string()
    )
    .record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: every call is a no-op
        let metrics = RequestMetrics::start("GET", "/events/");
        metrics.finish(200);
        record_page_view("main/home.html");
        record_not_found("project");
        record_admin_query("researchers", 0.002, 0);
    }
}
