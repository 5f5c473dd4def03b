//! Prometheus metrics for engagement-service.
//!
//! Exposes toggle/view counters, aggregation latency and an HTTP handler for
//! the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Like/subscription toggles by kind (like, subscription) and result (on, off).
    pub static ref TOGGLE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "engagement_toggle_total",
        "Engagement toggles segmented by kind and resulting state",
        &["kind", "result"]
    )
    .expect("failed to register engagement_toggle_total");

    /// View recordings by result (new, repeat, removed).
    pub static ref VIEW_TOTAL: IntCounterVec = register_int_counter_vec!(
        "engagement_view_total",
        "View recordings segmented by outcome",
        &["result"]
    )
    .expect("failed to register engagement_view_total");

    /// Latency of read-side aggregations (feed, channel_stats, list_videos).
    pub static ref AGGREGATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "engagement_aggregation_duration_seconds",
        "Aggregation duration segmented by operation",
        &["operation"]
    )
    .expect("failed to register engagement_aggregation_duration_seconds");
}

pub fn record_toggle(kind: &str, is_active: bool) {
    let result = if is_active { "on" } else { "off" };
    TOGGLE_TOTAL.with_label_values(&[kind, result]).inc();
}

pub fn record_view(result: &str) {
    VIEW_TOTAL.with_label_values(&[result]).inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
