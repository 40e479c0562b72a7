//! Prometheus metrics for the relay.
//!
//! - SSE connection metrics (open streams, opened/closed counters, duration)
//! - Stream message metrics (sent, delivered, failed)
//! - Push metrics (delivery outcomes, subscription registrations, worker failures)

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};

use crate::push::DeliveryOutcome;

/// Prefix for all metrics
const METRIC_PREFIX: &str = "relay";

lazy_static! {
    // ============================================================================
    // SSE Connection Metrics
    // ============================================================================

    /// Number of open SSE streams
    pub static ref SSE_CONNECTIONS_ACTIVE: IntGauge = register_int_gauge!(
        format!("{}_sse_connections_active", METRIC_PREFIX),
        "Number of open SSE streams"
    ).unwrap();

    /// Total SSE streams opened
    pub static ref SSE_CONNECTIONS_OPENED: IntCounter = register_int_counter!(
        format!("{}_sse_connections_opened_total", METRIC_PREFIX),
        "Total SSE streams opened"
    ).unwrap();

    /// Total SSE streams closed
    pub static ref SSE_CONNECTIONS_CLOSED: IntCounter = register_int_counter!(
        format!("{}_sse_connections_closed_total", METRIC_PREFIX),
        "Total SSE streams closed"
    ).unwrap();

    /// SSE stream lifetime
    pub static ref SSE_CONNECTION_DURATION: Histogram = register_histogram!(
        format!("{}_sse_connection_duration_seconds", METRIC_PREFIX),
        "SSE stream lifetime in seconds",
        vec![1.0, 10.0, 60.0, 300.0, 1800.0, 3600.0, 14400.0]
    ).unwrap();

    // ============================================================================
    // Stream Message Metrics
    // ============================================================================

    /// Stream messages accepted by `/send`
    pub static ref STREAM_MESSAGES_SENT: IntCounter = register_int_counter!(
        format!("{}_stream_messages_sent_total", METRIC_PREFIX),
        "Messages accepted for SSE delivery"
    ).unwrap();

    /// Stream messages handed to a connection
    pub static ref STREAM_MESSAGES_DELIVERED: IntCounter = register_int_counter!(
        format!("{}_stream_messages_delivered_total", METRIC_PREFIX),
        "Messages handed to SSE connections"
    ).unwrap();

    /// Stream messages that could not be handed to a connection
    pub static ref STREAM_MESSAGES_FAILED: IntCounter = register_int_counter!(
        format!("{}_stream_messages_failed_total", METRIC_PREFIX),
        "Messages that could not be handed to SSE connections"
    ).unwrap();

    // ============================================================================
    // Push Metrics
    // ============================================================================

    /// Push deliveries by outcome
    pub static ref PUSH_DELIVERIES: IntCounterVec = register_int_counter_vec!(
        format!("{}_push_deliveries_total", METRIC_PREFIX),
        "Push deliveries by outcome",
        &["outcome"]
    ).unwrap();

    /// Subscription registrations
    pub static ref PUSH_REGISTRATIONS: IntCounter = register_int_counter!(
        format!("{}_push_registrations_total", METRIC_PREFIX),
        "Push subscription registrations"
    ).unwrap();

    /// Failures reported by background workers
    pub static ref PUSH_CLIENT_FAILURES: IntCounter = register_int_counter!(
        format!("{}_push_client_failures_total", METRIC_PREFIX),
        "Push handling failures reported by background workers"
    ).unwrap();

    /// Number of stored push subscriptions
    pub static ref PUSH_SUBSCRIPTIONS: IntGauge = register_int_gauge!(
        format!("{}_push_subscriptions", METRIC_PREFIX),
        "Number of stored push subscriptions"
    ).unwrap();
}

/// Encode all registered metrics in the Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper for recording SSE stream metrics
pub struct StreamMetrics;

impl StreamMetrics {
    pub fn record_opened() {
        SSE_CONNECTIONS_OPENED.inc();
        SSE_CONNECTIONS_ACTIVE.inc();
    }

    pub fn record_closed(duration_secs: f64) {
        SSE_CONNECTIONS_CLOSED.inc();
        SSE_CONNECTIONS_ACTIVE.dec();
        SSE_CONNECTION_DURATION.observe(duration_secs);
    }

    pub fn record_message(delivered: usize, failed: usize) {
        STREAM_MESSAGES_SENT.inc();
        STREAM_MESSAGES_DELIVERED.inc_by(delivered as u64);
        STREAM_MESSAGES_FAILED.inc_by(failed as u64);
    }
}

/// Helper for recording push metrics
pub struct PushMetrics;

impl PushMetrics {
    pub fn record_outcome(outcome: &DeliveryOutcome) {
        let label = match outcome {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::Gone => "gone",
            DeliveryOutcome::Rejected { .. } => "rejected",
        };
        PUSH_DELIVERIES.with_label_values(&[label]).inc();
    }

    pub fn record_error() {
        PUSH_DELIVERIES.with_label_values(&["error"]).inc();
    }

    pub fn record_registration() {
        PUSH_REGISTRATIONS.inc();
    }

    pub fn record_client_failure() {
        PUSH_CLIENT_FAILURES.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_includes_relay_metrics() {
        PushMetrics::record_outcome(&DeliveryOutcome::Delivered);
        StreamMetrics::record_message(1, 0);

        let output = encode_metrics().unwrap();
        assert!(output.contains("relay_push_deliveries_total"));
        assert!(output.contains("relay_stream_messages_sent_total"));
    }
}
