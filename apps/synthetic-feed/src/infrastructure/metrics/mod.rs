//! Prometheus Metrics Module
//!
//! Exposes feed metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Generation**: Ticks synthesized, cycle durations and throughput
//! - **Delivery**: Sink rejections and ticks dropped for backlogged subscribers
//! - **Subscriptions**: Symbols currently generated
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the health server port. Recording
//! before `init_metrics` is a no-op.

use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::application::services::CycleSummary;
use crate::domain::market_data::TickType;

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    // Generation
    describe_counter!(
        "synthetic_feed_ticks_generated_total",
        "Total synthetic ticks produced"
    );
    describe_counter!(
        "synthetic_feed_cycles_total",
        "Total generation cycles completed, warm-start passes included"
    );
    describe_histogram!(
        "synthetic_feed_cycle_duration_seconds",
        "Wall time of one generation cycle"
    );
    describe_gauge!(
        "synthetic_feed_ticks_per_second",
        "Tick production rate at the last timer firing"
    );

    // Delivery
    describe_counter!(
        "synthetic_feed_sink_failures_total",
        "Total ticks the aggregation sink rejected"
    );
    describe_counter!(
        "synthetic_feed_ticks_dropped_total",
        "Total ticks dropped for backlogged subscriptions"
    );
    describe_counter!(
        "synthetic_feed_ticks_consumed_total",
        "Total ticks drained by in-process consumers"
    );

    // Subscriptions
    describe_gauge!(
        "synthetic_feed_subscribed_symbols",
        "Number of symbols currently generated"
    );
    describe_gauge!(
        "synthetic_feed_sink_subscriptions",
        "Number of subscriptions registered with the aggregation sink"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Record the outcome of one generation cycle.
pub fn record_cycle(summary: &CycleSummary) {
    counter!("synthetic_feed_cycles_total").increment(1);
    counter!("synthetic_feed_ticks_generated_total").increment(summary.generated);
    if summary.failed > 0 {
        counter!("synthetic_feed_sink_failures_total").increment(summary.failed);
    }
    histogram!("synthetic_feed_cycle_duration_seconds").record(summary.duration.as_secs_f64());
}

/// Update the throughput gauge.
pub fn set_ticks_per_second(rate: f64) {
    gauge!("synthetic_feed_ticks_per_second").set(rate);
}

/// Record ticks dropped for a backlogged subscription.
pub fn record_ticks_dropped(tick_type: TickType, count: u64) {
    counter!(
        "synthetic_feed_ticks_dropped_total",
        "tick_type" => tick_type.as_str()
    )
    .increment(count);
}

/// Record ticks drained by a consumer.
pub fn record_ticks_consumed(count: u64) {
    counter!("synthetic_feed_ticks_consumed_total").increment(count);
}

/// Update the subscribed symbol count.
#[allow(clippy::cast_precision_loss)]
pub fn set_subscribed_symbols(count: usize) {
    gauge!("synthetic_feed_subscribed_symbols").set(count as f64);
}

/// Update the sink subscription count.
#[allow(clippy::cast_precision_loss)]
pub fn set_sink_subscriptions(count: usize) {
    gauge!("synthetic_feed_sink_subscriptions").set(count as f64);
}

// =============================================================================
// Tests
// =============================================================================
