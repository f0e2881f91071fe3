//! Health Check and Metrics Endpoint
//!
//! HTTP endpoint for health checks, generator status reporting, and
//! Prometheus metrics.
//!
//! # Endpoints
//!
//! - `GET /health` - Returns JSON health status
//! - `GET /healthz` - Liveness probe (simple OK)
//! - `GET /readyz` - Readiness probe (ready while the generator runs)
//! - `GET /metrics` - Prometheus metrics in text format

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::application::services::SyntheticDataQueue;
use crate::infrastructure::aggregator::SharedAggregator;
use crate::infrastructure::metrics::get_metrics_handle;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Service version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time.
    pub current_time: DateTime<Utc>,
    /// Generator status.
    pub feed: FeedStatus,
    /// Aggregation sink status.
    pub sink: SinkStatus,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Generator is producing ticks.
    Healthy,
    /// Generator has been disposed.
    Unhealthy,
}

/// Generator status.
#[derive(Debug, Clone, Serialize)]
pub struct FeedStatus {
    /// Always true for the synthetic feed.
    pub connected: bool,
    /// Whether the generation timer is armed.
    pub running: bool,
    /// Symbols currently generated.
    pub subscribed_symbols: Vec<String>,
    /// Total ticks synthesized.
    pub ticks_generated: u64,
    /// Total ticks the sink rejected.
    pub sink_failures: u64,
    /// Completed generation cycles.
    pub cycles_completed: u64,
    /// Rate at the last timer firing.
    pub ticks_per_second: Option<f64>,
}

/// Aggregation sink status.
#[derive(Debug, Clone, Serialize)]
pub struct SinkStatus {
    /// Registered subscriptions.
    pub subscriptions: usize,
    /// Ticks queued to subscribers.
    pub ticks_delivered: u64,
    /// Ticks dropped for backlogged subscribers.
    pub ticks_dropped: u64,
}

// =============================================================================
// Health Server State
// =============================================================================

/// Shared state for the health server.
pub struct HealthServerState {
    version: String,
    started_at: Instant,
    feed: Arc<SyntheticDataQueue>,
    aggregator: SharedAggregator,
}

impl HealthServerState {
    /// Create new health server state.
    #[must_use]
    pub fn new(version: String, feed: Arc<SyntheticDataQueue>, aggregator: SharedAggregator) -> Self {
        Self {
            version,
            started_at: Instant::now(),
            feed,
            aggregator,
        }
    }
}

// =============================================================================
// Health Server
// =============================================================================

/// Build the health router.
#[must_use]
pub fn router(state: Arc<HealthServerState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Health check HTTP server.
pub struct HealthServer {
    port: u16,
    state: Arc<HealthServerState>,
    cancel: CancellationToken,
}

impl HealthServer {
    /// Create a new health server.
    #[must_use]
    pub const fn new(port: u16, state: Arc<HealthServerState>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the health server until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HealthServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), HealthServerError> {
        let app = router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| HealthServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Health server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HealthServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Health server stopped");
        Ok(())
    }
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn health_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    let response = build_health_response(&state);
    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<Arc<HealthServerState>>) -> impl IntoResponse {
    if state.feed.is_disposed() {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    } else {
        (StatusCode::OK, "READY")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

fn build_health_response(state: &HealthServerState) -> HealthResponse {
    let stats = state.feed.stats();
    let sink = state.aggregator.stats();

    let status = if stats.disposed {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Healthy
    };

    HealthResponse {
        status,
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: Utc::now(),
        feed: FeedStatus {
            connected: stats.connected,
            running: stats.generator.running,
            subscribed_symbols: stats
                .subscribed_symbols
                .iter()
                .map(ToString::to_string)
                .collect(),
            ticks_generated: stats.generator.ticks_generated,
            sink_failures: stats.generator.sink_failures,
            cycles_completed: stats.generator.cycles_completed,
            ticks_per_second: stats.generator.last_throughput.map(|s| s.ticks_per_second),
        },
        sink: SinkStatus {
            subscriptions: sink.subscriptions,
            ticks_delivered: sink.ticks_delivered,
            ticks_dropped: sink.ticks_dropped,
        },
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Health server errors.
#[derive(Debug, thiserror::Error)]
pub enum HealthServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

// =============================================================================
// Tests
// =============================================================================
