//! Synthetic Feed Binary
//!
//! Starts the synthetic market data feed with in-process draining consumers.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin synthetic-feed
//! ```
//!
//! # Environment Variables
//!
//! - `SYNTHETIC_FEED_SYMBOLS`: Comma-separated symbols (default: SPY)
//! - `SYNTHETIC_FEED_INTERVAL_MS`: Generation interval (default: 1000)
//! - `SYNTHETIC_FEED_BATCH_SIZE`: Ticks per symbol per cycle (default: 500000)
//! - `SYNTHETIC_FEED_QUANTITY_MIN` / `SYNTHETIC_FEED_QUANTITY_MAX`: Quantity bounds
//! - `SYNTHETIC_FEED_BASE_PRICE`: Lower bound of the price band (default: 10)
//! - `SYNTHETIC_FEED_WARM_START_PASSES`: Passes before the timer (default: 4)
//! - `SYNTHETIC_FEED_CHANNEL_CAPACITY`: Buffered ticks per subscription (default: 1000000)
//! - `SYNTHETIC_FEED_HEALTH_PORT`: Health check HTTP port (default: 8083)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4318>)
//! - `OTEL_SERVICE_NAME`: Service name (default: synthetic-feed)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures::StreamExt;
use synthetic_feed::infrastructure::health::{HealthServer, HealthServerState};
use synthetic_feed::infrastructure::metrics;
use synthetic_feed::infrastructure::telemetry;
use synthetic_feed::{
    AggregatorConfig, ChannelAggregator, FeedConfig, GeneratorConfig, NoOpObserver,
    SubscriptionRequest, SyntheticDataQueue, TickStream, init_metrics,
};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Ticks pulled per consumer wake-up.
const DRAIN_CHUNK: usize = 4_096;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting Synthetic Feed");

    let _metrics_handle = init_metrics();

    let config = FeedConfig::from_env().context("invalid feed configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let aggregator = Arc::new(ChannelAggregator::new(AggregatorConfig::from(
        config.aggregator.clone(),
    )));

    let feed = Arc::new(SyntheticDataQueue::new(
        GeneratorConfig::from_settings(&config.generator),
        aggregator.clone(),
    ));

    let requests: Vec<SubscriptionRequest> = config
        .symbols
        .iter()
        .cloned()
        .map(SubscriptionRequest::trades)
        .collect();

    let consumers: Vec<JoinHandle<u64>> = requests
        .iter()
        .map(|request| {
            let stream = feed.subscribe(request, Arc::new(NoOpObserver));
            tokio::spawn(drain(request.clone(), stream, shutdown_token.clone()))
        })
        .collect();

    let health_state = Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        Arc::clone(&feed),
        Arc::clone(&aggregator),
    ));
    let health_server = HealthServer::new(
        config.server.health_port,
        health_state,
        shutdown_token.clone(),
    );

    tokio::spawn(async move {
        if let Err(e) = health_server.run().await {
            tracing::error!(error = %e, "Health server error");
        }
    });

    tracing::info!(symbols = requests.len(), "Synthetic feed ready");

    await_shutdown(shutdown_token).await;

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, feed.shutdown())
        .await
        .is_err()
    {
        tracing::warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "Generation burst still running at shutdown timeout"
        );
    }

    for request in &requests {
        feed.unsubscribe(request);
    }

    let mut consumed = 0;
    for consumer in consumers {
        match consumer.await {
            Ok(count) => consumed += count,
            Err(e) => tracing::error!(error = %e, "Consumer task failed"),
        }
    }

    let stats = feed.stats();
    tracing::info!(
        ticks_generated = stats.generator.ticks_generated,
        ticks_consumed = consumed,
        sink_failures = stats.generator.sink_failures,
        cycles = stats.generator.cycles_completed,
        "Synthetic feed stopped"
    );
    Ok(())
}

/// Pull ticks off a subscription stream until it ends or shutdown begins.
async fn drain(request: SubscriptionRequest, stream: TickStream, cancel: CancellationToken) -> u64 {
    let mut chunks = stream.ready_chunks(DRAIN_CHUNK);
    let mut consumed: u64 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            chunk = chunks.next() => {
                let Some(chunk) = chunk else {
                    break;
                };
                let count = chunk.len() as u64;
                consumed += count;
                metrics::record_ticks_consumed(count);
            }
        }
    }

    tracing::debug!(subscription = %request, consumed, "Consumer finished");
    consumed
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &FeedConfig) {
    let symbols: Vec<&str> = config.symbols.iter().map(|s| s.as_str()).collect();
    tracing::info!(
        interval_ms = config.generator.interval.as_millis(),
        batch_size = config.generator.batch_size,
        quantity_min = config.generator.quantity_min,
        quantity_max = config.generator.quantity_max,
        base_price = %config.generator.base_price,
        warm_start_passes = config.generator.warm_start_passes,
        channel_capacity = config.aggregator.channel_capacity,
        health_port = config.server.health_port,
        symbols = ?symbols,
        "Configuration loaded"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
