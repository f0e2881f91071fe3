#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::cast_possible_truncation,
        clippy::items_after_statements
    )
)]

//! Synthetic Feed - Fake Market Data Generator
//!
//! A live-data-feed stand-in that fabricates tick data for subscribed
//! symbols at a high, configurable rate. Used to load-test downstream
//! consumers and to exercise the subscribe/unsubscribe/dispose lifecycle
//! without a real exchange connection.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core types with no I/O
//!   - `market_data`: Symbols, tick kinds, subscription requests, ticks
//!   - `subscription`: Thread-safe registry of generated symbols
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: Aggregation sink, clock and random source interfaces
//!   - `services`: Tick generator, throughput reporter, data queue facade
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `aggregator`: Channel-based per-subscription fan-out
//!   - `config`: Environment configuration
//!   - `health`: Health check HTTP endpoint
//!   - `metrics`: Prometheus instrumentation
//!   - `telemetry`: Tracing and OpenTelemetry
//!
//! # Data Flow
//!
//! ```text
//!                  ┌─────────────┐     ┌──────────────┐
//!  Timer ─────────►│    Tick     │────►│   Channel    │──► Stream AAA:trade
//!  (interval)      │  Generator  │     │  Aggregator  │──► Stream BBB:trade
//!                  └──────┬──────┘     └──────────────┘──► Stream N
//!                         │ snapshot
//!                  ┌──────┴──────┐
//!                  │   Symbol    │◄──── subscribe / unsubscribe
//!                  │  Registry   │
//!                  └─────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core market data types with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::market_data::{Symbol, SubscriptionRequest, Tick, TickType};
pub use domain::subscription::SymbolRegistry;

// Ports
pub use application::ports::{
    AggregationSink, Clock, NewDataObserver, NoOpObserver, RandomSource, SharedSink, SinkError,
    StdRandomSource, SystemClock, TickStream,
};

// Services
pub use application::services::{
    FeedStats, GeneratorConfig, GeneratorStats, QuantityRange, SyntheticDataQueue, TickGenerator,
};

// Infrastructure config
pub use infrastructure::config::{
    AggregatorSettings, ConfigError, FeedConfig, GeneratorSettings, ServerSettings,
};

// Aggregation sink
pub use infrastructure::aggregator::{
    AggregatorConfig, AggregatorStats, ChannelAggregator, SharedAggregator,
};

// Health server
pub use infrastructure::health::{HealthServer, HealthServerError, HealthServerState};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
