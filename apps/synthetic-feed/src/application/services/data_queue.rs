//! Synthetic Data Queue
//!
//! Public facade of the feed. Wires the symbol registry, the aggregation
//! sink and the tick generator together and exposes the
//! subscribe/unsubscribe/dispose lifecycle to consumers.

use std::sync::Arc;

use super::generator::{GENERATED_TICK_TYPE, GeneratorConfig, GeneratorStats, TickGenerator};
use crate::application::ports::{
    Clock, NewDataObserver, RandomSource, SharedSink, StdRandomSource, SystemClock, TickStream,
};
use crate::domain::market_data::{Symbol, SubscriptionRequest};
use crate::domain::subscription::SymbolRegistry;
use crate::infrastructure::metrics;

/// Snapshot of feed state.
#[derive(Debug, Clone, Default)]
pub struct FeedStats {
    /// Always `true` for the synthetic feed.
    pub connected: bool,
    /// Whether `dispose` has been called.
    pub disposed: bool,
    /// Symbols currently generated.
    pub subscribed_symbols: Vec<Symbol>,
    /// Generator counters.
    pub generator: GeneratorStats,
}

/// Synthetic market data feed.
///
/// Generation starts on construction. Ticks flow to every subscription
/// whose symbol is in the registry until the queue is disposed.
pub struct SyntheticDataQueue {
    registry: Arc<SymbolRegistry>,
    sink: SharedSink,
    generator: TickGenerator,
}

impl SyntheticDataQueue {
    /// Create a feed using the system clock and an entropy-seeded RNG.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn new(config: GeneratorConfig, sink: SharedSink) -> Self {
        Self::with_sources(
            config,
            sink,
            Arc::new(SystemClock),
            Box::new(StdRandomSource::from_entropy()),
        )
    }

    /// Create a feed with explicit time and randomness sources.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn with_sources(
        config: GeneratorConfig,
        sink: SharedSink,
        clock: Arc<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let registry = Arc::new(SymbolRegistry::new());
        let generator = TickGenerator::start(
            config,
            Arc::clone(&registry),
            Arc::clone(&sink),
            clock,
            random,
        );

        Self {
            registry,
            sink,
            generator,
        }
    }

    /// Subscribe to synthetic data for `request`.
    ///
    /// The sink registration happens before the symbol is added to the
    /// registry, so no generated tick can precede the stream.
    ///
    /// Only trades are generated. Any other tick type is rejected with a
    /// warning and gets a stream that ends immediately.
    pub fn subscribe(
        &self,
        request: &SubscriptionRequest,
        observer: Arc<dyn NewDataObserver>,
    ) -> TickStream {
        if request.tick_type != GENERATED_TICK_TYPE {
            tracing::warn!(
                subscription = %request,
                "Synthetic feed only generates trades, subscription ignored"
            );
            return Box::pin(futures::stream::empty());
        }

        let stream = self.sink.add(request, observer);
        let added = self.registry.subscribe(request.symbol.clone());
        metrics::set_subscribed_symbols(self.registry.len());

        tracing::info!(subscription = %request, new_symbol = added, "Subscribed");

        if self.generator.is_disposed() {
            tracing::debug!(subscription = %request, "Subscribed after dispose, stream will stay idle");
        }

        stream
    }

    /// Stop generating `request.symbol` and deregister the subscription.
    ///
    /// Requests for tick types that are never generated leave the registry
    /// untouched.
    pub fn unsubscribe(&self, request: &SubscriptionRequest) {
        if request.tick_type != GENERATED_TICK_TYPE {
            tracing::debug!(subscription = %request, "Unsubscribe for ungenerated tick type ignored");
            return;
        }

        let removed = self.registry.unsubscribe(&request.symbol);
        self.sink.remove(request);
        metrics::set_subscribed_symbols(self.registry.len());

        tracing::info!(subscription = %request, was_subscribed = removed, "Unsubscribed");
    }

    /// The synthetic feed is always connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        true
    }

    /// Stop generation. Idempotent.
    pub fn dispose(&self) {
        self.generator.dispose();
    }

    /// Stop generation and wait for any in-flight burst to finish.
    pub async fn shutdown(&self) {
        self.generator.shutdown().await;
    }

    /// Check whether `dispose` has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.generator.is_disposed()
    }

    /// Symbols currently generated.
    #[must_use]
    pub fn subscribed_symbols(&self) -> Vec<Symbol> {
        self.registry.snapshot()
    }

    /// Current feed state.
    #[must_use]
    pub fn stats(&self) -> FeedStats {
        let mut subscribed_symbols = self.registry.snapshot();
        subscribed_symbols.sort();

        FeedStats {
            connected: self.is_connected(),
            disposed: self.is_disposed(),
            subscribed_symbols,
            generator: self.generator.stats(),
        }
    }
}

impl Drop for SyntheticDataQueue {
    fn drop(&mut self) {
        self.dispose();
    }
}
