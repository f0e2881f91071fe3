//! Aggregation Sink Port (Driven Port)
//!
//! Interface to the component that turns the raw tick firehose into
//! per-subscription streams.

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;

use crate::domain::market_data::{SubscriptionRequest, Tick};

/// Lazy, pull-based sequence of ticks for one subscription.
///
/// Ends once the subscription is removed from the sink and any buffered
/// ticks have been drained. It cannot be restarted.
pub type TickStream = Pin<Box<dyn Stream<Item = Tick> + Send>>;

/// Shared sink reference.
pub type SharedSink = Arc<dyn AggregationSink>;

/// Aggregation sink error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The subscription's buffer is full and the tick was dropped.
    #[error("subscription {request} is backlogged, tick dropped")]
    Backlogged {
        /// The backlogged subscription.
        request: String,
    },

    /// The sink cannot accept ticks.
    #[error("aggregation sink unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },
}

/// Notified by the sink whenever new data is available for a subscription.
pub trait NewDataObserver: Send + Sync {
    /// Called after a tick has been queued for `request`.
    fn on_new_data(&self, request: &SubscriptionRequest);
}

/// Observer that ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl NewDataObserver for NoOpObserver {
    fn on_new_data(&self, _request: &SubscriptionRequest) {}
}

/// Port for the aggregation/demultiplexing engine.
///
/// Implementations must accept `update` from the generator concurrently
/// with `add`/`remove` from subscriber threads.
pub trait AggregationSink: Send + Sync {
    /// Register a subscription and return its tick stream.
    ///
    /// Registering a request that is already present replaces the previous
    /// stream rather than creating a second one.
    fn add(&self, request: &SubscriptionRequest, observer: Arc<dyn NewDataObserver>)
    -> TickStream;

    /// Deregister a subscription. Unknown requests are ignored.
    fn remove(&self, request: &SubscriptionRequest);

    /// Ingest one raw tick for routing.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the tick could not be delivered to every
    /// matching subscription.
    fn update(&self, tick: Tick) -> Result<(), SinkError>;
}
