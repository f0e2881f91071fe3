//! Channel Aggregator
//!
//! In-process `AggregationSink` that fans the generator's tick firehose out
//! to one bounded tokio mpsc channel per subscription request.
//!
//! # Delivery
//!
//! Routing is by exact `(symbol, tick_type)` match. Sends never block the
//! generator: when a subscriber's buffer is full the tick is dropped and
//! `SinkError::Backlogged` is returned. Subscriptions whose stream has been
//! dropped are pruned on the next tick routed to them.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::AggregatorSettings;
use crate::application::ports::{AggregationSink, NewDataObserver, SinkError, TickStream};
use crate::domain::market_data::{SubscriptionRequest, Tick};
use crate::infrastructure::metrics;

// =============================================================================
// Configuration
// =============================================================================

/// Aggregator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Buffered ticks per subscription. Zero is treated as one.
    pub channel_capacity: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1_000_000,
        }
    }
}

impl From<AggregatorSettings> for AggregatorConfig {
    fn from(settings: AggregatorSettings) -> Self {
        Self {
            channel_capacity: settings.channel_capacity,
        }
    }
}

// =============================================================================
// Channel Aggregator
// =============================================================================

struct Subscription {
    id: Uuid,
    sender: mpsc::Sender<Tick>,
    observer: Arc<dyn NewDataObserver>,
}

/// Per-subscription channel fan-out.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use synthetic_feed::application::ports::{AggregationSink, NoOpObserver};
/// use synthetic_feed::domain::market_data::SubscriptionRequest;
/// use synthetic_feed::infrastructure::aggregator::ChannelAggregator;
///
/// let aggregator = ChannelAggregator::with_defaults();
/// let request = SubscriptionRequest::trades("SPY");
///
/// let _stream = aggregator.add(&request, Arc::new(NoOpObserver));
/// assert_eq!(aggregator.stats().subscriptions, 1);
///
/// aggregator.remove(&request);
/// assert_eq!(aggregator.stats().subscriptions, 0);
/// ```
pub struct ChannelAggregator {
    config: AggregatorConfig,
    subscriptions: RwLock<HashMap<SubscriptionRequest, Subscription>>,
    ticks_delivered: AtomicU64,
    ticks_dropped: AtomicU64,
}

impl ChannelAggregator {
    /// Create a new aggregator with the given configuration.
    #[must_use]
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            subscriptions: RwLock::new(HashMap::new()),
            ticks_delivered: AtomicU64::new(0),
            ticks_dropped: AtomicU64::new(0),
        }
    }

    /// Create a new aggregator with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(AggregatorConfig::default())
    }

    /// Get the id assigned to a registered request.
    #[must_use]
    pub fn subscription_id(&self, request: &SubscriptionRequest) -> Option<Uuid> {
        self.subscriptions.read().get(request).map(|sub| sub.id)
    }

    /// Get delivery statistics.
    #[must_use]
    pub fn stats(&self) -> AggregatorStats {
        AggregatorStats {
            subscriptions: self.subscriptions.read().len(),
            ticks_delivered: self.ticks_delivered.load(Ordering::Relaxed),
            ticks_dropped: self.ticks_dropped.load(Ordering::Relaxed),
        }
    }

    /// Drop a subscription whose receiver has gone away.
    ///
    /// Only removes the entry if it is still the one that failed, so a
    /// concurrent re-add is left intact.
    fn prune(&self, request: &SubscriptionRequest, id: Uuid) {
        let mut subscriptions = self.subscriptions.write();
        if subscriptions.get(request).is_some_and(|sub| sub.id == id) {
            subscriptions.remove(request);
            metrics::set_sink_subscriptions(subscriptions.len());
            tracing::debug!(subscription = %request, id = %id, "Pruned closed subscription");
        }
    }
}

impl AggregationSink for ChannelAggregator {
    fn add(&self, request: &SubscriptionRequest, observer: Arc<dyn NewDataObserver>) -> TickStream {
        let (sender, receiver) = mpsc::channel(self.config.channel_capacity.max(1));
        let id = Uuid::new_v4();

        let mut subscriptions = self.subscriptions.write();
        let replaced = subscriptions
            .insert(
                request.clone(),
                Subscription {
                    id,
                    sender,
                    observer,
                },
            )
            .is_some();
        metrics::set_sink_subscriptions(subscriptions.len());
        drop(subscriptions);

        tracing::debug!(subscription = %request, id = %id, replaced, "Subscription registered");

        Box::pin(ReceiverStream::new(receiver))
    }

    fn remove(&self, request: &SubscriptionRequest) {
        let mut subscriptions = self.subscriptions.write();
        let removed = subscriptions.remove(request);
        metrics::set_sink_subscriptions(subscriptions.len());
        drop(subscriptions);

        if let Some(sub) = removed {
            tracing::debug!(subscription = %request, id = %sub.id, "Subscription removed");
        }
    }

    fn update(&self, tick: Tick) -> Result<(), SinkError> {
        let request = SubscriptionRequest::new(tick.symbol.clone(), tick.tick_type);
        let tick_type = tick.tick_type;

        // Observers may re-enter the sink, so nothing below runs under the lock.
        let (id, sender, observer) = {
            let subscriptions = self.subscriptions.read();
            let Some(sub) = subscriptions.get(&request) else {
                return Ok(());
            };
            (sub.id, sub.sender.clone(), Arc::clone(&sub.observer))
        };

        match sender.try_send(tick) {
            Ok(()) => {
                self.ticks_delivered.fetch_add(1, Ordering::Relaxed);
                observer.on_new_data(&request);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.ticks_dropped.fetch_add(1, Ordering::Relaxed);
                metrics::record_ticks_dropped(tick_type, 1);
                Err(SinkError::Backlogged {
                    request: request.to_string(),
                })
            }
            Err(TrySendError::Closed(_)) => {
                self.prune(&request, id);
                Ok(())
            }
        }
    }
}

/// Shared aggregator reference.
pub type SharedAggregator = Arc<ChannelAggregator>;

/// Aggregator delivery statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatorStats {
    /// Registered subscriptions.
    pub subscriptions: usize,
    /// Ticks queued to a subscriber.
    pub ticks_delivered: u64,
    /// Ticks dropped because a subscriber was backlogged.
    pub ticks_dropped: u64,
}

// =============================================================================
// Tests
// =============================================================================
