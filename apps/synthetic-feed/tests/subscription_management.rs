//! Subscription Management Integration Tests
//!
//! Tests registry and aggregation sink bookkeeping under concurrent
//! subscribe/unsubscribe, independent of generation timing.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use rust_decimal::Decimal;
use tokio_test::assert_ok;

use synthetic_feed::{
    AggregationSink, AggregatorConfig, ChannelAggregator, GeneratorConfig, NoOpObserver,
    SinkError, SubscriptionRequest, Symbol, SymbolRegistry, SyntheticDataQueue, Tick, TickType,
};

fn make_tick(symbol: &str) -> Tick {
    Tick {
        time: Utc::now(),
        symbol: Symbol::new(symbol),
        price: Decimal::TEN,
        tick_type: TickType::Trade,
        quantity: 10,
    }
}

fn idle_feed(aggregator: Arc<ChannelAggregator>) -> SyntheticDataQueue {
    let config = GeneratorConfig::new(Duration::from_secs(3_600), 1).with_warm_start_passes(0);
    SyntheticDataQueue::new(config, aggregator)
}

#[tokio::test]
async fn test_subscribe_registers_symbol_and_sink_entry() {
    let aggregator = Arc::new(ChannelAggregator::with_defaults());
    let feed = idle_feed(aggregator.clone());

    let _aaa = feed.subscribe(&SubscriptionRequest::trades("aaa"), Arc::new(NoOpObserver));
    let _bbb = feed.subscribe(&SubscriptionRequest::trades("BBB"), Arc::new(NoOpObserver));

    assert_eq!(
        feed.stats().subscribed_symbols,
        vec![Symbol::new("AAA"), Symbol::new("BBB")]
    );
    assert_eq!(aggregator.stats().subscriptions, 2);
}

#[tokio::test]
async fn test_only_trade_requests_drive_generation() {
    let aggregator = Arc::new(ChannelAggregator::with_defaults());
    let feed = idle_feed(aggregator.clone());

    let trades = SubscriptionRequest::trades("AAA");
    let quotes = SubscriptionRequest::new("AAA", TickType::Quote);
    let _t = feed.subscribe(&trades, Arc::new(NoOpObserver));
    let q = feed.subscribe(&quotes, Arc::new(NoOpObserver));

    assert!(q.collect::<Vec<_>>().await.is_empty());
    assert_eq!(aggregator.stats().subscriptions, 1);

    // Dropping the quote request leaves trade generation alone
    feed.unsubscribe(&quotes);
    assert_eq!(feed.subscribed_symbols(), vec![Symbol::new("AAA")]);
    assert_eq!(aggregator.stats().subscriptions, 1);

    feed.unsubscribe(&trades);
    assert!(feed.subscribed_symbols().is_empty());
    assert_eq!(aggregator.stats().subscriptions, 0);
}

#[tokio::test]
async fn test_unsubscribe_unknown_request() {
    let aggregator = Arc::new(ChannelAggregator::with_defaults());
    let feed = idle_feed(aggregator.clone());

    feed.unsubscribe(&SubscriptionRequest::trades("NOPE"));

    assert!(feed.subscribed_symbols().is_empty());
    assert_eq!(aggregator.stats().subscriptions, 0);
}

#[tokio::test]
async fn test_backlogged_subscriber_does_not_block_others() {
    let aggregator = ChannelAggregator::new(AggregatorConfig {
        channel_capacity: 4,
    });
    let _slow = aggregator.add(&SubscriptionRequest::trades("SLOW"), Arc::new(NoOpObserver));
    let mut fast = aggregator.add(&SubscriptionRequest::trades("FAST"), Arc::new(NoOpObserver));

    for _ in 0..4 {
        assert_ok!(aggregator.update(make_tick("SLOW")));
    }
    assert!(matches!(
        aggregator.update(make_tick("SLOW")),
        Err(SinkError::Backlogged { .. })
    ));

    assert_ok!(aggregator.update(make_tick("FAST")));
    assert_eq!(fast.next().await.unwrap().symbol.as_str(), "FAST");
    assert_eq!(aggregator.stats().ticks_dropped, 1);
}

#[test]
fn test_concurrent_registry_mutation_and_snapshots() {
    let registry = Arc::new(SymbolRegistry::new());

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..500 {
                    let symbol = Symbol::new(format!("S{w}_{}", i % 10));
                    registry.subscribe(symbol.clone());
                    if i % 3 == 0 {
                        registry.unsubscribe(&symbol);
                    }
                }
            })
        })
        .collect();

    let reader = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for _ in 0..500 {
                let mut snapshot = registry.snapshot();
                let len = snapshot.len();
                snapshot.sort();
                snapshot.dedup();
                assert_eq!(snapshot.len(), len);
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    reader.join().unwrap();

    assert!(registry.len() <= 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_subscribe_unsubscribe() {
    let aggregator = Arc::new(ChannelAggregator::with_defaults());
    let feed = Arc::new(idle_feed(aggregator.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let feed = Arc::clone(&feed);
            tokio::spawn(async move {
                let request = SubscriptionRequest::trades(format!("SYM{i}"));
                for _ in 0..50 {
                    let _stream = feed.subscribe(&request, Arc::new(NoOpObserver));
                    feed.unsubscribe(&request);
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert!(feed.subscribed_symbols().is_empty());
    assert_eq!(aggregator.stats().subscriptions, 0);
    feed.shutdown().await;
}
