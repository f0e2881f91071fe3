//! Tick Generator
//!
//! Drives periodic bulk synthesis. On start it runs a few warm-start passes,
//! then arms a recurring timer. Each firing reports throughput, snapshots
//! the symbol registry and pushes `batch_size` synthetic ticks per symbol
//! into the aggregation sink.
//!
//! # Bursts are not preemptible
//!
//! Cancellation is observed between cycles only. Disposing the generator
//! while a burst is running lets that burst finish; the timer then exits
//! without firing again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Timelike, Utc};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::throughput::{ThroughputReporter, ThroughputSample};
use crate::application::ports::{Clock, RandomSource, SharedSink};
use crate::domain::market_data::{Symbol, Tick, TickType};
use crate::domain::subscription::SymbolRegistry;
use crate::infrastructure::metrics;

/// Kind of tick the generator produces.
pub const GENERATED_TICK_TYPE: TickType = TickType::Trade;

/// Default lower bound for synthetic quantities.
pub const DEFAULT_QUANTITY_MIN: u64 = 10;

// =============================================================================
// Configuration
// =============================================================================

/// Inclusive bounds for synthetic tick quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityRange {
    /// Smallest quantity.
    pub min: u64,
    /// Largest quantity.
    pub max: u64,
}

impl QuantityRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Default range for a generation interval: `[10, interval_ms - 1]`.
    ///
    /// The upper bound never falls below the lower bound.
    #[must_use]
    pub fn for_interval(interval: Duration) -> Self {
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        Self {
            min: DEFAULT_QUANTITY_MIN,
            max: interval_ms.saturating_sub(1).max(DEFAULT_QUANTITY_MIN),
        }
    }

    /// Check whether the bounds are ordered.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

/// Configuration for tick generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Timer period between generation cycles.
    pub interval: Duration,
    /// Ticks synthesized per symbol per cycle.
    pub batch_size: usize,
    /// Bounds for synthetic quantities.
    pub quantity_range: QuantityRange,
    /// Lower bound of the synthetic price band.
    pub base_price: Decimal,
    /// Synthesis passes run immediately on start, before the timer is armed.
    pub warm_start_passes: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 500_000)
    }
}

impl GeneratorConfig {
    /// Create a configuration with the given interval and batch size.
    ///
    /// The quantity range is derived from the interval.
    #[must_use]
    pub fn new(interval: Duration, batch_size: usize) -> Self {
        Self {
            interval,
            batch_size,
            quantity_range: QuantityRange::for_interval(interval),
            base_price: Decimal::TEN,
            warm_start_passes: 4,
        }
    }

    /// Create configuration from `GeneratorSettings`.
    #[must_use]
    pub fn from_settings(settings: &crate::GeneratorSettings) -> Self {
        Self {
            interval: settings.interval,
            batch_size: settings.batch_size,
            quantity_range: QuantityRange::new(settings.quantity_min, settings.quantity_max),
            base_price: settings.base_price,
            warm_start_passes: settings.warm_start_passes,
        }
    }

    /// Set the quantity range.
    #[must_use]
    pub const fn with_quantity_range(mut self, range: QuantityRange) -> Self {
        self.quantity_range = range;
        self
    }

    /// Set the base price.
    #[must_use]
    pub const fn with_base_price(mut self, base_price: Decimal) -> Self {
        self.base_price = base_price;
        self
    }

    /// Set the number of warm-start passes.
    #[must_use]
    pub const fn with_warm_start_passes(mut self, passes: u32) -> Self {
        self.warm_start_passes = passes;
        self
    }
}

// =============================================================================
// Price Function
// =============================================================================

/// Synthetic price at `now`: `base + |sin(minutes since midnight)|`.
///
/// Varies continuously with the time of day and always lies within
/// `[base, base + 1]`.
#[must_use]
pub fn synthetic_price(base: Decimal, now: DateTime<Utc>) -> Decimal {
    let time = now.time();
    let minutes = f64::from(time.num_seconds_from_midnight()) / 60.0
        + f64::from(time.nanosecond()) / 60_000_000_000.0;

    let offset = Decimal::try_from(minutes.sin().abs())
        .unwrap_or(Decimal::ZERO)
        .round_dp(6);

    base + offset
}

// =============================================================================
// Statistics
// =============================================================================

/// Outcome of one generation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Symbols in the cycle's snapshot.
    pub symbols: usize,
    /// Ticks synthesized.
    pub generated: u64,
    /// Ticks the sink rejected.
    pub failed: u64,
    /// Wall time spent in the cycle.
    pub duration: Duration,
}

/// Generator counters.
#[derive(Debug, Clone, Default)]
pub struct GeneratorStats {
    /// Total ticks synthesized.
    pub ticks_generated: u64,
    /// Total ticks the sink rejected.
    pub sink_failures: u64,
    /// Completed generation cycles, warm-start passes included.
    pub cycles_completed: u64,
    /// Most recent throughput measurement.
    pub last_throughput: Option<ThroughputSample>,
    /// Whether the timer is still armed.
    pub running: bool,
}

// =============================================================================
// Synthesizer
// =============================================================================

/// State shared between the timer task and the burst workers.
struct Synthesizer {
    config: GeneratorConfig,
    registry: Arc<SymbolRegistry>,
    sink: SharedSink,
    clock: Arc<dyn Clock>,
    random: Mutex<Box<dyn RandomSource>>,
    ticks_generated: AtomicU64,
    sink_failures: AtomicU64,
    cycles_completed: AtomicU64,
    last_throughput: RwLock<Option<ThroughputSample>>,
}

impl Synthesizer {
    fn ticks_generated(&self) -> u64 {
        self.ticks_generated.load(Ordering::Relaxed)
    }

    /// Run one full burst over a fresh registry snapshot.
    fn run_cycle(&self) -> CycleSummary {
        let started = Instant::now();
        let symbols = self.registry.snapshot();
        let mut summary = CycleSummary {
            symbols: symbols.len(),
            ..CycleSummary::default()
        };

        if !symbols.is_empty() {
            let mut random = self.random.lock();
            for symbol in &symbols {
                let (generated, failed) = self.synthesize_batch(symbol, random.as_mut());
                summary.generated += generated;
                summary.failed += failed;
            }
        }

        summary.duration = started.elapsed();
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
        metrics::record_cycle(&summary);

        if summary.failed > 0 {
            tracing::warn!(
                symbols = summary.symbols,
                generated = summary.generated,
                failed = summary.failed,
                "Sink rejected ticks during generation cycle"
            );
        } else {
            tracing::debug!(
                symbols = summary.symbols,
                generated = summary.generated,
                duration_ms = summary.duration.as_millis(),
                "Generation cycle complete"
            );
        }

        summary
    }

    /// Synthesize one symbol's batch, forwarding each tick as it is made.
    ///
    /// Returns `(generated, failed)`.
    fn synthesize_batch(&self, symbol: &Symbol, random: &mut dyn RandomSource) -> (u64, u64) {
        let range = self.config.quantity_range;
        let mut generated = 0;
        let mut failed = 0;

        for _ in 0..self.config.batch_size {
            let now = self.clock.now();
            let tick = Tick {
                time: now,
                symbol: symbol.clone(),
                price: synthetic_price(self.config.base_price, now),
                tick_type: GENERATED_TICK_TYPE,
                quantity: random.next_in_range(range.min, range.max),
            };

            if let Err(e) = self.sink.update(tick) {
                failed += 1;
                self.sink_failures.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(symbol = %symbol, error = %e, "Tick not accepted by sink");
            }

            generated += 1;
            self.ticks_generated.fetch_add(1, Ordering::Relaxed);
        }

        (generated, failed)
    }
}

// =============================================================================
// Tick Generator
// =============================================================================

/// Periodic synthetic tick producer.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use synthetic_feed::application::ports::{StdRandomSource, SystemClock};
/// use synthetic_feed::application::services::{GeneratorConfig, TickGenerator};
/// use synthetic_feed::domain::subscription::SymbolRegistry;
/// use synthetic_feed::infrastructure::aggregator::ChannelAggregator;
///
/// async fn example() {
///     let registry = Arc::new(SymbolRegistry::new());
///     let generator = TickGenerator::start(
///         GeneratorConfig::new(Duration::from_millis(100), 1_000),
///         Arc::clone(&registry),
///         Arc::new(ChannelAggregator::with_defaults()),
///         Arc::new(SystemClock),
///         Box::new(StdRandomSource::from_entropy()),
///     );
///
///     // ... subscribe symbols through the registry and the sink ...
///
///     generator.shutdown().await;
/// }
/// ```
pub struct TickGenerator {
    core: Arc<Synthesizer>,
    cancel: CancellationToken,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl TickGenerator {
    /// Run the warm-start passes and arm the recurring timer.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn start(
        config: GeneratorConfig,
        registry: Arc<SymbolRegistry>,
        sink: SharedSink,
        clock: Arc<dyn Clock>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        let warm_start_passes = config.warm_start_passes;
        let interval = config.interval;
        let batch_size = config.batch_size;

        let core = Arc::new(Synthesizer {
            config,
            registry,
            sink,
            clock,
            random: Mutex::new(random),
            ticks_generated: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            cycles_completed: AtomicU64::new(0),
            last_throughput: RwLock::new(None),
        });

        for _ in 0..warm_start_passes {
            core.run_cycle();
        }

        let cancel = CancellationToken::new();
        let timer = tokio::spawn(run_timer(Arc::clone(&core), cancel.clone()));

        tracing::info!(
            interval_ms = interval.as_millis(),
            batch_size,
            warm_start_passes,
            "Tick generator started"
        );

        Self {
            core,
            cancel,
            timer: Mutex::new(Some(timer)),
        }
    }

    /// Stop the timer.
    ///
    /// Idempotent. An in-flight burst is allowed to finish.
    pub fn dispose(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        tracing::info!("Tick generator disposed");
    }

    /// Dispose and wait for the timer task to exit.
    pub async fn shutdown(&self) {
        self.dispose();

        let timer = self.timer.lock().take();
        if let Some(timer) = timer {
            if let Err(e) = timer.await {
                tracing::error!(error = %e, "Tick generator timer task failed");
            }
        }
    }

    /// Check whether `dispose` has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Check whether the timer task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer
            .lock()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Get generator counters.
    #[must_use]
    pub fn stats(&self) -> GeneratorStats {
        GeneratorStats {
            ticks_generated: self.core.ticks_generated(),
            sink_failures: self.core.sink_failures.load(Ordering::Relaxed),
            cycles_completed: self.core.cycles_completed.load(Ordering::Relaxed),
            last_throughput: *self.core.last_throughput.read(),
            running: self.is_running(),
        }
    }

    /// Get the active configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.core.config
    }
}

impl Drop for TickGenerator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Timer loop: report throughput, then run one burst on the blocking pool.
async fn run_timer(core: Arc<Synthesizer>, cancel: CancellationToken) {
    let period = core.config.interval;
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut reporter = ThroughputReporter::new(core.ticks_generated(), core.clock.now());

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("Tick generator timer cancelled");
                break;
            }
            _ = interval.tick() => {
                let sample = reporter.report(core.ticks_generated(), core.clock.now());
                *core.last_throughput.write() = Some(sample);

                let burst = Arc::clone(&core);
                if let Err(e) = tokio::task::spawn_blocking(move || burst.run_cycle()).await {
                    tracing::error!(error = %e, "Generation cycle aborted");
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use chrono::{NaiveDate, TimeDelta};
    use mockall::mock;
    use proptest::prelude::*;

    use super::*;
    use crate::application::ports::{
        AggregationSink, NewDataObserver, SinkError, StdRandomSource, TickStream,
    };
    use crate::domain::market_data::SubscriptionRequest;

    mock! {
        pub Sink {}

        impl AggregationSink for Sink {
            fn add(
                &self,
                request: &SubscriptionRequest,
                observer: Arc<dyn NewDataObserver>,
            ) -> TickStream;
            fn remove(&self, request: &SubscriptionRequest);
            fn update(&self, tick: Tick) -> Result<(), SinkError>;
        }
    }

    /// Clock that advances a fixed step on every reading.
    struct SteppingClock {
        start: DateTime<Utc>,
        step: TimeDelta,
        readings: AtomicU64,
    }

    impl SteppingClock {
        fn new(start: DateTime<Utc>, step: TimeDelta) -> Self {
            Self {
                start,
                step,
                readings: AtomicU64::new(0),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let n = self.readings.fetch_add(1, Ordering::Relaxed);
            self.start + self.step * i32::try_from(n).unwrap()
        }
    }

    /// Random source that always returns the upper bound.
    struct MaxRandom;

    impl RandomSource for MaxRandom {
        fn next_in_range(&mut self, _low: u64, high: u64) -> u64 {
            high
        }
    }

    /// Sink that records every tick it receives.
    #[derive(Default)]
    struct RecordingSink {
        ticks: Mutex<Vec<Tick>>,
    }

    impl AggregationSink for RecordingSink {
        fn add(&self, _request: &SubscriptionRequest, _observer: Arc<dyn NewDataObserver>) -> TickStream {
            Box::pin(futures::stream::empty())
        }

        fn remove(&self, _request: &SubscriptionRequest) {}

        fn update(&self, tick: Tick) -> Result<(), SinkError> {
            self.ticks.lock().push(tick);
            Ok(())
        }
    }

    fn midnight() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn registry_with(symbols: &[&str]) -> Arc<SymbolRegistry> {
        let registry = Arc::new(SymbolRegistry::new());
        for symbol in symbols {
            registry.subscribe(Symbol::new(symbol));
        }
        registry
    }

    fn quiet_config(batch_size: usize) -> GeneratorConfig {
        GeneratorConfig::new(Duration::from_secs(3_600), batch_size).with_warm_start_passes(0)
    }

    #[test]
    fn default_config_values() {
        let config = GeneratorConfig::default();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.batch_size, 500_000);
        assert_eq!(config.quantity_range, QuantityRange::new(10, 999));
        assert_eq!(config.base_price, Decimal::TEN);
        assert_eq!(config.warm_start_passes, 4);
    }

    #[test]
    fn quantity_range_tracks_interval() {
        assert_eq!(
            QuantityRange::for_interval(Duration::from_millis(250)),
            QuantityRange::new(10, 249)
        );
        // Never inverted for tiny intervals
        assert_eq!(
            QuantityRange::for_interval(Duration::from_millis(5)),
            QuantityRange::new(10, 10)
        );
        assert!(!QuantityRange::new(5, 4).is_valid());
    }

    #[test]
    fn price_at_midnight_is_base() {
        assert_eq!(synthetic_price(Decimal::TEN, midnight()), Decimal::TEN);
    }

    #[test]
    fn price_follows_sine_of_minutes() {
        // 90 seconds past midnight = 1.5 minutes; sin(1.5) ≈ 0.997495
        let price = synthetic_price(Decimal::TEN, midnight() + TimeDelta::seconds(90));
        assert_eq!(price, Decimal::new(10_997_495, 6));
    }

    proptest! {
        #[test]
        fn price_stays_within_band(secs in 0i64..86_400, nanos in 0i64..1_000_000_000) {
            let now = midnight() + TimeDelta::seconds(secs) + TimeDelta::nanoseconds(nanos);
            let price = synthetic_price(Decimal::TEN, now);

            prop_assert!(price >= Decimal::TEN);
            prop_assert!(price <= Decimal::from(11));
        }
    }

    #[tokio::test]
    async fn cycle_emits_batch_per_symbol() {
        let sink = Arc::new(RecordingSink::default());
        let generator = TickGenerator::start(
            quiet_config(25),
            registry_with(&["AAA", "BBB"]),
            sink.clone(),
            Arc::new(SteppingClock::new(midnight(), TimeDelta::milliseconds(1))),
            Box::new(StdRandomSource::seeded(1)),
        );

        let summary = generator.core.run_cycle();

        assert_eq!(summary.symbols, 2);
        assert_eq!(summary.generated, 50);
        assert_eq!(summary.failed, 0);

        let ticks = sink.ticks.lock();
        assert_eq!(ticks.iter().filter(|t| t.symbol.as_str() == "AAA").count(), 25);
        assert_eq!(ticks.iter().filter(|t| t.symbol.as_str() == "BBB").count(), 25);
        assert!(ticks.iter().all(|t| t.tick_type == TickType::Trade));
    }

    #[tokio::test]
    async fn ticks_are_timestamped_individually_in_order() {
        let sink = Arc::new(RecordingSink::default());
        let generator = TickGenerator::start(
            quiet_config(10),
            registry_with(&["AAA"]),
            sink.clone(),
            Arc::new(SteppingClock::new(midnight(), TimeDelta::seconds(7))),
            Box::new(StdRandomSource::seeded(1)),
        );

        generator.core.run_cycle();

        let ticks = sink.ticks.lock();
        assert!(ticks.windows(2).all(|w| w[0].time < w[1].time));
        // Each price is computed from its own timestamp
        for tick in ticks.iter() {
            assert_eq!(tick.price, synthetic_price(Decimal::TEN, tick.time));
        }
    }

    #[tokio::test]
    async fn quantity_uses_configured_range_and_random_source() {
        let sink = Arc::new(RecordingSink::default());
        let config = quiet_config(5).with_quantity_range(QuantityRange::new(10, 42));
        let generator = TickGenerator::start(
            config,
            registry_with(&["AAA"]),
            sink.clone(),
            Arc::new(SteppingClock::new(midnight(), TimeDelta::milliseconds(1))),
            Box::new(MaxRandom),
        );

        generator.core.run_cycle();

        assert!(sink.ticks.lock().iter().all(|t| t.quantity == 42));
    }

    #[tokio::test]
    async fn sink_failures_do_not_abort_cycle() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut sink = MockSink::new();
        sink.expect_update().times(20).returning(move |_| {
            // Reject every other tick
            if counter.fetch_add(1, Ordering::Relaxed) % 2 == 0 {
                Err(SinkError::Backlogged {
                    request: "AAA:trade".to_string(),
                })
            } else {
                Ok(())
            }
        });

        let generator = TickGenerator::start(
            quiet_config(10),
            registry_with(&["AAA", "BBB"]),
            Arc::new(sink),
            Arc::new(SteppingClock::new(midnight(), TimeDelta::milliseconds(1))),
            Box::new(StdRandomSource::seeded(1)),
        );

        let summary = generator.core.run_cycle();

        assert_eq!(calls.load(Ordering::Relaxed), 20);
        assert_eq!(summary.generated, 20);
        assert_eq!(summary.failed, 10);

        let stats = generator.stats();
        assert_eq!(stats.ticks_generated, 20);
        assert_eq!(stats.sink_failures, 10);
    }

    #[tokio::test]
    async fn empty_registry_generates_nothing() {
        let mut sink = MockSink::new();
        sink.expect_update().never();

        let generator = TickGenerator::start(
            quiet_config(10),
            Arc::new(SymbolRegistry::new()),
            Arc::new(sink),
            Arc::new(SteppingClock::new(midnight(), TimeDelta::milliseconds(1))),
            Box::new(StdRandomSource::seeded(1)),
        );

        let summary = generator.core.run_cycle();

        assert_eq!(summary.symbols, 0);
        assert_eq!(summary.generated, 0);
    }

    #[tokio::test]
    async fn warm_start_runs_before_timer() {
        let sink = Arc::new(RecordingSink::default());
        let config = quiet_config(3).with_warm_start_passes(4);

        let generator = TickGenerator::start(
            config,
            registry_with(&["AAA"]),
            sink.clone(),
            Arc::new(SteppingClock::new(midnight(), TimeDelta::milliseconds(1))),
            Box::new(StdRandomSource::seeded(1)),
        );

        // Timer interval is an hour, so everything came from warm start
        assert_eq!(sink.ticks.lock().len(), 12);
        assert_eq!(generator.stats().cycles_completed, 4);
    }

    #[tokio::test]
    async fn snapshot_taken_at_cycle_start() {
        let registry = registry_with(&["AAA"]);
        let sink = Arc::new(RecordingSink::default());
        let generator = TickGenerator::start(
            quiet_config(5),
            Arc::clone(&registry),
            sink.clone(),
            Arc::new(SteppingClock::new(midnight(), TimeDelta::milliseconds(1))),
            Box::new(StdRandomSource::seeded(1)),
        );

        generator.core.run_cycle();
        registry.unsubscribe(&Symbol::new("AAA"));
        registry.subscribe(Symbol::new("BBB"));
        generator.core.run_cycle();

        let ticks = sink.ticks.lock();
        assert_eq!(ticks.len(), 10);
        assert!(ticks[..5].iter().all(|t| t.symbol.as_str() == "AAA"));
        assert!(ticks[5..].iter().all(|t| t.symbol.as_str() == "BBB"));
    }

    #[tokio::test]
    async fn timer_fires_and_reports_throughput() {
        let sink = Arc::new(RecordingSink::default());
        let generator = TickGenerator::start(
            GeneratorConfig::new(Duration::from_millis(30), 4).with_warm_start_passes(0),
            registry_with(&["AAA"]),
            sink.clone(),
            Arc::new(crate::application::ports::SystemClock),
            Box::new(StdRandomSource::seeded(1)),
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        generator.shutdown().await;

        let stats = generator.stats();
        assert!(stats.cycles_completed >= 2);
        assert!(stats.last_throughput.is_some());
        assert_eq!(stats.ticks_generated, sink.ticks.lock().len() as u64);
    }

    #[tokio::test]
    async fn dispose_is_idempotent_and_stops_timer() {
        let generator = TickGenerator::start(
            GeneratorConfig::new(Duration::from_millis(20), 1).with_warm_start_passes(0),
            registry_with(&["AAA"]),
            Arc::new(RecordingSink::default()),
            Arc::new(crate::application::ports::SystemClock),
            Box::new(StdRandomSource::seeded(1)),
        );

        assert!(generator.is_running());

        generator.dispose();
        generator.dispose();
        assert!(generator.is_disposed());

        generator.shutdown().await;
        assert!(!generator.is_running());

        // Calling again after the timer is gone is still fine
        generator.dispose();
        generator.shutdown().await;
        assert!(!generator.is_running());
    }

    #[tokio::test]
    async fn no_cycles_after_shutdown() {
        let generator = TickGenerator::start(
            GeneratorConfig::new(Duration::from_millis(10), 1).with_warm_start_passes(0),
            registry_with(&["AAA"]),
            Arc::new(RecordingSink::default()),
            Arc::new(crate::application::ports::SystemClock),
            Box::new(StdRandomSource::seeded(1)),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        generator.shutdown().await;
        let cycles = generator.stats().cycles_completed;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(generator.stats().cycles_completed, cycles);
    }
}
