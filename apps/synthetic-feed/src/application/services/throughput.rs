//! Throughput Reporter
//!
//! Derives the instantaneous tick production rate from the running tick
//! counter sampled once per timer firing. Purely diagnostic.

use chrono::{DateTime, Utc};

use crate::infrastructure::metrics;

/// One throughput measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputSample {
    /// Ticks produced since the previous sample.
    pub ticks: u64,
    /// Seconds elapsed since the previous sample.
    pub elapsed_secs: f64,
    /// Production rate over the interval.
    pub ticks_per_second: f64,
    /// When the sample was taken.
    pub taken_at: DateTime<Utc>,
}

/// Tracks the counter and time of the previous firing.
#[derive(Debug, Clone)]
pub struct ThroughputReporter {
    last_count: u64,
    last_time: DateTime<Utc>,
}

impl ThroughputReporter {
    /// Start measuring from the given counter value and time.
    #[must_use]
    pub const fn new(count: u64, now: DateTime<Utc>) -> Self {
        Self {
            last_count: count,
            last_time: now,
        }
    }

    /// Compute the rate since the previous call without logging.
    ///
    /// A non-positive elapsed time yields a rate of zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(&mut self, count: u64, now: DateTime<Utc>) -> ThroughputSample {
        let ticks = count.saturating_sub(self.last_count);
        let elapsed_secs = (now - self.last_time)
            .to_std()
            .map_or(0.0, |elapsed| elapsed.as_secs_f64());

        let ticks_per_second = if elapsed_secs > 0.0 {
            ticks as f64 / elapsed_secs
        } else {
            0.0
        };

        self.last_count = count;
        self.last_time = now;

        ThroughputSample {
            ticks,
            elapsed_secs,
            ticks_per_second,
            taken_at: now,
        }
    }

    /// Sample the rate and emit it as a log line and a gauge.
    pub fn report(&mut self, count: u64, now: DateTime<Utc>) -> ThroughputSample {
        let sample = self.sample(count, now);

        tracing::info!(
            ticks_per_second = sample.ticks_per_second.round(),
            ticks = sample.ticks,
            elapsed_secs = sample.elapsed_secs,
            "Tick throughput"
        );
        metrics::set_ticks_per_second(sample.ticks_per_second);

        sample
    }
}
