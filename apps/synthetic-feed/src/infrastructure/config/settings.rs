//! Feed Configuration Settings
//!
//! Configuration types for the synthetic feed, loaded from environment
//! variables. Every value has a default; unparseable values fall back to it.

use std::collections::HashSet;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::market_data::Symbol;

/// Generation timing and shape settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Timer period between generation cycles.
    pub interval: Duration,
    /// Ticks synthesized per symbol per cycle.
    pub batch_size: usize,
    /// Smallest synthetic quantity (inclusive).
    pub quantity_min: u64,
    /// Largest synthetic quantity (inclusive).
    pub quantity_max: u64,
    /// Lower bound of the synthetic price band.
    pub base_price: Decimal,
    /// Synthesis passes run before the timer is armed.
    pub warm_start_passes: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            batch_size: 500_000,
            quantity_min: 10,
            quantity_max: 999,
            base_price: Decimal::TEN,
            warm_start_passes: 4,
        }
    }
}

/// Aggregation sink settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorSettings {
    /// Buffered ticks per subscription before new ticks are dropped.
    pub channel_capacity: usize,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 1_000_000,
        }
    }
}

/// Server port settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Health check HTTP port.
    pub health_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { health_port: 8083 }
    }
}

/// Complete feed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Generation settings.
    pub generator: GeneratorSettings,
    /// Aggregation sink settings.
    pub aggregator: AggregatorSettings,
    /// Server port settings.
    pub server: ServerSettings,
    /// Symbols subscribed at startup.
    pub symbols: Vec<Symbol>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorSettings::default(),
            aggregator: AggregatorSettings::default(),
            server: ServerSettings::default(),
            symbols: vec![Symbol::new("SPY")],
        }
    }
}

impl FeedConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GeneratorSettings::default();

        let interval = parse_env_duration_millis(&lookup, "SYNTHETIC_FEED_INTERVAL_MS", defaults.interval);

        // The quantity ceiling follows the interval unless set explicitly
        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        let quantity_max_default = interval_ms.saturating_sub(1).max(defaults.quantity_min);

        let generator = GeneratorSettings {
            interval,
            batch_size: parse_env_usize(&lookup, "SYNTHETIC_FEED_BATCH_SIZE", defaults.batch_size),
            quantity_min: parse_env_u64(&lookup, "SYNTHETIC_FEED_QUANTITY_MIN", defaults.quantity_min),
            quantity_max: parse_env_u64(&lookup, "SYNTHETIC_FEED_QUANTITY_MAX", quantity_max_default),
            base_price: parse_env_decimal(&lookup, "SYNTHETIC_FEED_BASE_PRICE", defaults.base_price),
            warm_start_passes: parse_env_u32(
                &lookup,
                "SYNTHETIC_FEED_WARM_START_PASSES",
                defaults.warm_start_passes,
            ),
        };

        let aggregator = AggregatorSettings {
            channel_capacity: parse_env_usize(
                &lookup,
                "SYNTHETIC_FEED_CHANNEL_CAPACITY",
                AggregatorSettings::default().channel_capacity,
            ),
        };

        let server = ServerSettings {
            health_port: parse_env_u16(
                &lookup,
                "SYNTHETIC_FEED_HEALTH_PORT",
                ServerSettings::default().health_port,
            ),
        };

        let symbols = lookup("SYNTHETIC_FEED_SYMBOLS")
            .map_or_else(|| FeedConfig::default().symbols, |raw| parse_symbols(&raw));

        let config = Self {
            generator,
            aggregator,
            server,
            symbols,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check that the configuration can drive a generator.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator.interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "SYNTHETIC_FEED_INTERVAL_MS".to_string(),
                reason: "interval must be positive".to_string(),
            });
        }

        if self.generator.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SYNTHETIC_FEED_BATCH_SIZE".to_string(),
                reason: "batch size must be positive".to_string(),
            });
        }

        if self.generator.quantity_min > self.generator.quantity_max {
            return Err(ConfigError::InvalidQuantityRange {
                min: self.generator.quantity_min,
                max: self.generator.quantity_max,
            });
        }

        if self.aggregator.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SYNTHETIC_FEED_CHANNEL_CAPACITY".to_string(),
                reason: "channel capacity must be positive".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A setting has an unusable value.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Environment variable name.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// Quantity bounds are inverted.
    #[error("quantity range is empty: min {min} exceeds max {max}")]
    InvalidQuantityRange {
        /// Configured minimum.
        min: u64,
        /// Configured maximum.
        max: u64,
    },
}

/// Parse a comma-separated symbol list, keeping first occurrences in order.
fn parse_symbols(raw: &str) -> Vec<Symbol> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Symbol::new)
        .filter(|symbol| seen.insert(symbol.clone()))
        .collect()
}

fn parse_env_u16<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: u16) -> u16 {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_env_u32<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: u32) -> u32 {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_env_u64<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_env_usize<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, default: usize) -> usize {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_env_decimal<F: Fn(&str) -> Option<String>>(
    lookup: &F,
    key: &str,
    default: Decimal,
) -> Decimal {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_millis<F: Fn(&str) -> Option<String>>(
    lookup: &F,
    key: &str,
    default: Duration,
) -> Duration {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use test_case::test_case;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = FeedConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, FeedConfig::default());
    }

    #[test]
    fn generator_settings_defaults() {
        let settings = GeneratorSettings::default();
        assert_eq!(settings.interval, Duration::from_secs(1));
        assert_eq!(settings.batch_size, 500_000);
        assert_eq!(settings.quantity_min, 10);
        assert_eq!(settings.quantity_max, 999);
        assert_eq!(settings.base_price, Decimal::TEN);
        assert_eq!(settings.warm_start_passes, 4);
    }

    #[test]
    fn server_settings_defaults() {
        assert_eq!(ServerSettings::default().health_port, 8083);
        assert_eq!(AggregatorSettings::default().channel_capacity, 1_000_000);
    }

    #[test]
    fn overrides_are_applied() {
        let config = FeedConfig::from_lookup(lookup_from(&[
            ("SYNTHETIC_FEED_INTERVAL_MS", "250"),
            ("SYNTHETIC_FEED_BATCH_SIZE", "1000"),
            ("SYNTHETIC_FEED_QUANTITY_MIN", "1"),
            ("SYNTHETIC_FEED_QUANTITY_MAX", "5"),
            ("SYNTHETIC_FEED_BASE_PRICE", "42.5"),
            ("SYNTHETIC_FEED_WARM_START_PASSES", "0"),
            ("SYNTHETIC_FEED_CHANNEL_CAPACITY", "64"),
            ("SYNTHETIC_FEED_HEALTH_PORT", "9000"),
        ]))
        .unwrap();

        assert_eq!(config.generator.interval, Duration::from_millis(250));
        assert_eq!(config.generator.batch_size, 1_000);
        assert_eq!(config.generator.quantity_min, 1);
        assert_eq!(config.generator.quantity_max, 5);
        assert_eq!(config.generator.base_price, Decimal::new(425, 1));
        assert_eq!(config.generator.warm_start_passes, 0);
        assert_eq!(config.aggregator.channel_capacity, 64);
        assert_eq!(config.server.health_port, 9000);
    }

    #[test]
    fn quantity_ceiling_follows_interval() {
        let config =
            FeedConfig::from_lookup(lookup_from(&[("SYNTHETIC_FEED_INTERVAL_MS", "100")])).unwrap();
        assert_eq!(config.generator.quantity_max, 99);
    }

    #[test_case("abc" ; "not a number")]
    #[test_case("-5" ; "negative")]
    #[test_case("" ; "empty")]
    fn unparseable_values_fall_back(raw: &str) {
        let config =
            FeedConfig::from_lookup(lookup_from(&[("SYNTHETIC_FEED_BATCH_SIZE", raw)])).unwrap();
        assert_eq!(config.generator.batch_size, 500_000);
    }

    #[test_case("SPY", &["SPY"] ; "single")]
    #[test_case("aapl, msft ,SPY", &["AAPL", "MSFT", "SPY"] ; "list with spaces")]
    #[test_case("AAA,,BBB,", &["AAA", "BBB"] ; "empty entries skipped")]
    #[test_case("AAA,BBB,aaa,CCC,BBB", &["AAA", "BBB", "CCC"] ; "non adjacent duplicates")]
    #[test_case("", &[] ; "no symbols")]
    fn symbol_list_parsing(raw: &str, expected: &[&str]) {
        let config =
            FeedConfig::from_lookup(lookup_from(&[("SYNTHETIC_FEED_SYMBOLS", raw)])).unwrap();
        let names: Vec<&str> = config.symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, expected);
    }

    #[test_case("SYNTHETIC_FEED_INTERVAL_MS", "0" ; "zero interval")]
    #[test_case("SYNTHETIC_FEED_BATCH_SIZE", "0" ; "zero batch")]
    #[test_case("SYNTHETIC_FEED_CHANNEL_CAPACITY", "0" ; "zero capacity")]
    fn zero_values_rejected(key: &str, value: &str) {
        let err = FeedConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: k, .. } if k == key));
    }

    #[test]
    fn inverted_quantity_range_rejected() {
        let err = FeedConfig::from_lookup(lookup_from(&[
            ("SYNTHETIC_FEED_QUANTITY_MIN", "50"),
            ("SYNTHETIC_FEED_QUANTITY_MAX", "10"),
        ]))
        .unwrap_err();

        assert_eq!(err, ConfigError::InvalidQuantityRange { min: 50, max: 10 });
        assert!(err.to_string().contains("min 50 exceeds max 10"));
    }
}
