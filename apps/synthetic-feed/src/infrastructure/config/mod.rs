//! Configuration Module
//!
//! Configuration loading for the synthetic feed service.

mod settings;

pub use settings::{
    AggregatorSettings, ConfigError, FeedConfig, GeneratorSettings, ServerSettings,
};
