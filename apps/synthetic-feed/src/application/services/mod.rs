//! Application Services
//!
//! Services that orchestrate domain logic and coordinate between ports.
//!
//! - `TickGenerator`: Warm start plus periodic bulk tick synthesis
//! - `ThroughputReporter`: Ticks-per-second diagnostics
//! - `SyntheticDataQueue`: Subscription lifecycle facade over the generator

mod data_queue;
mod generator;
mod throughput;

pub use data_queue::{FeedStats, SyntheticDataQueue};
pub use generator::{
    CycleSummary, DEFAULT_QUANTITY_MIN, GENERATED_TICK_TYPE, GeneratorConfig, GeneratorStats,
    QuantityRange, TickGenerator, synthetic_price,
};
pub use throughput::{ThroughputReporter, ThroughputSample};
