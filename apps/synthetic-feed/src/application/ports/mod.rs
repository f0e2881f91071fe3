//! Port Interfaces
//!
//! Defines the interfaces (ports) the generator depends on, following the
//! Hexagonal Architecture pattern.
//!
//! ## Driven Ports (Outbound)
//!
//! - `AggregationSink`: Accepts raw ticks and multiplexes them per subscription
//! - `Clock`: Wall-clock source for timestamps and prices
//! - `RandomSource`: Uniform integer source for synthetic quantities

mod aggregation_sink_port;
mod clock_port;
mod random_source_port;

pub use aggregation_sink_port::{
    AggregationSink, NewDataObserver, NoOpObserver, SharedSink, SinkError, TickStream,
};
pub use clock_port::{Clock, SystemClock};
pub use random_source_port::{RandomSource, StdRandomSource};
