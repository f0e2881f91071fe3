//! Application Layer - Generation services and port definitions.
//!
//! This layer contains the services that drive synthetic data generation
//! and the port interfaces through which they reach the aggregation sink,
//! the clock and the random source.

/// Port interfaces for external collaborators (sink, clock, randomness).
pub mod ports;

/// Application services: generator, throughput reporter, data queue.
pub mod services;
