//! Domain Layer - Core market data types and subscription state.
//!
//! This layer contains the core domain types for synthetic market data
//! with no runtime dependencies. Everything here is plain Rust guarded by
//! `parking_lot` locks where shared.

/// Market data types (symbols, ticks, subscription requests).
pub mod market_data;

/// Subscribed symbol registry.
pub mod subscription;
