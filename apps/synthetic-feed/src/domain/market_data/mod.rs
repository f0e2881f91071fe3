//! Market Data Types
//!
//! Core domain types for synthetic market data: symbols, tick kinds,
//! subscription requests and the ticks themselves. These types are the
//! canonical internal representation shared by the generator, the
//! aggregation sink and downstream consumers.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

// =============================================================================
// Symbol
// =============================================================================

/// A trading symbol.
///
/// Backed by a shared string so cloning into every generated tick does not
/// allocate. The symbol is normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Create a new symbol.
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref().trim().to_uppercase()))
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// =============================================================================
// Tick Type
// =============================================================================

/// Kind of market data observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TickType {
    /// Last-sale trade print.
    #[default]
    Trade,
    /// Bid/ask quote.
    Quote,
    /// Open interest update.
    OpenInterest,
}

impl TickType {
    /// Get the tick type name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trade => "trade",
            Self::Quote => "quote",
            Self::OpenInterest => "open_interest",
        }
    }
}

impl fmt::Display for TickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Subscription Request
// =============================================================================

/// A caller's request to stream one kind of data for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionRequest {
    /// Instrument to stream.
    pub symbol: Symbol,
    /// Desired observation kind.
    pub tick_type: TickType,
}

impl SubscriptionRequest {
    /// Create a new subscription request.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, tick_type: TickType) -> Self {
        Self {
            symbol: symbol.into(),
            tick_type,
        }
    }

    /// Create a trade subscription request.
    #[must_use]
    pub fn trades(symbol: impl Into<Symbol>) -> Self {
        Self::new(symbol, TickType::Trade)
    }

    /// Check whether a tick belongs to this subscription.
    #[must_use]
    pub fn matches(&self, tick: &Tick) -> bool {
        self.tick_type == tick.tick_type && self.symbol == tick.symbol
    }
}

impl fmt::Display for SubscriptionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.symbol, self.tick_type)
    }
}

// =============================================================================
// Tick
// =============================================================================

/// A single synthetic price/quantity observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    /// Wall-clock time at synthesis.
    pub time: DateTime<Utc>,
    /// Instrument the tick belongs to.
    pub symbol: Symbol,
    /// Synthetic price.
    pub price: Decimal,
    /// Observation kind.
    pub tick_type: TickType,
    /// Synthetic size.
    pub quantity: u64,
}
