//! Subscribed Symbol Registry
//!
//! Tracks which symbols currently have at least one live subscription.
//! The tick generator reads it once per cycle as a point-in-time snapshot
//! while callers add and remove symbols concurrently.
//!
//! # Design
//!
//! A single mutex guards the set. It is held only long enough to mutate
//! or copy the set, never across a generation cycle, so subscription
//! changes are not starved by an in-progress burst.

use std::collections::HashSet;

use parking_lot::Mutex;

use super::market_data::Symbol;

// =============================================================================
// Symbol Registry
// =============================================================================

/// Thread-safe set of subscribed symbols.
///
/// # Example
///
/// ```rust
/// use synthetic_feed::domain::market_data::Symbol;
/// use synthetic_feed::domain::subscription::SymbolRegistry;
///
/// let registry = SymbolRegistry::new();
///
/// assert!(registry.subscribe(Symbol::new("AAPL")));
/// // Re-subscribing is a no-op
/// assert!(!registry.subscribe(Symbol::new("AAPL")));
///
/// let snapshot = registry.snapshot();
/// registry.unsubscribe(&Symbol::new("AAPL"));
///
/// // The snapshot is unaffected by later changes
/// assert_eq!(snapshot, vec![Symbol::new("AAPL")]);
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    symbols: Mutex<HashSet<Symbol>>,
}

impl SymbolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol.
    ///
    /// Returns `true` if the symbol was not already present.
    pub fn subscribe(&self, symbol: Symbol) -> bool {
        self.symbols.lock().insert(symbol)
    }

    /// Remove a symbol.
    ///
    /// Returns `true` if the symbol was present.
    pub fn unsubscribe(&self, symbol: &Symbol) -> bool {
        self.symbols.lock().remove(symbol)
    }

    /// Copy the current set of symbols.
    ///
    /// The copy is independent of the registry and can be iterated without
    /// holding any lock.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Symbol> {
        self.symbols.lock().iter().cloned().collect()
    }

    /// Check whether a symbol is subscribed.
    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.lock().contains(symbol)
    }

    /// Number of subscribed symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.lock().len()
    }

    /// Check whether no symbol is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.lock().is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
