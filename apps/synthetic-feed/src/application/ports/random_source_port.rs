//! Random Source Port (Driven Port)
//!
//! Uniform integer source for synthetic tick quantities.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Port for drawing uniformly distributed integers.
pub trait RandomSource: Send {
    /// Draw a value uniformly from `low..=high`.
    ///
    /// Implementations may assume `low <= high`.
    fn next_in_range(&mut self, low: u64, high: u64) -> u64;
}

/// Random source backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct StdRandomSource {
    rng: StdRng,
}

impl StdRandomSource {
    /// Create a source seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a reproducible source from a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for StdRandomSource {
    fn next_in_range(&mut self, low: u64, high: u64) -> u64 {
        self.rng.random_range(low..=high)
    }
}
