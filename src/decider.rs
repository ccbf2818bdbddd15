//! # Decider
//!
//! This module contains the [`Draw`] trait, the source of the random number
//! that decides whether a request is failed, and [`should_inject`], which
//! compares a draw against an [`ErrorThreshold`].
//!
//! Draws are integers in `0..100`. A request is failed when the draw is
//! strictly less than the threshold, so a threshold of `0` never fails a
//! request and a threshold of `100` always does.
//!
//! ## Example
//!
//! ```rust
//! use posts_chaos::decider::{should_inject, Draw, SharedRng};
//! use posts_chaos::threshold::ErrorThreshold;
//!
//! let threshold = ErrorThreshold::new(25).unwrap();
//!
//! assert!(should_inject(threshold, 10));
//! assert!(!should_inject(threshold, 25));
//!
//! // Process-wide generator, seeded once.
//! let rng = SharedRng::from_entropy();
//! let draw = rng.draw();
//! assert!(draw < 100);
//!
//! // Closures work as fixed draw sources.
//! let fixed = || 99u8;
//! assert!(!should_inject(threshold, fixed.draw()));
//! ```

use crate::threshold::ErrorThreshold;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Exclusive upper bound of a draw.
pub const DRAW_RANGE: u8 = 100;

/// Source of uniformly distributed integers in `0..100`.
pub trait Draw: Send + Sync {
    /// Return the next draw.
    fn draw(&self) -> u8;
}

/// Returns `true` when a request with the given draw must be failed.
pub fn should_inject(threshold: ErrorThreshold, draw: u8) -> bool {
    draw < threshold.percent()
}

/// Thread-safe random generator shared by every clone of the injection
/// service.
///
/// The generator is seeded once and reused for every decision.
#[derive(Debug)]
pub struct SharedRng {
    rng: Mutex<StdRng>,
}

impl SharedRng {
    /// Create a generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a generator with a fixed seed, for reproducible sequences.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl Draw for SharedRng {
    fn draw(&self) -> u8 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..DRAW_RANGE)
    }
}

impl<F> Draw for F
where
    F: Fn() -> u8 + Send + Sync,
{
    fn draw(&self) -> u8 {
        self()
    }
}
