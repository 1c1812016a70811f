//! The Warlock detection roll.
//!
//! Healing the hidden-role player is risky: every healing-over-time tick
//! that actually restores hp and carries a healer id gives that healer a
//! small chance of sensing something wrong with the target. The roll is a
//! single uniform draw per qualifying tick, compared against the configured
//! chance. The generator is ChaCha20 so a seeded engine replays the exact
//! same detection sequence, which the determinism tests rely on.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Seedable source of detection rolls.
#[derive(Debug, Clone)]
pub struct WarlockDetector {
    chance: f64,
    rng: ChaCha20Rng,
}

impl WarlockDetector {
    /// Creates a detector seeded from OS entropy.
    #[must_use]
    pub fn new(chance: f64) -> Self {
        Self {
            chance,
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Creates a detector with a fixed seed for replayable runs.
    #[must_use]
    pub fn with_seed(chance: f64, seed: u64) -> Self {
        Self {
            chance,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Returns the configured per-tick chance.
    #[must_use]
    pub const fn chance(&self) -> f64 {
        self.chance
    }

    /// Draws once. Exactly one draw per call, so seeded runs stay aligned.
    pub fn roll(&mut self) -> bool {
        self.rng.gen::<f64>() < self.chance
    }
}
