//! # Covenfall Core
//!
//! Round resolution engine for Covenfall, a hidden-role party combat game.
//!
//! Players submit one action per round into a personal slot; the engine
//! then resolves every round in fixed phases: re-validate stale
//! submissions, resolve abilities in configured order, tick status
//! effects, advance cooldowns, clear slots. Resolution is deterministic:
//! the only randomness is the seedable Warlock detection roll, and every
//! collection the pipeline walks iterates in a stable order.
//!
//! ## Architecture
//!
//! - **Players**: hp, armor, race, the hidden role, and the per-player
//!   containers (effects, cooldowns, action slot)
//! - **Handlers**: one [`abilities::AbilityHandler`] per ability kind,
//!   dispatched through the [`abilities::AbilityResolver`]
//! - **Engine**: [`round::RoundEngine`] orchestrates the phases and
//!   assembles the round log
//!
//! ## Usage
//!
//! ```
//! use covenfall_core::abilities::AbilityKind;
//! use covenfall_core::config::GameConfig;
//! use covenfall_core::player::{Player, PlayerId, Race};
//! use covenfall_core::round::RoundEngine;
//!
//! let mut engine = RoundEngine::with_seed(GameConfig::standard(), 42);
//! engine.register(Player::new(PlayerId::new("korga"), "Korga", Race::Orc, 1));
//! engine.register(Player::new(PlayerId::new("mira"), "Mira", Race::Elf, 1));
//!
//! engine
//!     .submit_action(
//!         &PlayerId::new("korga"),
//!         AbilityKind::Strike,
//!         Some(PlayerId::new("mira")),
//!     )
//!     .unwrap();
//!
//! let result = engine.run_round();
//! assert!(!result.entries.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod abilities;
pub mod combat;
pub mod config;
pub mod cooldowns;
pub mod detection;
pub mod effects;
pub mod error;
pub mod log;
pub mod player;
pub mod round;
pub mod submission;
pub mod view;

pub use abilities::{AbilityKind, AbilityResolver};
pub use config::GameConfig;
pub use error::{ExecutionError, InvalidationReason, ValidationError};
pub use player::{Player, PlayerId, Race};
pub use round::{EngineSnapshot, RoundEngine, RoundResult};

#[cfg(test)]
mod tests;
