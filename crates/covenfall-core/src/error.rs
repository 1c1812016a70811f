//! Error taxonomy for the round resolution engine.
//!
//! Four categories, matching how far an action got before failing:
//!
//! - [`ValidationError`]: a submission was rejected before being stored.
//!   Surfaced synchronously to the submitting player; no state changes.
//! - [`InvalidationReason`]: a previously valid submission went stale before
//!   resolution. Recorded on the submission in place and surfaced as a log
//!   entry, never returned as an error.
//! - [`ExecutionError`]: an ability handler failed during resolution. Caught
//!   at the dispatch boundary, logged, and converted to a private failure
//!   message; never aborts the rest of the round.
//! - [`ConfigError`]: an unknown ability or effect kind was referenced.
//!   Logged as a warning and treated as a no-op.
//!
//! No category is retried automatically; the only retry path is the player
//! submitting a corrected action next round.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abilities::AbilityKind;
use crate::effects::EffectKind;

/// A submission was rejected before being stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The player already has a pending submission this round.
    #[error("an action has already been submitted this round")]
    AlreadySubmitted,

    /// The ability is not in the player's unlocked set.
    #[error("ability {0} is not unlocked")]
    AbilityNotUnlocked(AbilityKind),

    /// The ability is still cooling down.
    #[error("ability {kind} is on cooldown for {remaining} more turn(s)")]
    AbilityOnCooldown {
        /// The ability that was requested.
        kind: AbilityKind,
        /// Turns until the ability is usable again.
        remaining: u32,
    },

    /// No target was supplied for an ability that requires one.
    #[error("no target selected")]
    NoTarget,

    /// The player does not exist in the roster.
    #[error("unknown player")]
    UnknownPlayer,

    /// The player is dead and cannot act.
    #[error("dead players cannot act")]
    PlayerDead,
}

/// Why a previously valid submission became stale before resolution.
///
/// Recorded on the submission itself so the no-op can be explained in the
/// round log; never propagated as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidationReason {
    /// The target died between submission and resolution.
    TargetDead,
    /// The target left the game or never existed.
    TargetMissing,
    /// The target cannot currently be targeted (e.g. faded from view).
    TargetUntargetable,
    /// The ability aged onto cooldown after submission.
    AbilityOnCooldown,
    /// The ability is no longer in the player's unlocked set.
    AbilityNotUnlocked,
}

impl std::fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetDead => write!(f, "the target is dead"),
            Self::TargetMissing => write!(f, "the target is gone"),
            Self::TargetUntargetable => write!(f, "the target cannot be reached"),
            Self::AbilityOnCooldown => write!(f, "the ability is on cooldown"),
            Self::AbilityNotUnlocked => write!(f, "the ability is not unlocked"),
        }
    }
}

/// An ability handler failed during resolution.
///
/// These indicate engine-level inconsistencies (a handler asked for state
/// that no longer exists). They are contained per ability: the dispatcher
/// logs them and the round continues for everyone else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The acting player vanished from the roster mid-resolution.
    #[error("actor {0} is missing from the roster")]
    ActorMissing(String),

    /// The target vanished from the roster mid-resolution.
    #[error("target {0} is missing from the roster")]
    TargetMissing(String),

    /// The engine has no monster but the ability targeted the monster slot.
    #[error("no monster is present")]
    MonsterMissing,
}

/// An unknown ability or effect kind was referenced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No configuration entry exists for the ability.
    #[error("no configuration for ability {0}")]
    UnknownAbility(AbilityKind),

    /// No configuration entry exists for the effect.
    #[error("no configuration for effect {0}")]
    UnknownEffect(EffectKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    mod display_tests {
        use super::*;

        #[test]
        fn validation_error_messages() {
            let err = ValidationError::AbilityOnCooldown {
                kind: AbilityKind::Fireball,
                remaining: 2,
            };
            assert_eq!(
                err.to_string(),
                "ability Fireball is on cooldown for 2 more turn(s)"
            );
            assert_eq!(
                ValidationError::NoTarget.to_string(),
                "no target selected"
            );
        }

        #[test]
        fn invalidation_reason_messages() {
            assert_eq!(
                InvalidationReason::TargetDead.to_string(),
                "the target is dead"
            );
            assert_eq!(
                InvalidationReason::AbilityOnCooldown.to_string(),
                "the ability is on cooldown"
            );
        }

        #[test]
        fn execution_error_messages() {
            let err = ExecutionError::TargetMissing("ariel".to_string());
            assert_eq!(err.to_string(), "target ariel is missing from the roster");
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn invalidation_reason_roundtrip() {
            let reason = InvalidationReason::TargetUntargetable;
            let json = serde_json::to_string(&reason).unwrap();
            let back: InvalidationReason = serde_json::from_str(&json).unwrap();
            assert_eq!(reason, back);
        }
    }
}
