//! The per-player action slot and its submission lifecycle.
//!
//! Each player owns exactly one [`ActionSlot`] per round. A slot moves
//! through three states:
//!
//! - **Empty**: nothing submitted yet. Submission validates eagerly and
//!   either fills the slot or returns a [`ValidationError`] without
//!   touching it.
//! - **Pending**: a submission is parked. Re-validation at round start may
//!   mark it invalid in place (the slot stays occupied so the player still
//!   cannot submit again).
//! - **Consumed**: the resolver took the submission this round.
//!
//! The slot clears back to Empty at end of round, on death, and when a stun
//! expires (a stunned player's parked action is forfeit).

use serde::{Deserialize, Serialize};

use crate::abilities::AbilityKind;
use crate::error::{InvalidationReason, ValidationError};
use crate::player::PlayerId;

/// One parked action: what to cast and on whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSubmission {
    ability: AbilityKind,
    target: Option<PlayerId>,
    valid: bool,
    invalidation: Option<InvalidationReason>,
    submitted_at_round: u64,
    invalidated_at_round: Option<u64>,
}

impl ActionSubmission {
    /// Returns the submitted ability.
    #[must_use]
    pub const fn ability(&self) -> AbilityKind {
        self.ability
    }

    /// Returns the submitted target, if the ability takes one.
    #[must_use]
    pub fn target(&self) -> Option<&PlayerId> {
        self.target.as_ref()
    }

    /// Returns `false` once re-validation has rejected the submission.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Why the submission was invalidated, if it was.
    #[must_use]
    pub const fn invalidation(&self) -> Option<InvalidationReason> {
        self.invalidation
    }

    /// Round the action was submitted on.
    #[must_use]
    pub const fn submitted_at_round(&self) -> u64 {
        self.submitted_at_round
    }

    /// Round the submission was invalidated on, if it was.
    #[must_use]
    pub const fn invalidated_at_round(&self) -> Option<u64> {
        self.invalidated_at_round
    }
}

/// Slot contents across the round lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    /// No submission this round.
    Empty,
    /// A submission is parked, possibly already invalidated.
    Pending(ActionSubmission),
    /// The resolver consumed the submission this round.
    Consumed,
}

/// Eligibility inputs for [`ActionSlot::submit`], gathered by the caller
/// so the slot itself stays free of roster and config lookups.
#[derive(Debug, Clone, Copy)]
pub struct SubmitChecks {
    /// Whether the actor's level unlocks the ability.
    pub unlocked: bool,
    /// Rounds left on the ability's cooldown (0 means ready).
    pub cooldown_remaining: u32,
    /// Current round, recorded on the submission.
    pub round: u64,
}

/// A player's single action slot for the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSlot {
    state: SlotState,
}

impl Default for ActionSlot {
    fn default() -> Self {
        Self {
            state: SlotState::Empty,
        }
    }
}

impl ActionSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current slot state.
    #[must_use]
    pub const fn state(&self) -> &SlotState {
        &self.state
    }

    /// Returns `true` when nothing is parked or consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.state, SlotState::Empty)
    }

    /// Returns the pending submission, if one is parked.
    #[must_use]
    pub const fn pending(&self) -> Option<&ActionSubmission> {
        match &self.state {
            SlotState::Pending(submission) => Some(submission),
            _ => None,
        }
    }

    /// Parks a submission after eager validation.
    ///
    /// Rejects a second submission in the same round, locked abilities, and
    /// abilities still cooling down. A rejected call leaves the slot as it
    /// was, so the player may retry with a different ability.
    pub fn submit(
        &mut self,
        ability: AbilityKind,
        target: Option<PlayerId>,
        checks: SubmitChecks,
    ) -> Result<(), ValidationError> {
        if !matches!(self.state, SlotState::Empty) {
            return Err(ValidationError::AlreadySubmitted);
        }
        if !checks.unlocked {
            return Err(ValidationError::AbilityNotUnlocked(ability));
        }
        if checks.cooldown_remaining > 0 {
            return Err(ValidationError::AbilityOnCooldown {
                kind: ability,
                remaining: checks.cooldown_remaining,
            });
        }

        self.state = SlotState::Pending(ActionSubmission {
            ability,
            target,
            valid: true,
            invalidation: None,
            submitted_at_round: checks.round,
            invalidated_at_round: None,
        });
        Ok(())
    }

    /// Marks a pending submission invalid in place, recording the reason
    /// and the round it happened on.
    ///
    /// The slot stays occupied: invalidation forfeits the action but never
    /// reopens submission for the round. A no-op on non-pending slots and
    /// on submissions already invalidated (the first reason wins).
    pub fn invalidate(&mut self, reason: InvalidationReason, round: u64) {
        if let SlotState::Pending(submission) = &mut self.state {
            if submission.valid {
                submission.valid = false;
                submission.invalidation = Some(reason);
                submission.invalidated_at_round = Some(round);
            }
        }
    }

    /// Takes the pending submission for resolution, leaving `Consumed`.
    ///
    /// Returns `None` when the slot is empty, already consumed, or the
    /// submission was invalidated.
    pub fn consume(&mut self) -> Option<ActionSubmission> {
        if !matches!(&self.state, SlotState::Pending(submission) if submission.valid) {
            return None;
        }
        match std::mem::replace(&mut self.state, SlotState::Consumed) {
            SlotState::Pending(submission) => Some(submission),
            _ => None,
        }
    }

    /// Resets the slot to `Empty` for the next round.
    pub fn clear(&mut self) {
        self.state = SlotState::Empty;
    }
}
