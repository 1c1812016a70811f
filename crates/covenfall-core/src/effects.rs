//! Timed status effects and the per-player effect table.
//!
//! Each player owns an [`EffectTable`] holding at most one [`StatusEffect`]
//! per [`EffectKind`] (the single-instance invariant). Applying an effect
//! that is already present merges into the existing entry:
//!
//! - **Poisoned** stacks: per-tick damage is summed and the longer of the
//!   two durations is kept.
//! - Every other known kind *refreshes*: the new data replaces the old
//!   wholesale, unless configuration marks the kind non-refreshable, in
//!   which case the call is a no-op.
//!
//! The table is pure storage. Round-end ticking lives in the orchestrator
//! because a tick touches hp, the round log, detection, and the action slot,
//! none of which belong to the table. The tick order, however, is fixed
//! here as [`TICK_ORDER`]: an explicit sequence rather than map iteration,
//! so identical inputs always produce identical logs.
//!
//! # Example
//!
//! ```
//! use covenfall_core::effects::{EffectTable, EffectKind, StatusEffect};
//! use covenfall_core::config::GameConfig;
//!
//! let config = GameConfig::standard();
//! let mut table = EffectTable::new();
//!
//! table.apply(StatusEffect::poison(5, 2, None), &config, 0);
//! table.apply(StatusEffect::poison(3, 4, None), &config, 0);
//!
//! let poison = table.get(EffectKind::Poisoned).unwrap();
//! assert_eq!(poison.poison_damage(), 5 + 3);
//! assert_eq!(poison.remaining_turns(), 4);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::GameConfig;
use crate::player::PlayerId;

/// The closed set of timed effect kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EffectKind {
    /// Damage to hp each round.
    Poisoned,
    /// Healing each round; qualifying ticks feed the detection mechanic.
    HealingOverTime,
    /// Bonus armor while active.
    Shielded,
    /// Cannot be targeted while active.
    Invisible,
    /// Cannot act while active.
    Stunned,
    /// Incoming damage is amplified.
    Vulnerable,
    /// Outgoing damage is reduced.
    Weakened,
    /// Outgoing damage is amplified.
    Enraged,
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poisoned => write!(f, "Poisoned"),
            Self::HealingOverTime => write!(f, "Healing Over Time"),
            Self::Shielded => write!(f, "Shielded"),
            Self::Invisible => write!(f, "Invisible"),
            Self::Stunned => write!(f, "Stunned"),
            Self::Vulnerable => write!(f, "Vulnerable"),
            Self::Weakened => write!(f, "Weakened"),
            Self::Enraged => write!(f, "Enraged"),
        }
    }
}

/// Fixed round-end processing order for active effects.
///
/// Poison and healing tick first (side effect, then duration decrement);
/// the remaining kinds decrement first and evaluate expiry afterwards.
/// The asymmetry is intentional and player-visible: reconciling it would
/// change how many turns each effect appears to last.
pub const TICK_ORDER: [EffectKind; 8] = [
    EffectKind::Poisoned,
    EffectKind::HealingOverTime,
    EffectKind::Shielded,
    EffectKind::Invisible,
    EffectKind::Stunned,
    EffectKind::Vulnerable,
    EffectKind::Weakened,
    EffectKind::Enraged,
];

/// Kind-specific magnitude carried by a [`StatusEffect`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectPower {
    /// Per-tick hp damage (Poisoned).
    Poison {
        /// Damage applied each round.
        damage: u32,
    },
    /// Per-tick healing (HealingOverTime).
    Regen {
        /// Healing applied each round, clamped to missing hp.
        amount: u32,
    },
    /// Flat armor bonus while active (Shielded).
    Shield {
        /// Armor added to the effective total.
        armor: i32,
    },
    /// Incoming damage multiplier increase (Vulnerable).
    Vulnerability {
        /// Fractional increase, e.g. `0.25` for +25% damage taken.
        taken_increase: f64,
    },
    /// Outgoing damage multiplier increase (Enraged).
    Fury {
        /// Fractional increase, e.g. `0.5` for +50% damage dealt.
        dealt_increase: f64,
    },
    /// Outgoing damage reduction (Weakened).
    Weakness {
        /// Fractional reduction, e.g. `0.25` for −25% damage dealt.
        dealt_reduction: f64,
    },
    /// No magnitude (Invisible, Stunned).
    None,
}

/// One active timed effect on a player.
///
/// Keyed uniquely by kind within an [`EffectTable`]. Created through the
/// per-kind constructors, mutated only by stacking/refreshing and by the
/// round tick, destroyed when its duration runs out or on explicit removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    kind: EffectKind,
    remaining_turns: u32,
    power: EffectPower,
    source: Option<PlayerId>,
    applied_at: u64,
}

impl StatusEffect {
    fn new(kind: EffectKind, turns: u32, power: EffectPower, source: Option<PlayerId>) -> Self {
        Self {
            kind,
            remaining_turns: turns,
            power,
            source,
            applied_at: 0,
        }
    }

    /// Poison dealing `damage` hp per round for `turns` rounds.
    #[must_use]
    pub fn poison(damage: u32, turns: u32, source: Option<PlayerId>) -> Self {
        Self::new(
            EffectKind::Poisoned,
            turns,
            EffectPower::Poison { damage },
            source,
        )
    }

    /// Healing-over-time restoring `amount` hp per round for `turns` rounds.
    ///
    /// The healer id is what makes a tick eligible for the detection check.
    #[must_use]
    pub fn regen(amount: u32, turns: u32, healer: Option<PlayerId>) -> Self {
        Self::new(
            EffectKind::HealingOverTime,
            turns,
            EffectPower::Regen { amount },
            healer,
        )
    }

    /// Shield granting `armor` bonus armor for `turns` rounds.
    #[must_use]
    pub fn shield(armor: i32, turns: u32, source: Option<PlayerId>) -> Self {
        Self::new(
            EffectKind::Shielded,
            turns,
            EffectPower::Shield { armor },
            source,
        )
    }

    /// Stun preventing any action for `turns` rounds.
    #[must_use]
    pub fn stun(turns: u32, source: Option<PlayerId>) -> Self {
        Self::new(EffectKind::Stunned, turns, EffectPower::None, source)
    }

    /// Invisibility preventing targeting for `turns` rounds.
    #[must_use]
    pub fn invisible(turns: u32) -> Self {
        Self::new(EffectKind::Invisible, turns, EffectPower::None, None)
    }

    /// Vulnerability amplifying incoming damage for `turns` rounds.
    #[must_use]
    pub fn vulnerable(taken_increase: f64, turns: u32, source: Option<PlayerId>) -> Self {
        Self::new(
            EffectKind::Vulnerable,
            turns,
            EffectPower::Vulnerability { taken_increase },
            source,
        )
    }

    /// Weakness reducing outgoing damage for `turns` rounds.
    #[must_use]
    pub fn weakened(dealt_reduction: f64, turns: u32, source: Option<PlayerId>) -> Self {
        Self::new(
            EffectKind::Weakened,
            turns,
            EffectPower::Weakness { dealt_reduction },
            source,
        )
    }

    /// Rage amplifying outgoing damage for `turns` rounds.
    #[must_use]
    pub fn enraged(dealt_increase: f64, turns: u32) -> Self {
        Self::new(
            EffectKind::Enraged,
            turns,
            EffectPower::Fury { dealt_increase },
            None,
        )
    }

    /// Returns the effect kind.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Returns the rounds left before expiry.
    #[must_use]
    pub const fn remaining_turns(&self) -> u32 {
        self.remaining_turns
    }

    /// Returns the kind-specific magnitude.
    #[must_use]
    pub const fn power(&self) -> &EffectPower {
        &self.power
    }

    /// Returns the player that applied this effect, if recorded.
    #[must_use]
    pub fn source(&self) -> Option<&PlayerId> {
        self.source.as_ref()
    }

    /// Returns the round the effect was applied on.
    #[must_use]
    pub const fn applied_at(&self) -> u64 {
        self.applied_at
    }

    /// Per-tick poison damage, or 0 for non-poison effects.
    #[must_use]
    pub fn poison_damage(&self) -> u32 {
        match self.power {
            EffectPower::Poison { damage } => damage,
            _ => 0,
        }
    }

    /// Per-tick healing amount, or 0 for non-regen effects.
    #[must_use]
    pub fn regen_amount(&self) -> u32 {
        match self.power {
            EffectPower::Regen { amount } => amount,
            _ => 0,
        }
    }

    /// Armor bonus while active, or 0 for non-shield effects.
    #[must_use]
    pub fn shield_armor(&self) -> i32 {
        match self.power {
            EffectPower::Shield { armor } => armor,
            _ => 0,
        }
    }

    /// Decrements the duration by one round, saturating at zero.
    pub fn decrement(&mut self) {
        self.remaining_turns = self.remaining_turns.saturating_sub(1);
    }

    /// Returns `true` when the duration has run out.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.remaining_turns == 0
    }
}

/// What [`EffectTable::apply`] did with the incoming effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No entry of this kind existed; the effect was inserted.
    Inserted,
    /// Poison merged into the existing entry (damage summed, turns maxed).
    Stacked,
    /// The existing entry was replaced wholesale.
    Refreshed,
    /// The kind is configured non-refreshable and an entry exists; no-op.
    Ignored,
}

/// Active timed effects for one player, at most one per kind.
///
/// Storage is a `BTreeMap` keyed by kind so iteration is deterministic,
/// though round processing always walks [`TICK_ORDER`] rather than the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectTable {
    effects: BTreeMap<EffectKind, StatusEffect>,
}

impl EffectTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an effect, merging per the kind's stacking rules.
    ///
    /// `round` is recorded as `applied_at` on insert and refresh.
    pub fn apply(
        &mut self,
        mut effect: StatusEffect,
        config: &GameConfig,
        round: u64,
    ) -> ApplyOutcome {
        effect.applied_at = round;
        let kind = effect.kind;

        if !self.effects.contains_key(&kind) {
            self.effects.insert(kind, effect);
            return ApplyOutcome::Inserted;
        }

        if kind == EffectKind::Poisoned {
            // Poison is the one stacking kind: sum damage, keep the longer run.
            if let Some(existing) = self.effects.get_mut(&kind) {
                let merged = existing.poison_damage() + effect.poison_damage();
                existing.power = EffectPower::Poison { damage: merged };
                existing.remaining_turns = existing.remaining_turns.max(effect.remaining_turns);
                existing.source = effect.source;
            }
            return ApplyOutcome::Stacked;
        }

        if !config.effect_defaults(kind).refreshable {
            return ApplyOutcome::Ignored;
        }

        self.effects.insert(kind, effect);
        ApplyOutcome::Refreshed
    }

    /// Returns the active effect of `kind`, if any.
    #[must_use]
    pub fn get(&self, kind: EffectKind) -> Option<&StatusEffect> {
        self.effects.get(&kind)
    }

    /// Returns the active effect of `kind` mutably, if any.
    #[must_use]
    pub fn get_mut(&mut self, kind: EffectKind) -> Option<&mut StatusEffect> {
        self.effects.get_mut(&kind)
    }

    /// Returns `true` if an effect of `kind` is active.
    #[must_use]
    pub fn contains(&self, kind: EffectKind) -> bool {
        self.effects.contains_key(&kind)
    }

    /// Removes and returns the effect of `kind`.
    pub fn remove(&mut self, kind: EffectKind) -> Option<StatusEffect> {
        self.effects.remove(&kind)
    }

    /// Wipes the whole table. Used on death and resurrection.
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Returns the number of active effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Returns `true` if no effects are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Total armor bonus from active shield effects.
    #[must_use]
    pub fn shield_armor(&self) -> i32 {
        self.get(EffectKind::Shielded)
            .map_or(0, StatusEffect::shield_armor)
    }

    /// Incoming damage multiplier from vulnerability (1.0 when absent).
    #[must_use]
    pub fn incoming_multiplier(&self) -> f64 {
        match self.get(EffectKind::Vulnerable).map(StatusEffect::power) {
            Some(EffectPower::Vulnerability { taken_increase }) => 1.0 + taken_increase,
            _ => 1.0,
        }
    }

    /// Outgoing damage multiplier from rage (1.0 when absent).
    #[must_use]
    pub fn fury_multiplier(&self) -> f64 {
        match self.get(EffectKind::Enraged).map(StatusEffect::power) {
            Some(EffectPower::Fury { dealt_increase }) => 1.0 + dealt_increase,
            _ => 1.0,
        }
    }

    /// Outgoing damage multiplier from weakness (1.0 when absent).
    #[must_use]
    pub fn weakness_multiplier(&self) -> f64 {
        match self.get(EffectKind::Weakened).map(StatusEffect::power) {
            Some(EffectPower::Weakness { dealt_reduction }) => {
                (1.0 - dealt_reduction).max(0.0)
            }
            _ => 1.0,
        }
    }

    /// Kinds currently active, in [`TICK_ORDER`].
    #[must_use]
    pub fn active_in_tick_order(&self) -> Vec<EffectKind> {
        TICK_ORDER
            .into_iter()
            .filter(|kind| self.effects.contains_key(kind))
            .collect()
    }

    /// Iterates active effects in kind order (for views and snapshots).
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> + '_ {
        self.effects.values()
    }
}
