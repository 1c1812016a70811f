//! Per-player ability cooldown tracking.
//!
//! Starting a cooldown of `n` turns stores `n + 1`, because the end-of-round
//! sweep that started the cooldown also decrements it. The player therefore
//! observes exactly `n` full rounds of unavailability. Entries are deleted
//! the moment they reach zero, so the map never holds a zero and absence
//! always means ready.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::abilities::AbilityKind;

/// Active cooldowns for one player, keyed by ability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownTracker {
    entries: BTreeMap<AbilityKind, u32>,
}

impl CooldownTracker {
    /// Creates a tracker with no active cooldowns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a cooldown of `turns` rounds for `kind`.
    ///
    /// A `turns` of zero stores nothing: the ability stays ready.
    pub fn put(&mut self, kind: AbilityKind, turns: u32) {
        if turns == 0 {
            return;
        }
        // One extra turn absorbs the same-round decrement.
        self.entries.insert(kind, turns + 1);
    }

    /// Rounds left before `kind` is usable again. Zero means ready.
    #[must_use]
    pub fn remaining(&self, kind: AbilityKind) -> u32 {
        self.entries.get(&kind).copied().unwrap_or(0)
    }

    /// Returns `true` while `kind` is unavailable.
    #[must_use]
    pub fn is_on_cooldown(&self, kind: AbilityKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Advances every cooldown by one round, dropping entries that finish.
    pub fn decrement_all(&mut self) {
        self.entries.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
    }

    /// Clears every active cooldown.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns `true` when nothing is cooling down.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates active cooldowns in ability order.
    pub fn iter(&self) -> impl Iterator<Item = (AbilityKind, u32)> + '_ {
        self.entries.iter().map(|(kind, remaining)| (*kind, *remaining))
    }
}
