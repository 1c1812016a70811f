//! Player identity, combat state, and per-player containers.
//!
//! A [`Player`] bundles everything the round pipeline reads and writes for
//! one participant: hp and armor, race, the hidden role flag, the
//! [`EffectTable`], the [`CooldownTracker`], and the [`ActionSlot`]. The
//! roster is a `BTreeMap` keyed by [`PlayerId`] so every whole-roster walk
//! is in stable id order.
//!
//! # Example
//!
//! ```
//! use covenfall_core::player::{Player, PlayerId, Race};
//! use covenfall_core::config::GameConfig;
//!
//! let config = GameConfig::standard();
//! let mut player = Player::new(PlayerId::new("korga"), "Korga", Race::Orc, 3);
//!
//! let outcome = player.take_damage(12);
//! assert_eq!(outcome.actual, 12);
//! assert!(!outcome.died);
//! assert!(player.damage_mod(&config) > 1.0);
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::GameConfig;
use crate::cooldowns::CooldownTracker;
use crate::effects::{EffectKind, EffectTable};
use crate::submission::ActionSlot;

/// Hp every player starts with.
pub const BASE_HP: u32 = 100;

const MONSTER_ID: &str = "__monster__";

// ============================================================================
// Identity
// ============================================================================

/// Opaque player identifier.
///
/// Ordered, so rosters and maps keyed by id iterate deterministically. The
/// monster occupies a reserved sentinel id that real players can never take.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Creates an id from an arbitrary string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved id for the monster's slot in damage attribution.
    #[must_use]
    pub fn monster() -> Self {
        Self(MONSTER_ID.to_string())
    }

    /// Returns `true` for the monster sentinel.
    #[must_use]
    pub fn is_monster(&self) -> bool {
        self.0 == MONSTER_ID
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Roster of players in stable id order.
pub type Roster = BTreeMap<PlayerId, Player>;

// ============================================================================
// Race
// ============================================================================

/// Playable races. Each carries a passive and a one-shot racial ability,
/// both defined in configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Race {
    /// Passive bonus to outgoing damage.
    Human,
    /// Racial: Blood Rage, doubling the next damaging ability.
    Orc,
    /// Stone armor pool that degrades per hit; racial: Undying self-heal.
    Dwarf,
    /// Racial: Fade, a short invisibility.
    Elf,
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "Human"),
            Self::Orc => write!(f, "Orc"),
            Self::Dwarf => write!(f, "Dwarf"),
            Self::Elf => write!(f, "Elf"),
        }
    }
}

bitflags! {
    /// Transient combat markers that are not timed effects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CombatFlags: u8 {
        /// Blood Rage is armed; consumed by the next damaging ability.
        const BLOOD_RAGE = 1 << 0;
        /// Stone armor has already hit its floor (logged only once).
        const STONE_SHATTERED = 1 << 1;
    }
}

// ============================================================================
// Player
// ============================================================================

/// Result of applying damage to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Hp actually removed, after saturation at zero.
    pub actual: u32,
    /// Whether this hit dropped the player to zero hp.
    pub died: bool,
}

/// Result of applying healing to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealOutcome {
    /// Hp actually restored, after clamping to max hp.
    pub actual: u32,
}

/// Serializable image of a player's transient containers, used for
/// reconnect snapshots alongside the plain combat fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    effects: EffectTable,
    cooldowns: CooldownTracker,
    slot: ActionSlot,
}

/// One participant's full combat state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    race: Race,
    level: u32,
    hp: u32,
    max_hp: u32,
    armor: i32,
    base_damage_mod: f64,
    alive: bool,
    is_warlock: bool,
    role_revealed: bool,
    stone_armor: Option<i32>,
    racial_uses: u32,
    flags: CombatFlags,
    effects: EffectTable,
    cooldowns: CooldownTracker,
    slot: ActionSlot,
}

impl Player {
    /// Creates a player at full hp. Race-derived numbers (stone armor pool,
    /// racial uses) are assigned by the engine from configuration at roster
    /// build time via the `with_*` builders.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, race: Race, level: u32) -> Self {
        Self {
            id,
            name: name.into(),
            race,
            level: level.max(1),
            hp: BASE_HP,
            max_hp: BASE_HP,
            armor: 0,
            base_damage_mod: 1.0,
            alive: true,
            is_warlock: false,
            role_revealed: false,
            stone_armor: None,
            racial_uses: 1,
            flags: CombatFlags::empty(),
            effects: EffectTable::new(),
            cooldowns: CooldownTracker::new(),
            slot: ActionSlot::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the player id.
    #[must_use]
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the race.
    #[must_use]
    pub const fn race(&self) -> Race {
        self.race
    }

    /// Returns the player level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Returns current hp.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Returns maximum hp.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Returns base armor, before stone armor and shields.
    #[must_use]
    pub const fn armor(&self) -> i32 {
        self.armor
    }

    /// Returns the remaining stone armor pool, if this player has one.
    #[must_use]
    pub const fn stone_armor(&self) -> Option<i32> {
        self.stone_armor
    }

    /// Returns `true` while the player is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Returns `true` for the hidden-role player.
    #[must_use]
    pub const fn is_warlock(&self) -> bool {
        self.is_warlock
    }

    /// Returns `true` once the hidden role has been exposed.
    #[must_use]
    pub const fn role_revealed(&self) -> bool {
        self.role_revealed
    }

    /// Returns uses left of the one-shot racial ability.
    #[must_use]
    pub const fn racial_uses(&self) -> u32 {
        self.racial_uses
    }

    /// Returns the transient combat flags.
    #[must_use]
    pub const fn flags(&self) -> CombatFlags {
        self.flags
    }

    /// Returns the effect table.
    #[must_use]
    pub const fn effects(&self) -> &EffectTable {
        &self.effects
    }

    /// Returns the effect table mutably.
    pub fn effects_mut(&mut self) -> &mut EffectTable {
        &mut self.effects
    }

    /// Returns the cooldown tracker.
    #[must_use]
    pub const fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Returns the cooldown tracker mutably.
    pub fn cooldowns_mut(&mut self) -> &mut CooldownTracker {
        &mut self.cooldowns
    }

    /// Returns the action slot.
    #[must_use]
    pub const fn slot(&self) -> &ActionSlot {
        &self.slot
    }

    /// Returns the action slot mutably.
    pub fn slot_mut(&mut self) -> &mut ActionSlot {
        &mut self.slot
    }

    // ------------------------------------------------------------------
    // Builders (roster setup)
    // ------------------------------------------------------------------

    /// Sets base armor.
    #[must_use]
    pub fn with_armor(mut self, armor: i32) -> Self {
        self.armor = armor;
        self
    }

    /// Sets max hp and fills to full.
    #[must_use]
    pub fn with_max_hp(mut self, max_hp: u32) -> Self {
        self.max_hp = max_hp;
        self.hp = max_hp;
        self
    }

    /// Sets the base outgoing damage modifier.
    #[must_use]
    pub fn with_base_damage_mod(mut self, base: f64) -> Self {
        self.base_damage_mod = base;
        self
    }

    /// Marks this player as the hidden-role Warlock.
    #[must_use]
    pub fn with_warlock_role(mut self) -> Self {
        self.is_warlock = true;
        self
    }

    /// Assigns a stone armor pool (Dwarves, from race configuration).
    #[must_use]
    pub fn with_stone_armor(mut self, pool: i32) -> Self {
        self.stone_armor = Some(pool);
        self
    }

    /// Sets the number of one-shot racial uses.
    #[must_use]
    pub fn with_racial_uses(mut self, uses: u32) -> Self {
        self.racial_uses = uses;
        self
    }

    // ------------------------------------------------------------------
    // Derived combat numbers
    // ------------------------------------------------------------------

    /// Outgoing damage modifier: base scaled by one configured step per
    /// level past the first.
    #[must_use]
    pub fn damage_mod(&self, config: &GameConfig) -> f64 {
        let step = config.balance().per_level_damage_step;
        self.base_damage_mod * (1.0 + step * f64::from(self.level - 1))
    }

    /// Healing modifier. Locked to the same level scaling as damage: a
    /// player who hits harder heals harder by the same proportion.
    #[must_use]
    pub fn healing_mod(&self, config: &GameConfig) -> f64 {
        self.damage_mod(config) / self.base_damage_mod
    }

    /// Effective armor: base plus remaining stone armor plus shields.
    /// Stone armor below zero drags the total down.
    #[must_use]
    pub fn effective_armor(&self) -> i32 {
        self.armor + self.stone_armor.unwrap_or(0) + self.effects.shield_armor()
    }

    // ------------------------------------------------------------------
    // Status queries
    // ------------------------------------------------------------------

    /// Returns `true` while stunned.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.effects.contains(EffectKind::Stunned)
    }

    /// Returns `true` while invisible to targeting.
    #[must_use]
    pub fn is_untargetable(&self) -> bool {
        self.effects.contains(EffectKind::Invisible)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Degrades the stone armor pool by `step` for one incoming hit,
    /// clamping at `floor`. Returns `true` the first time the pool reaches
    /// the floor, so the caller can log the shatter exactly once.
    pub fn degrade_stone_armor(&mut self, step: i32, floor: i32) -> bool {
        let Some(pool) = self.stone_armor.as_mut() else {
            return false;
        };
        *pool = (*pool - step).max(floor);
        if *pool <= floor && !self.flags.contains(CombatFlags::STONE_SHATTERED) {
            self.flags.insert(CombatFlags::STONE_SHATTERED);
            return true;
        }
        false
    }

    /// Removes hp, saturating at zero. Death wipes effects and the action
    /// slot so a corpse carries no pending state.
    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        let actual = amount.min(self.hp);
        self.hp -= actual;
        let died = self.alive && self.hp == 0;
        if died {
            self.alive = false;
            self.effects.clear();
            self.slot.clear();
        }
        DamageOutcome { actual, died }
    }

    /// Restores hp, clamped to max hp. Returns the hp actually gained;
    /// overheal is discarded.
    pub fn heal(&mut self, amount: u32) -> HealOutcome {
        if !self.alive {
            return HealOutcome { actual: 0 };
        }
        let actual = amount.min(self.max_hp - self.hp);
        self.hp += actual;
        HealOutcome { actual }
    }

    /// Brings a dead player back at the given hp with a clean slate.
    pub fn revive(&mut self, hp: u32) {
        self.alive = true;
        self.hp = hp.clamp(1, self.max_hp);
        self.effects.clear();
        self.cooldowns.clear();
        self.slot.clear();
        self.flags = CombatFlags::empty();
    }

    /// Arms the Blood Rage flag.
    pub fn arm_blood_rage(&mut self) {
        self.flags.insert(CombatFlags::BLOOD_RAGE);
    }

    /// Consumes the Blood Rage flag, returning whether it was armed.
    pub fn consume_blood_rage(&mut self) -> bool {
        let armed = self.flags.contains(CombatFlags::BLOOD_RAGE);
        self.flags.remove(CombatFlags::BLOOD_RAGE);
        armed
    }

    /// Spends one racial use. Returns `false` when none remain.
    pub fn spend_racial_use(&mut self) -> bool {
        if self.racial_uses == 0 {
            return false;
        }
        self.racial_uses -= 1;
        true
    }

    /// Exposes the hidden role.
    pub fn reveal_role(&mut self) {
        self.role_revealed = true;
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Captures the transient containers for reconnect restore.
    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            effects: self.effects.clone(),
            cooldowns: self.cooldowns.clone(),
            slot: self.slot.clone(),
        }
    }

    /// Restores the transient containers from a snapshot.
    pub fn restore(&mut self, snapshot: PlayerSnapshot) {
        self.effects = snapshot.effects;
        self.cooldowns = snapshot.cooldowns;
        self.slot = snapshot.slot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::StatusEffect;

    fn player(id: &str) -> Player {
        Player::new(PlayerId::new(id), id, Race::Human, 1)
    }

    mod id_tests {
        use super::*;

        #[test]
        fn monster_sentinel_is_reserved() {
            let monster = PlayerId::monster();
            assert!(monster.is_monster());
            assert!(!PlayerId::new("korga").is_monster());
        }

        #[test]
        fn ids_order_lexicographically() {
            assert!(PlayerId::new("alba") < PlayerId::new("korga"));
        }
    }

    mod damage_tests {
        use super::*;

        #[test]
        fn damage_saturates_at_zero_hp() {
            let mut p = player("korga");
            let outcome = p.take_damage(250);
            assert_eq!(outcome.actual, BASE_HP);
            assert!(outcome.died);
            assert_eq!(p.hp(), 0);
            assert!(!p.is_alive());
        }

        #[test]
        fn death_wipes_effects_and_slot() {
            let config = GameConfig::standard();
            let mut p = player("korga");
            p.effects_mut()
                .apply(StatusEffect::poison(3, 4, None), &config, 0);
            p.slot_mut()
                .submit(
                    crate::abilities::AbilityKind::Strike,
                    None,
                    crate::submission::SubmitChecks {
                        unlocked: true,
                        cooldown_remaining: 0,
                        round: 1,
                    },
                )
                .unwrap();

            p.take_damage(BASE_HP);

            assert!(p.effects().is_empty());
            assert!(p.slot().is_empty());
        }

        #[test]
        fn heal_clamps_to_max_hp() {
            let mut p = player("mira");
            p.take_damage(10);
            let outcome = p.heal(25);
            assert_eq!(outcome.actual, 10);
            assert_eq!(p.hp(), BASE_HP);
        }

        #[test]
        fn revive_restores_a_clean_slate() {
            let config = GameConfig::standard();
            let mut p = player("korga");
            p.cooldowns_mut()
                .put(crate::abilities::AbilityKind::Bash, 2);
            p.take_damage(BASE_HP);
            p.effects_mut()
                .apply(StatusEffect::poison(3, 2, None), &config, 0);

            p.revive(30);

            assert!(p.is_alive());
            assert_eq!(p.hp(), 30);
            assert!(p.effects().is_empty());
            assert!(p.cooldowns().is_empty());
        }

        #[test]
        fn dead_players_do_not_heal() {
            let mut p = player("mira");
            p.take_damage(BASE_HP);
            assert_eq!(p.heal(50).actual, 0);
            assert!(!p.is_alive());
        }
    }

    mod armor_tests {
        use super::*;

        #[test]
        fn effective_armor_sums_base_stone_and_shield() {
            let config = GameConfig::standard();
            let mut p = player("borin").with_armor(2).with_stone_armor(5);
            p.effects_mut()
                .apply(StatusEffect::shield(3, 2, None), &config, 0);
            assert_eq!(p.effective_armor(), 10);
        }

        #[test]
        fn stone_armor_degrades_and_clamps_at_floor() {
            let mut p = player("borin").with_stone_armor(3);
            assert!(!p.degrade_stone_armor(2, -2));
            assert_eq!(p.stone_armor(), Some(1));
            assert!(!p.degrade_stone_armor(2, -2));
            assert_eq!(p.stone_armor(), Some(-1));
            // Hits the floor: shatter reported once.
            assert!(p.degrade_stone_armor(2, -2));
            assert_eq!(p.stone_armor(), Some(-2));
            assert!(!p.degrade_stone_armor(2, -2));
            assert_eq!(p.stone_armor(), Some(-2));
        }

        #[test]
        fn negative_stone_armor_reduces_effective_armor() {
            let mut p = player("borin").with_armor(1).with_stone_armor(0);
            p.degrade_stone_armor(2, -2);
            assert_eq!(p.effective_armor(), -1);
        }
    }

    mod scaling_tests {
        use super::*;

        #[test]
        fn damage_mod_scales_per_level() {
            let config = GameConfig::standard();
            let level_one = player("a");
            let level_four = Player::new(PlayerId::new("b"), "b", Race::Human, 4);

            assert!((level_one.damage_mod(&config) - 1.0).abs() < 1e-9);
            assert!((level_four.damage_mod(&config) - 1.3).abs() < 1e-9);
        }

        #[test]
        fn healing_scales_in_lockstep_with_damage() {
            let config = GameConfig::standard();
            let p = Player::new(PlayerId::new("mira"), "Mira", Race::Elf, 5)
                .with_base_damage_mod(1.2);
            let ratio = p.damage_mod(&config) / p.base_damage_mod;
            assert!((p.healing_mod(&config) - ratio).abs() < 1e-9);
        }
    }

    mod racial_tests {
        use super::*;

        #[test]
        fn blood_rage_is_one_shot() {
            let mut p = player("korga");
            p.arm_blood_rage();
            assert!(p.consume_blood_rage());
            assert!(!p.consume_blood_rage());
        }

        #[test]
        fn racial_uses_deplete() {
            let mut p = player("borin");
            assert!(p.spend_racial_use());
            assert!(!p.spend_racial_use());
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn snapshot_restore_roundtrips_transient_state() {
            let config = GameConfig::standard();
            let mut p = player("korga");
            p.effects_mut()
                .apply(StatusEffect::stun(2, None), &config, 3);
            p.cooldowns_mut().put(crate::abilities::AbilityKind::Bash, 2);

            let snapshot = p.snapshot();
            let json = serde_json::to_string(&snapshot).unwrap();
            let parsed: PlayerSnapshot = serde_json::from_str(&json).unwrap();

            let mut fresh = player("korga");
            fresh.restore(parsed);
            assert!(fresh.is_stunned());
            assert_eq!(
                fresh.cooldowns().remaining(crate::abilities::AbilityKind::Bash),
                3
            );
        }
    }
}
