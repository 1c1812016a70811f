//! Game configuration: ability tables, effect defaults, race tuning, and
//! the balance knobs the combat math reads.
//!
//! Everything here derives `Serialize`/`Deserialize`, so a deployment can
//! load a tuned table from JSON instead of [`GameConfig::standard`]. The
//! engine itself never hardcodes an ability number; every damage value,
//! cooldown, unlock level, and rider comes through this module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::abilities::AbilityKind;
use crate::effects::EffectKind;
use crate::error::ConfigError;
use crate::player::Race;

/// What an ability may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetShape {
    /// No target: the ability applies to the caster.
    SelfOnly,
    /// A living player must be named.
    Player,
    /// A living player, or the monster when no target is named.
    PlayerOrMonster,
}

/// A status effect attached by an ability on hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiderConfig {
    /// Which effect the hit applies.
    pub kind: EffectKind,
    /// Duration in rounds.
    pub turns: u32,
    /// Flat magnitude: poison damage, regen amount, or shield armor.
    pub power: i32,
    /// Fractional magnitude: vulnerability, weakness, or fury scaling.
    pub scale: f64,
}

/// Tuning for one ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityConfig {
    /// The ability this entry tunes.
    pub kind: AbilityKind,
    /// Level at which the ability unlocks.
    pub unlock_at: u32,
    /// Cooldown in rounds after use (0 means none).
    pub cooldown: u32,
    /// Resolution ordering key; lower resolves first, ties break by
    /// actor id.
    pub order: u32,
    /// Targeting rule.
    pub target: TargetShape,
    /// Base damage before modifiers (0 for non-damaging abilities).
    pub damage: u32,
    /// Base healing before modifiers (0 for non-healing abilities).
    pub heal: u32,
    /// Status effect attached on hit, if any.
    pub rider: Option<RiderConfig>,
}

/// Per-kind effect stacking behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDefaults {
    /// Whether re-applying while active replaces the entry. Non-refreshable
    /// kinds ignore the re-application entirely.
    pub refreshable: bool,
    /// Whether re-applying merges magnitudes instead of replacing.
    pub stackable: bool,
}

impl Default for EffectDefaults {
    fn default() -> Self {
        Self {
            refreshable: true,
            stackable: false,
        }
    }
}

/// Tuning for one race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// The race's one-shot racial ability, if it has one.
    pub racial: Option<AbilityKind>,
    /// Uses of the racial per game.
    pub racial_uses: u32,
    /// Passive multiplier on outgoing damage (1.0 for none).
    pub passive_damage_scaler: f64,
    /// Starting stone armor pool, for races that carry one.
    pub stone_armor: Option<i32>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            racial: None,
            racial_uses: 0,
            passive_damage_scaler: 1.0,
            stone_armor: None,
        }
    }
}

/// Global combat math knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    /// Fraction of damage removed per point of effective armor.
    pub armor_reduction_rate: f64,
    /// Cap on total armor reduction (1.0 = full absorption).
    pub max_armor_reduction: f64,
    /// Floor on damage that lands (keeps every hit meaningful).
    pub min_damage: u32,
    /// Stone armor lost per incoming hit.
    pub stone_armor_step: i32,
    /// Floor the stone armor pool clamps at; may be negative.
    pub stone_armor_min: i32,
    /// Probability a qualifying heal tick exposes the hidden role.
    pub detection_chance: f64,
    /// Added outgoing damage fraction per level past the first.
    pub per_level_damage_step: f64,
    /// Added outgoing damage fraction per extra attacker on the same
    /// target in the same round.
    pub coordination_bonus: f64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            armor_reduction_rate: 0.1,
            max_armor_reduction: 1.0,
            min_damage: 1,
            stone_armor_step: 1,
            stone_armor_min: -2,
            detection_chance: 0.05,
            per_level_damage_step: 0.1,
            coordination_bonus: 0.05,
        }
    }
}

/// Complete game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    abilities: BTreeMap<AbilityKind, AbilityConfig>,
    effects: BTreeMap<EffectKind, EffectDefaults>,
    races: BTreeMap<Race, RaceConfig>,
    balance: BalanceConfig,
}

impl GameConfig {
    /// The standard tuning table.
    #[must_use]
    pub fn standard() -> Self {
        let mut abilities = BTreeMap::new();
        for ability in [
            // Racials resolve before class abilities.
            AbilityConfig {
                kind: AbilityKind::BloodRage,
                unlock_at: 1,
                cooldown: 0,
                order: 1,
                target: TargetShape::SelfOnly,
                damage: 0,
                heal: 0,
                rider: None,
            },
            AbilityConfig {
                kind: AbilityKind::Undying,
                unlock_at: 1,
                cooldown: 0,
                order: 2,
                target: TargetShape::SelfOnly,
                damage: 0,
                heal: 30,
                rider: None,
            },
            AbilityConfig {
                kind: AbilityKind::Fade,
                unlock_at: 1,
                cooldown: 0,
                order: 3,
                target: TargetShape::SelfOnly,
                damage: 0,
                heal: 0,
                // Two turns on the counter: the round-end sweep takes one
                // the same round the effect lands, leaving one full round
                // of cover.
                rider: Some(RiderConfig {
                    kind: EffectKind::Invisible,
                    turns: 2,
                    power: 0,
                    scale: 0.0,
                }),
            },
            // Support before damage, so a shield raised this round blocks
            // hits landing this round.
            AbilityConfig {
                kind: AbilityKind::ShieldWall,
                unlock_at: 2,
                cooldown: 3,
                order: 10,
                target: TargetShape::Player,
                damage: 0,
                heal: 0,
                rider: Some(RiderConfig {
                    kind: EffectKind::Shielded,
                    turns: 2,
                    power: 5,
                    scale: 0.0,
                }),
            },
            AbilityConfig {
                kind: AbilityKind::Heal,
                unlock_at: 1,
                cooldown: 0,
                order: 15,
                target: TargetShape::Player,
                damage: 0,
                heal: 12,
                rider: None,
            },
            AbilityConfig {
                kind: AbilityKind::Regrowth,
                unlock_at: 2,
                cooldown: 2,
                order: 20,
                target: TargetShape::Player,
                damage: 0,
                heal: 0,
                rider: Some(RiderConfig {
                    kind: EffectKind::HealingOverTime,
                    turns: 3,
                    power: 5,
                    scale: 0.0,
                }),
            },
            AbilityConfig {
                kind: AbilityKind::Strike,
                unlock_at: 1,
                cooldown: 0,
                order: 30,
                target: TargetShape::PlayerOrMonster,
                damage: 10,
                heal: 0,
                rider: None,
            },
            AbilityConfig {
                kind: AbilityKind::PoisonStrike,
                unlock_at: 2,
                cooldown: 1,
                order: 35,
                target: TargetShape::PlayerOrMonster,
                damage: 6,
                heal: 0,
                rider: Some(RiderConfig {
                    kind: EffectKind::Poisoned,
                    turns: 3,
                    power: 3,
                    scale: 0.0,
                }),
            },
            AbilityConfig {
                kind: AbilityKind::Fireball,
                unlock_at: 3,
                cooldown: 2,
                order: 40,
                target: TargetShape::PlayerOrMonster,
                damage: 14,
                heal: 0,
                rider: Some(RiderConfig {
                    kind: EffectKind::Vulnerable,
                    turns: 2,
                    power: 0,
                    scale: 0.25,
                }),
            },
            AbilityConfig {
                kind: AbilityKind::Bash,
                unlock_at: 4,
                cooldown: 3,
                order: 45,
                target: TargetShape::PlayerOrMonster,
                damage: 8,
                heal: 0,
                rider: Some(RiderConfig {
                    kind: EffectKind::Stunned,
                    turns: 2,
                    power: 0,
                    scale: 0.0,
                }),
            },
            AbilityConfig {
                kind: AbilityKind::Curse,
                unlock_at: 3,
                cooldown: 2,
                order: 50,
                target: TargetShape::Player,
                damage: 0,
                heal: 0,
                rider: Some(RiderConfig {
                    kind: EffectKind::Weakened,
                    turns: 2,
                    power: 0,
                    scale: 0.25,
                }),
            },
        ] {
            abilities.insert(ability.kind, ability);
        }

        let mut effects = BTreeMap::new();
        for kind in crate::effects::TICK_ORDER {
            effects.insert(
                kind,
                EffectDefaults {
                    refreshable: true,
                    stackable: kind == EffectKind::Poisoned,
                },
            );
        }

        let mut races = BTreeMap::new();
        races.insert(
            Race::Human,
            RaceConfig {
                racial: None,
                racial_uses: 0,
                passive_damage_scaler: 1.1,
                stone_armor: None,
            },
        );
        races.insert(
            Race::Orc,
            RaceConfig {
                racial: Some(AbilityKind::BloodRage),
                racial_uses: 1,
                passive_damage_scaler: 1.0,
                stone_armor: None,
            },
        );
        races.insert(
            Race::Dwarf,
            RaceConfig {
                racial: Some(AbilityKind::Undying),
                racial_uses: 1,
                passive_damage_scaler: 1.0,
                stone_armor: Some(6),
            },
        );
        races.insert(
            Race::Elf,
            RaceConfig {
                racial: Some(AbilityKind::Fade),
                racial_uses: 1,
                passive_damage_scaler: 1.0,
                stone_armor: None,
            },
        );

        Self {
            abilities,
            effects,
            races,
            balance: BalanceConfig::default(),
        }
    }

    /// Looks up the tuning entry for an ability.
    pub fn ability(&self, kind: AbilityKind) -> Result<&AbilityConfig, ConfigError> {
        self.abilities
            .get(&kind)
            .ok_or(ConfigError::UnknownAbility(kind))
    }

    /// Stacking behavior for an effect kind. Unlisted kinds fall back to
    /// refreshable and non-stacking.
    #[must_use]
    pub fn effect_defaults(&self, kind: EffectKind) -> EffectDefaults {
        self.effects.get(&kind).copied().unwrap_or_default()
    }

    /// Overrides whether an effect kind refreshes while active.
    pub fn set_effect_refreshable(&mut self, kind: EffectKind, refreshable: bool) {
        self.effects.entry(kind).or_default().refreshable = refreshable;
    }

    /// Tuning for a race. Unlisted races fall back to a blank entry.
    #[must_use]
    pub fn race(&self, race: Race) -> RaceConfig {
        self.races.get(&race).cloned().unwrap_or_default()
    }

    /// The global balance knobs.
    #[must_use]
    pub const fn balance(&self) -> &BalanceConfig {
        &self.balance
    }

    /// The balance knobs, mutable for scenario tuning.
    pub fn balance_mut(&mut self) -> &mut BalanceConfig {
        &mut self.balance
    }

    /// Abilities unlocked at `level`, in resolution order.
    #[must_use]
    pub fn unlocked_at(&self, level: u32) -> Vec<AbilityKind> {
        let mut kinds: Vec<_> = self
            .abilities
            .values()
            .filter(|ability| ability.unlock_at <= level)
            .collect();
        kinds.sort_by_key(|ability| ability.order);
        kinds.into_iter().map(|ability| ability.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod lookup_tests {
        use super::*;

        #[test]
        fn every_ability_kind_has_an_entry() {
            let config = GameConfig::standard();
            for kind in AbilityKind::ALL {
                assert!(config.ability(kind).is_ok(), "missing entry for {kind}");
            }
        }

        #[test]
        fn poison_is_the_only_stackable_effect() {
            let config = GameConfig::standard();
            for kind in crate::effects::TICK_ORDER {
                let defaults = config.effect_defaults(kind);
                assert_eq!(defaults.stackable, kind == EffectKind::Poisoned);
                assert!(defaults.refreshable);
            }
        }

        #[test]
        fn unlock_levels_gate_the_ability_set() {
            let config = GameConfig::standard();
            let at_one = config.unlocked_at(1);
            assert!(at_one.contains(&AbilityKind::Strike));
            assert!(at_one.contains(&AbilityKind::Heal));
            assert!(!at_one.contains(&AbilityKind::Fireball));

            let at_four = config.unlocked_at(4);
            assert!(at_four.contains(&AbilityKind::Bash));
        }

        #[test]
        fn races_carry_their_racials() {
            let config = GameConfig::standard();
            assert_eq!(config.race(Race::Orc).racial, Some(AbilityKind::BloodRage));
            assert_eq!(config.race(Race::Dwarf).stone_armor, Some(6));
            assert!((config.race(Race::Human).passive_damage_scaler - 1.1).abs() < 1e-9);
            assert_eq!(config.race(Race::Human).racial, None);
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn standard_config_roundtrips() {
            let config = GameConfig::standard();
            let json = serde_json::to_string(&config).unwrap();
            let back: GameConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(config, back);
        }
    }
}
