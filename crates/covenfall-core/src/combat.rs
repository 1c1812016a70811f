//! The damage and healing pipelines.
//!
//! Damage crosses two stages. The outgoing stage belongs to the attacker:
//! level scaling, Blood Rage, race passives, rage and coordination
//! multipliers, then the weakness cut. The incoming stage belongs to the
//! defender: the vulnerability multiplier, then armor mitigation with a
//! final floor. The hand-off between stages is an `f64` so fractional
//! modifiers compose without intermediate rounding; the only truncation
//! happens once, inside [`incoming_damage`].
//!
//! Armor reduction is linear in effective armor and clamped to
//! `[-2.0, max_armor_reduction]`. The negative end matters: a player whose
//! stone armor has gone negative takes amplified damage, up to three times
//! the raw hit.

use crate::config::{BalanceConfig, GameConfig};
use crate::player::{CombatFlags, Player};

/// Attacker-side damage: base ability damage through every outgoing
/// modifier. Reads the Blood Rage flag but never consumes it; the caller
/// clears it after a damaging ability lands.
#[must_use]
pub fn outgoing_damage(actor: &Player, base: u32, coordination: f64, config: &GameConfig) -> f64 {
    let mut amount = f64::from(base) * actor.damage_mod(config);

    if actor.flags().contains(CombatFlags::BLOOD_RAGE) {
        amount *= 2.0;
    }

    amount *= config.race(actor.race()).passive_damage_scaler;
    amount *= actor.effects().fury_multiplier();
    amount *= coordination;

    // Weakness cuts last, so it scales the fully boosted total.
    amount * actor.effects().weakness_multiplier()
}

/// Defender-side damage: vulnerability, then armor mitigation.
#[must_use]
pub fn incoming_damage(target: &Player, raw: f64, config: &GameConfig) -> u32 {
    let amplified = raw * target.effects().incoming_multiplier();
    mitigate(amplified, target.effective_armor(), config.balance())
}

/// Applies linear armor mitigation and the damage floor.
///
/// `reduction = clamp(armor * rate, -2.0, max_reduction)`, then the result
/// is truncated and floored at `min_damage`. Every hit that reaches this
/// point lands for at least the minimum.
#[must_use]
pub fn mitigate(raw: f64, armor: i32, balance: &BalanceConfig) -> u32 {
    let reduction = (f64::from(armor) * balance.armor_reduction_rate)
        .clamp(-2.0, balance.max_armor_reduction);
    let landed = (raw * (1.0 - reduction)).floor().max(0.0) as u32;
    landed.max(balance.min_damage)
}

/// Healer-side scaling: base healing through the level modifier.
#[must_use]
pub fn outgoing_heal(actor: &Player, base: u32, config: &GameConfig) -> u32 {
    (f64::from(base) * actor.healing_mod(config)).floor() as u32
}
