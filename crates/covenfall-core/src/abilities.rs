//! Ability kinds, handlers, and the dispatch table.
//!
//! Each ability resolves through an [`AbilityHandler`] registered in the
//! [`AbilityResolver`]. Handlers receive a [`ResolveCtx`] with mutable
//! access to the roster, the monster, and the round log; they read the
//! tuning numbers from the [`AbilityConfig`] entry rather than hardcoding
//! them. A handler failure is contained: the dispatcher logs it, tells the
//! actor privately, and the round carries on for everyone else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::combat;
use crate::config::{AbilityConfig, GameConfig, RiderConfig};
use crate::effects::{EffectKind, StatusEffect};
use crate::error::ExecutionError;
use crate::log::{LogEntry, LogKind, RoundLog};
use crate::player::{PlayerId, Roster};
use crate::round::MonsterState;

// ============================================================================
// Kinds
// ============================================================================

/// The closed set of abilities, class and racial.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AbilityKind {
    /// Basic attack.
    Strike,
    /// Attack that leaves poison behind.
    PoisonStrike,
    /// Heavy attack that leaves the target vulnerable.
    Fireball,
    /// Light attack that stuns.
    Bash,
    /// Weakens the target's outgoing damage.
    Curse,
    /// Direct heal.
    Heal,
    /// Healing over time.
    Regrowth,
    /// Temporary bonus armor.
    ShieldWall,
    /// Orc racial: doubles the next damaging ability.
    BloodRage,
    /// Dwarf racial: a large one-shot self-heal.
    Undying,
    /// Elf racial: a short invisibility.
    Fade,
}

impl AbilityKind {
    /// Every ability kind, class abilities first.
    pub const ALL: [Self; 11] = [
        Self::Strike,
        Self::PoisonStrike,
        Self::Fireball,
        Self::Bash,
        Self::Curse,
        Self::Heal,
        Self::Regrowth,
        Self::ShieldWall,
        Self::BloodRage,
        Self::Undying,
        Self::Fade,
    ];

    /// Returns `true` for race-bound abilities.
    #[must_use]
    pub const fn is_racial(self) -> bool {
        matches!(self, Self::BloodRage | Self::Undying | Self::Fade)
    }
}

impl fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strike => write!(f, "Strike"),
            Self::PoisonStrike => write!(f, "Poison Strike"),
            Self::Fireball => write!(f, "Fireball"),
            Self::Bash => write!(f, "Bash"),
            Self::Curse => write!(f, "Curse"),
            Self::Heal => write!(f, "Heal"),
            Self::Regrowth => write!(f, "Regrowth"),
            Self::ShieldWall => write!(f, "Shield Wall"),
            Self::BloodRage => write!(f, "Blood Rage"),
            Self::Undying => write!(f, "Undying"),
            Self::Fade => write!(f, "Fade"),
        }
    }
}

// ============================================================================
// Resolution context
// ============================================================================

/// Everything a handler may touch while resolving one ability.
pub struct ResolveCtx<'a> {
    /// All players, keyed by id.
    pub roster: &'a mut Roster,
    /// The monster, when the scenario has one.
    pub monster: &'a mut Option<MonsterState>,
    /// Tuning tables.
    pub config: &'a GameConfig,
    /// Round log being assembled.
    pub log: &'a mut RoundLog,
    /// Current round number.
    pub round: u64,
    /// Coordination multiplier for this actor's damage (1.0 when alone).
    pub coordination: f64,
}

impl ResolveCtx<'_> {
    fn actor(&self, id: &PlayerId) -> Result<&crate::player::Player, ExecutionError> {
        self.roster
            .get(id)
            .ok_or_else(|| ExecutionError::ActorMissing(id.to_string()))
    }

    fn target_mut(
        &mut self,
        id: &PlayerId,
    ) -> Result<&mut crate::player::Player, ExecutionError> {
        self.roster
            .get_mut(id)
            .ok_or_else(|| ExecutionError::TargetMissing(id.to_string()))
    }
}

/// Builds the status effect a rider entry describes.
fn rider_effect(rider: &RiderConfig, source: &PlayerId, scaled_power: u32) -> StatusEffect {
    let turns = rider.turns;
    match rider.kind {
        EffectKind::Poisoned => StatusEffect::poison(scaled_power, turns, Some(source.clone())),
        EffectKind::HealingOverTime => {
            StatusEffect::regen(scaled_power, turns, Some(source.clone()))
        }
        EffectKind::Shielded => StatusEffect::shield(rider.power, turns, Some(source.clone())),
        EffectKind::Invisible => StatusEffect::invisible(turns),
        EffectKind::Stunned => StatusEffect::stun(turns, Some(source.clone())),
        EffectKind::Vulnerable => {
            StatusEffect::vulnerable(rider.scale, turns, Some(source.clone()))
        }
        EffectKind::Weakened => StatusEffect::weakened(rider.scale, turns, Some(source.clone())),
        EffectKind::Enraged => StatusEffect::enraged(rider.scale, turns),
    }
}

/// Resolves a damaging hit against a player target or the monster, then
/// attaches the ability's rider on player targets. The monster has no
/// effect table, so riders do not stick to it.
fn resolve_hit(
    ctx: &mut ResolveCtx<'_>,
    actor_id: &PlayerId,
    target: Option<&PlayerId>,
    ability: &AbilityConfig,
) -> Result<(), ExecutionError> {
    let (raw, actor_name) = {
        let actor = ctx.actor(actor_id)?;
        (
            combat::outgoing_damage(actor, ability.damage, ctx.coordination, ctx.config),
            actor.name().to_string(),
        )
    };
    if let Some(actor) = ctx.roster.get_mut(actor_id) {
        actor.consume_blood_rage();
    }

    match target {
        Some(target_id) if !target_id.is_monster() => {
            let landed = {
                let target = ctx
                    .roster
                    .get(target_id)
                    .ok_or_else(|| ExecutionError::TargetMissing(target_id.to_string()))?;
                combat::incoming_damage(target, raw, ctx.config)
            };

            let balance = ctx.config.balance();
            let (step, floor) = (balance.stone_armor_step, balance.stone_armor_min);
            let target_p = ctx.target_mut(target_id)?;
            let shattered = target_p.degrade_stone_armor(step, floor);
            let outcome = target_p.take_damage(landed);
            let target_name = target_p.name().to_string();

            ctx.log.push(
                LogEntry::new(
                    LogKind::Damage,
                    format!(
                        "{actor_name} hits {target_name} with {} for {} damage",
                        ability.kind, outcome.actual
                    ),
                )
                .with_attacker(actor_id.clone())
                .with_target(target_id.clone()),
            );
            if shattered {
                ctx.log.push(
                    LogEntry::new(
                        LogKind::Effect,
                        format!("{target_name}'s stone armor shatters"),
                    )
                    .with_target(target_id.clone()),
                );
            }
            if outcome.died {
                ctx.log.push(
                    LogEntry::new(LogKind::Death, format!("{target_name} has fallen"))
                        .with_target(target_id.clone()),
                );
            }

            if let Some(rider) = &ability.rider {
                if !outcome.died {
                    apply_rider(ctx, actor_id, target_id, rider)?;
                }
            }
        }
        _ => {
            let landed = {
                let balance = ctx.config.balance();
                (raw.floor().max(0.0) as u32).max(balance.min_damage)
            };
            let monster = ctx
                .monster
                .as_mut()
                .ok_or(ExecutionError::MonsterMissing)?;
            let died = monster.take_damage(landed);

            ctx.log.push(
                LogEntry::new(
                    LogKind::Damage,
                    format!(
                        "{actor_name} hits the monster with {} for {landed} damage",
                        ability.kind
                    ),
                )
                .with_attacker(actor_id.clone()),
            );
            if died {
                ctx.log
                    .push(LogEntry::new(LogKind::Death, "the monster is slain"));
            }
        }
    }

    Ok(())
}

/// Applies a rider effect to a living player target.
fn apply_rider(
    ctx: &mut ResolveCtx<'_>,
    actor_id: &PlayerId,
    target_id: &PlayerId,
    rider: &RiderConfig,
) -> Result<(), ExecutionError> {
    let scaled_power = match rider.kind {
        // Healing riders scale with the caster like direct heals do.
        EffectKind::HealingOverTime => {
            let actor = ctx.actor(actor_id)?;
            combat::outgoing_heal(actor, rider.power.max(0) as u32, ctx.config)
        }
        _ => rider.power.max(0) as u32,
    };
    let effect = rider_effect(rider, actor_id, scaled_power);
    let kind = effect.kind();

    let round = ctx.round;
    let config = ctx.config;
    let target = ctx.target_mut(target_id)?;
    if !target.is_alive() {
        return Ok(());
    }
    target.effects_mut().apply(effect, config, round);
    let target_name = target.name().to_string();

    ctx.log.push(
        LogEntry::new(LogKind::Effect, format!("{target_name} is {kind}"))
            .with_target(target_id.clone()),
    );
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Resolves one ability kind.
pub trait AbilityHandler: Send + Sync {
    /// The kind this handler resolves.
    fn kind(&self) -> AbilityKind;

    /// Applies the ability's outcome to the context.
    fn resolve(
        &self,
        actor: &PlayerId,
        target: Option<&PlayerId>,
        ability: &AbilityConfig,
        ctx: &mut ResolveCtx<'_>,
    ) -> Result<(), ExecutionError>;
}

/// Damaging abilities share one handler; the config entry carries the
/// numbers and the rider that distinguish them.
struct HitHandler(AbilityKind);

impl AbilityHandler for HitHandler {
    fn kind(&self) -> AbilityKind {
        self.0
    }

    fn resolve(
        &self,
        actor: &PlayerId,
        target: Option<&PlayerId>,
        ability: &AbilityConfig,
        ctx: &mut ResolveCtx<'_>,
    ) -> Result<(), ExecutionError> {
        resolve_hit(ctx, actor, target, ability)
    }
}

struct HealHandler;

impl AbilityHandler for HealHandler {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Heal
    }

    fn resolve(
        &self,
        actor: &PlayerId,
        target: Option<&PlayerId>,
        ability: &AbilityConfig,
        ctx: &mut ResolveCtx<'_>,
    ) -> Result<(), ExecutionError> {
        let target_id = target.unwrap_or(actor).clone();
        let (amount, actor_name) = {
            let actor_p = ctx.actor(actor)?;
            (
                combat::outgoing_heal(actor_p, ability.heal, ctx.config),
                actor_p.name().to_string(),
            )
        };

        let target_p = ctx.target_mut(&target_id)?;
        let outcome = target_p.heal(amount);
        let target_name = target_p.name().to_string();

        ctx.log.push(
            LogEntry::new(
                LogKind::Heal,
                format!("{actor_name} heals {target_name} for {} hp", outcome.actual),
            )
            .with_attacker(actor.clone())
            .with_target(target_id),
        );
        Ok(())
    }
}

/// Support abilities that only attach their rider (Regrowth, Shield Wall,
/// Curse, Fade).
struct RiderHandler(AbilityKind);

impl AbilityHandler for RiderHandler {
    fn kind(&self) -> AbilityKind {
        self.0
    }

    fn resolve(
        &self,
        actor: &PlayerId,
        target: Option<&PlayerId>,
        ability: &AbilityConfig,
        ctx: &mut ResolveCtx<'_>,
    ) -> Result<(), ExecutionError> {
        let target_id = target.unwrap_or(actor).clone();
        let Some(rider) = &ability.rider else {
            return Ok(());
        };
        apply_rider(ctx, actor, &target_id, rider)
    }
}

struct BloodRageHandler;

impl AbilityHandler for BloodRageHandler {
    fn kind(&self) -> AbilityKind {
        AbilityKind::BloodRage
    }

    fn resolve(
        &self,
        actor: &PlayerId,
        _target: Option<&PlayerId>,
        _ability: &AbilityConfig,
        ctx: &mut ResolveCtx<'_>,
    ) -> Result<(), ExecutionError> {
        let actor_p = ctx.target_mut(actor).map_err(|_| {
            ExecutionError::ActorMissing(actor.to_string())
        })?;
        actor_p.arm_blood_rage();
        let name = actor_p.name().to_string();

        ctx.log.push(
            LogEntry::new(LogKind::Action, format!("{name} is consumed by blood rage"))
                .with_attacker(actor.clone()),
        );
        Ok(())
    }
}

struct UndyingHandler;

impl AbilityHandler for UndyingHandler {
    fn kind(&self) -> AbilityKind {
        AbilityKind::Undying
    }

    fn resolve(
        &self,
        actor: &PlayerId,
        _target: Option<&PlayerId>,
        ability: &AbilityConfig,
        ctx: &mut ResolveCtx<'_>,
    ) -> Result<(), ExecutionError> {
        let actor_p = ctx.target_mut(actor).map_err(|_| {
            ExecutionError::ActorMissing(actor.to_string())
        })?;
        // Flat racial heal; level scaling does not apply.
        let outcome = actor_p.heal(ability.heal);
        let name = actor_p.name().to_string();

        ctx.log.push(
            LogEntry::new(
                LogKind::Heal,
                format!("{name} refuses to fall, recovering {} hp", outcome.actual),
            )
            .with_attacker(actor.clone()),
        );
        Ok(())
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Registry mapping ability kinds to their handlers.
pub struct AbilityResolver {
    handlers: BTreeMap<AbilityKind, Box<dyn AbilityHandler>>,
}

impl AbilityResolver {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Registry covering the standard ability set.
    #[must_use]
    pub fn standard() -> Self {
        let mut resolver = Self::new();
        for kind in [
            AbilityKind::Strike,
            AbilityKind::PoisonStrike,
            AbilityKind::Fireball,
            AbilityKind::Bash,
        ] {
            resolver.register(Box::new(HitHandler(kind)));
        }
        for kind in [
            AbilityKind::Curse,
            AbilityKind::Regrowth,
            AbilityKind::ShieldWall,
            AbilityKind::Fade,
        ] {
            resolver.register(Box::new(RiderHandler(kind)));
        }
        resolver.register(Box::new(HealHandler));
        resolver.register(Box::new(BloodRageHandler));
        resolver.register(Box::new(UndyingHandler));
        resolver
    }

    /// Registers a handler, replacing any existing one for its kind.
    pub fn register(&mut self, handler: Box<dyn AbilityHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    /// Returns `true` when a handler is registered for `kind`.
    #[must_use]
    pub fn handles(&self, kind: AbilityKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Resolves one ability, containing failures.
    ///
    /// Returns `true` when the handler ran to completion. An unregistered
    /// kind or a handler error produces a private apology in the log and
    /// `false`; neither aborts the round.
    pub fn execute(
        &self,
        kind: AbilityKind,
        actor: &PlayerId,
        target: Option<&PlayerId>,
        ability: &AbilityConfig,
        ctx: &mut ResolveCtx<'_>,
    ) -> bool {
        let Some(handler) = self.handlers.get(&kind) else {
            tracing::warn!(ability = %kind, actor = %actor, "no handler registered");
            ctx.log.push(
                LogEntry::new(LogKind::System, format!("{kind} fizzles"))
                    .private()
                    .with_target(actor.clone()),
            );
            return false;
        };

        match handler.resolve(actor, target, ability, ctx) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(ability = %kind, actor = %actor, error = %err, "ability resolution failed");
                let message = if kind.is_racial() {
                    "your racial ability failed to resolve"
                } else {
                    "your ability failed to resolve"
                };
                ctx.log.push(
                    LogEntry::new(LogKind::System, message)
                        .private()
                        .with_target(actor.clone()),
                );
                false
            }
        }
    }
}

impl Default for AbilityResolver {
    fn default() -> Self {
        Self::standard()
    }
}
