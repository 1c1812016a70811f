//! Round orchestration.
//!
//! A round moves through fixed phases:
//!
//! 1. **Re-validation**: every pending submission is checked against the
//!    world as it stands now. Stale submissions are invalidated in place,
//!    never silently dropped, and the actor is told privately.
//! 2. **Resolution**: valid submissions resolve in ascending ability
//!    order, ties broken by actor id. Stunned actors forfeit their action
//!    with a log; actors who died earlier in the phase are skipped.
//! 3. **Effect tick**: per player, in id order, effects process in the
//!    fixed kind order. Poison and healing apply their side effect first
//!    and then lose a turn; every other kind loses a turn first and is
//!    removed when it hits zero.
//! 4. **Cooldowns** advance and every action slot clears for the next
//!    round.
//!
//! Identical inputs and the same detection seed replay identical rounds,
//! logs included. Nothing in the pipeline iterates a hash map.
//!
//! # Example
//!
//! ```
//! use covenfall_core::round::RoundEngine;
//! use covenfall_core::config::GameConfig;
//! use covenfall_core::player::{Player, PlayerId, Race};
//! use covenfall_core::abilities::AbilityKind;
//!
//! let mut engine = RoundEngine::with_seed(GameConfig::standard(), 7);
//! engine.register(Player::new(PlayerId::new("korga"), "Korga", Race::Orc, 1));
//! engine.set_monster(60);
//!
//! engine
//!     .submit_action(&PlayerId::new("korga"), AbilityKind::Strike, None)
//!     .unwrap();
//! let result = engine.run_round();
//!
//! assert_eq!(result.round, 1);
//! assert_eq!(result.monster.unwrap().hp(), 50);
//! ```

use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityKind, AbilityResolver, ResolveCtx};
use crate::config::{GameConfig, TargetShape};
use crate::detection::WarlockDetector;
use crate::effects::{EffectKind, StatusEffect};
use crate::error::{InvalidationReason, ValidationError};
use crate::log::{LogEntry, LogKind, RoundLog};
use crate::player::{Player, PlayerId, Roster};
use crate::submission::SubmitChecks;
use crate::view::PlayerView;

// ============================================================================
// Monster
// ============================================================================

/// The shared monster the party fights. It has no armor, no effects, and
/// no actions of its own here; it is a hit point pool with a death state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterState {
    hp: u32,
    max_hp: u32,
    alive: bool,
}

impl MonsterState {
    /// Creates a monster at full hp.
    #[must_use]
    pub fn new(hp: u32) -> Self {
        Self {
            hp,
            max_hp: hp,
            alive: hp > 0,
        }
    }

    /// Current hp.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Maximum hp.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Returns `true` while the monster stands.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Removes hp, saturating at zero. Returns `true` on the killing blow.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        self.hp = self.hp.saturating_sub(amount);
        let died = self.alive && self.hp == 0;
        if died {
            self.alive = false;
        }
        died
    }
}

// ============================================================================
// Results and snapshots
// ============================================================================

/// Everything a round produced: the log and the post-round world views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// The round that was resolved.
    pub round: u64,
    /// Log entries in emission order.
    pub entries: Vec<LogEntry>,
    /// Post-round player projections, in id order.
    pub players: Vec<PlayerView>,
    /// Post-round monster state, when one is present.
    pub monster: Option<MonsterState>,
}

/// Serializable image of the whole engine, for reconnects and saves.
///
/// The detection generator is not captured; restoring takes a fresh seed,
/// so a restored engine replays state but not the future roll sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Round counter at capture time.
    pub round: u64,
    /// Full roster, transient containers included.
    pub players: Roster,
    /// Monster state at capture time.
    pub monster: Option<MonsterState>,
    /// The tuning tables the engine was running with.
    pub config: GameConfig,
}

// ============================================================================
// Engine
// ============================================================================

/// The round resolution engine.
pub struct RoundEngine {
    players: Roster,
    monster: Option<MonsterState>,
    resolver: AbilityResolver,
    detector: WarlockDetector,
    config: GameConfig,
    round: u64,
}

impl RoundEngine {
    /// Creates an engine with entropy-seeded detection.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let detector = WarlockDetector::new(config.balance().detection_chance);
        Self::assemble(config, detector)
    }

    /// Creates an engine whose detection rolls replay under `seed`.
    #[must_use]
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        let detector = WarlockDetector::with_seed(config.balance().detection_chance, seed);
        Self::assemble(config, detector)
    }

    /// Rebuilds an engine from a snapshot with a fresh detection seed.
    #[must_use]
    pub fn from_snapshot(snapshot: EngineSnapshot, seed: u64) -> Self {
        let detector =
            WarlockDetector::with_seed(snapshot.config.balance().detection_chance, seed);
        Self {
            players: snapshot.players,
            monster: snapshot.monster,
            resolver: AbilityResolver::standard(),
            detector,
            config: snapshot.config,
            round: snapshot.round,
        }
    }

    fn assemble(config: GameConfig, detector: WarlockDetector) -> Self {
        Self {
            players: Roster::new(),
            monster: None,
            resolver: AbilityResolver::standard(),
            detector,
            config,
            round: 1,
        }
    }

    /// Adds a player, applying race tuning (stone armor pool, racial uses)
    /// from configuration.
    pub fn register(&mut self, player: Player) {
        let race = self.config.race(player.race());
        let mut player = player.with_racial_uses(race.racial_uses);
        if let Some(pool) = race.stone_armor {
            player = player.with_stone_armor(pool);
        }
        self.players.insert(player.id().clone(), player);
    }

    /// Spawns the monster at `hp`, replacing any existing one.
    pub fn set_monster(&mut self, hp: u32) {
        self.monster = Some(MonsterState::new(hp));
    }

    /// Returns a player by id.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Returns a player mutably, for setup and out-of-round adjustments.
    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Returns the monster, if one is present.
    #[must_use]
    pub const fn monster(&self) -> Option<&MonsterState> {
        self.monster.as_ref()
    }

    /// The round about to be resolved, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u64 {
        self.round
    }

    /// Captures the engine state for a save or a reconnecting client.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            round: self.round,
            players: self.players.clone(),
            monster: self.monster.clone(),
            config: self.config.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Parks an action for the current round.
    ///
    /// Validates eagerly: the actor must exist and be alive, the ability
    /// must be unlocked (racials additionally require the matching race
    /// with uses left), a target must be named when the shape demands one,
    /// and the ability must be off cooldown. The slot rejects a second
    /// submission in the same round.
    pub fn submit_action(
        &mut self,
        actor: &PlayerId,
        ability: AbilityKind,
        target: Option<PlayerId>,
    ) -> Result<(), ValidationError> {
        let round = self.round;
        let Some(player) = self.players.get(actor) else {
            return Err(ValidationError::UnknownPlayer);
        };
        if !player.is_alive() {
            return Err(ValidationError::PlayerDead);
        }
        let Ok(entry) = self.config.ability(ability) else {
            return Err(ValidationError::AbilityNotUnlocked(ability));
        };

        let unlocked = if ability.is_racial() {
            self.config.race(player.race()).racial == Some(ability)
                && player.racial_uses() > 0
        } else {
            entry.unlock_at <= player.level()
        };
        if entry.target == TargetShape::Player && target.is_none() {
            return Err(ValidationError::NoTarget);
        }
        let checks = SubmitChecks {
            unlocked,
            cooldown_remaining: player.cooldowns().remaining(ability),
            round,
        };

        let Some(player) = self.players.get_mut(actor) else {
            return Err(ValidationError::UnknownPlayer);
        };
        player.slot_mut().submit(ability, target, checks)
    }

    // ------------------------------------------------------------------
    // Round pipeline
    // ------------------------------------------------------------------

    /// Resolves the current round and advances to the next.
    pub fn run_round(&mut self) -> RoundResult {
        let mut log = RoundLog::new();
        let round = self.round;

        tracing::debug!(round, "revalidating submissions");
        self.revalidate(&mut log);
        tracing::debug!(round, "resolving actions");
        self.resolve_actions(&mut log);
        tracing::debug!(round, "ticking effects");
        self.tick_effects(&mut log);

        for player in self.players.values_mut() {
            player.cooldowns_mut().decrement_all();
            player.slot_mut().clear();
        }
        self.round += 1;

        RoundResult {
            round,
            entries: log.into_entries(),
            players: self.players.values().map(PlayerView::of).collect(),
            monster: self.monster.clone(),
        }
    }

    /// Phase 1: invalidate submissions the world has outrun.
    ///
    /// Every eligibility gate from submit time is checked again here, so
    /// an ability that went on cooldown or locked between submission and
    /// resolution fizzles instead of resolving.
    fn revalidate(&mut self, log: &mut RoundLog) {
        let round = self.round;
        let ids: Vec<PlayerId> = self.players.keys().cloned().collect();
        for id in ids {
            let Some((kind, target)) = self.players.get(&id).and_then(|player| {
                player
                    .slot()
                    .pending()
                    .filter(|submission| submission.is_valid())
                    .map(|submission| (submission.ability(), submission.target().cloned()))
            }) else {
                continue;
            };

            let reason = match self.config.ability(kind) {
                Ok(entry) => self
                    .check_availability(&id, kind, entry.unlock_at)
                    .or_else(|| self.check_target(entry.target, target.as_ref())),
                Err(_) => Some(InvalidationReason::AbilityNotUnlocked),
            };
            let Some(reason) = reason else {
                continue;
            };

            if let Some(player) = self.players.get_mut(&id) {
                player.slot_mut().invalidate(reason, round);
            }
            log.push(
                LogEntry::new(LogKind::System, format!("{kind} fizzles: {reason}"))
                    .private()
                    .with_target(id),
            );
        }
    }

    fn check_availability(
        &self,
        actor: &PlayerId,
        kind: AbilityKind,
        unlock_at: u32,
    ) -> Option<InvalidationReason> {
        let player = self.players.get(actor)?;
        let unlocked = if kind.is_racial() {
            self.config.race(player.race()).racial == Some(kind) && player.racial_uses() > 0
        } else {
            unlock_at <= player.level()
        };
        if !unlocked {
            return Some(InvalidationReason::AbilityNotUnlocked);
        }
        if player.cooldowns().is_on_cooldown(kind) {
            return Some(InvalidationReason::AbilityOnCooldown);
        }
        None
    }

    fn check_target(
        &self,
        shape: TargetShape,
        target: Option<&PlayerId>,
    ) -> Option<InvalidationReason> {
        match shape {
            TargetShape::SelfOnly => None,
            TargetShape::Player => match target {
                Some(id) if !id.is_monster() => self.check_player_target(id),
                _ => Some(InvalidationReason::TargetMissing),
            },
            TargetShape::PlayerOrMonster => match target {
                Some(id) if !id.is_monster() => self.check_player_target(id),
                _ => match &self.monster {
                    None => Some(InvalidationReason::TargetMissing),
                    Some(monster) if !monster.is_alive() => {
                        Some(InvalidationReason::TargetDead)
                    }
                    Some(_) => None,
                },
            },
        }
    }

    fn check_player_target(&self, id: &PlayerId) -> Option<InvalidationReason> {
        match self.players.get(id) {
            None => Some(InvalidationReason::TargetMissing),
            Some(target) if !target.is_alive() => Some(InvalidationReason::TargetDead),
            Some(target) if target.is_untargetable() => {
                Some(InvalidationReason::TargetUntargetable)
            }
            Some(_) => None,
        }
    }

    /// Phase 2: resolve valid submissions in (ability order, actor id)
    /// order.
    fn resolve_actions(&mut self, log: &mut RoundLog) {
        let mut actions: Vec<(u32, PlayerId, AbilityKind, Option<PlayerId>)> = Vec::new();
        for (id, player) in &self.players {
            if !player.is_alive() {
                continue;
            }
            let Some(submission) = player.slot().pending() else {
                continue;
            };
            if !submission.is_valid() {
                continue;
            }
            let Ok(entry) = self.config.ability(submission.ability()) else {
                continue;
            };
            actions.push((
                entry.order,
                id.clone(),
                submission.ability(),
                submission.target().cloned(),
            ));
        }
        actions.sort();

        for action in &actions {
            let (_, id, kind, target) = action.clone();
            let (alive, stunned, name) = match self.players.get(&id) {
                Some(player) => (
                    player.is_alive(),
                    player.is_stunned(),
                    player.name().to_string(),
                ),
                None => continue,
            };
            if !alive {
                continue;
            }
            if stunned {
                log.push(
                    LogEntry::new(LogKind::Action, format!("{name} is stunned and cannot act"))
                        .with_target(id.clone()),
                );
                continue;
            }
            if self
                .players
                .get_mut(&id)
                .and_then(|player| player.slot_mut().consume())
                .is_none()
            {
                continue;
            }
            let ability = match self.config.ability(kind) {
                Ok(entry) => entry.clone(),
                Err(_) => continue,
            };

            let coordination = if ability.damage > 0 {
                let key = target.clone().unwrap_or_else(PlayerId::monster);
                let count = self.coordinated_attackers(&actions, &id, &key);
                1.0 + self.config.balance().coordination_bonus
                    * f64::from(count.saturating_sub(1))
            } else {
                1.0
            };

            let round = self.round;
            let Self {
                ref mut players,
                ref mut monster,
                ref resolver,
                ref config,
                ..
            } = *self;
            let mut ctx = ResolveCtx {
                roster: &mut *players,
                monster: &mut *monster,
                config,
                log: &mut *log,
                round,
                coordination,
            };
            let ok = resolver.execute(kind, &id, target.as_ref(), &ability, &mut ctx);
            if ok {
                if let Some(player) = players.get_mut(&id) {
                    player.cooldowns_mut().put(kind, ability.cooldown);
                    if kind.is_racial() {
                        player.spend_racial_use();
                    }
                }
            }
        }
    }

    /// Counts the attackers converging on `key` whose actions still stand.
    ///
    /// An attacker who died or was stunned before acting forfeits their
    /// action, so they never feed the coordination bonus of those who do
    /// land a hit.
    fn coordinated_attackers(
        &self,
        actions: &[(u32, PlayerId, AbilityKind, Option<PlayerId>)],
        actor: &PlayerId,
        key: &PlayerId,
    ) -> u32 {
        let mut count = 0;
        for (_, id, kind, target) in actions {
            if &target.clone().unwrap_or_else(PlayerId::monster) != key {
                continue;
            }
            let Ok(entry) = self.config.ability(*kind) else {
                continue;
            };
            if entry.damage == 0 {
                continue;
            }
            let standing = id == actor
                || self
                    .players
                    .get(id)
                    .is_some_and(|player| player.is_alive() && !player.is_stunned());
            if standing {
                count += 1;
            }
        }
        count
    }

    /// Phase 3: tick active effects per living player, in id order.
    fn tick_effects(&mut self, log: &mut RoundLog) {
        let ids: Vec<PlayerId> = self.players.keys().cloned().collect();
        let Self {
            ref mut players,
            ref mut detector,
            ref config,
            ..
        } = *self;
        let balance = config.balance();

        for id in &ids {
            let Some(player) = players.get_mut(id) else {
                continue;
            };
            if !player.is_alive() {
                continue;
            }

            // Poison: damage lands, then the counter drops.
            let poison = player
                .effects()
                .get(EffectKind::Poisoned)
                .map(StatusEffect::poison_damage);
            if let Some(damage) = poison {
                let shattered =
                    player.degrade_stone_armor(balance.stone_armor_step, balance.stone_armor_min);
                let outcome = player.take_damage(damage);
                let name = player.name().to_string();
                log.push(
                    LogEntry::new(
                        LogKind::Damage,
                        format!("{name} suffers {} poison damage", outcome.actual),
                    )
                    .with_target(id.clone()),
                );
                if shattered {
                    log.push(
                        LogEntry::new(
                            LogKind::Effect,
                            format!("{name}'s stone armor shatters"),
                        )
                        .with_target(id.clone()),
                    );
                }
                if outcome.died {
                    log.push(
                        LogEntry::new(LogKind::Death, format!("{name} succumbs to poison"))
                            .with_target(id.clone()),
                    );
                    // Death wiped the table; nothing left to tick.
                    continue;
                }
                if let Some(effect) = player.effects_mut().get_mut(EffectKind::Poisoned) {
                    effect.decrement();
                    if effect.is_expired() {
                        player.effects_mut().remove(EffectKind::Poisoned);
                        log.push(
                            LogEntry::new(
                                LogKind::Effect,
                                format!("{name} is no longer {}", EffectKind::Poisoned),
                            )
                            .with_target(id.clone()),
                        );
                    }
                }
            }

            // Healing over time: the heal lands, detection may fire, then
            // the counter drops.
            let regen = player
                .effects()
                .get(EffectKind::HealingOverTime)
                .map(|effect| (effect.regen_amount(), effect.source().cloned()));
            if let Some((amount, healer)) = regen {
                let outcome = player.heal(amount);
                let name = player.name().to_string();
                log.push(
                    LogEntry::new(
                        LogKind::Heal,
                        format!("{name} recovers {} hp", outcome.actual),
                    )
                    .with_private(format!("you regenerate {} hp", outcome.actual))
                    .with_target(id.clone()),
                );

                // One roll per qualifying tick, no more and no less, so a
                // seeded run replays the same reveal round.
                if outcome.actual > 0 && player.is_warlock() && !player.role_revealed() {
                    if let Some(healer) = healer.filter(|healer| healer != id) {
                        if detector.roll() {
                            player.reveal_role();
                            // The reveal is broadcast; the healed player and
                            // the healer each get their own wording.
                            log.push(
                                LogEntry::new(
                                    LogKind::Detection,
                                    format!("{name} is revealed as a warlock"),
                                )
                                .with_private("the dark taint within you is exposed")
                                .with_attacker_message(format!(
                                    "your healing uncovers a dark taint in {name}"
                                ))
                                .with_attacker(healer)
                                .with_target(id.clone()),
                            );
                        }
                    }
                }

                if let Some(effect) = player.effects_mut().get_mut(EffectKind::HealingOverTime) {
                    effect.decrement();
                    if effect.is_expired() {
                        player.effects_mut().remove(EffectKind::HealingOverTime);
                        log.push(
                            LogEntry::new(
                                LogKind::Effect,
                                format!("{name} is no longer {}", EffectKind::HealingOverTime),
                            )
                            .with_target(id.clone()),
                        );
                    }
                }
            }

            // Remaining kinds: the counter drops first, expiry follows.
            for kind in [
                EffectKind::Shielded,
                EffectKind::Invisible,
                EffectKind::Stunned,
                EffectKind::Vulnerable,
                EffectKind::Weakened,
                EffectKind::Enraged,
            ] {
                let Some(effect) = player.effects_mut().get_mut(kind) else {
                    continue;
                };
                effect.decrement();
                if !effect.is_expired() {
                    continue;
                }
                player.effects_mut().remove(kind);
                let name = player.name().to_string();
                if kind == EffectKind::Stunned {
                    // A parked action is forfeit when the stun lifts; the
                    // player re-submits next round.
                    player.slot_mut().clear();
                    log.push(
                        LogEntry::new(LogKind::Effect, format!("{name} is no longer stunned"))
                            .with_target(id.clone()),
                    );
                } else {
                    log.push(
                        LogEntry::new(LogKind::Effect, format!("{name} is no longer {kind}"))
                            .with_target(id.clone()),
                    );
                }
            }
        }
    }
}
