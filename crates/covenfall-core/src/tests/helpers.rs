//! Test setup utilities: party factories and submission shorthands.

use std::sync::Once;

use crate::abilities::AbilityKind;
use crate::config::GameConfig;
use crate::player::{Player, PlayerId, Race};
use crate::round::RoundEngine;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-writer tracing subscriber once per test binary, so
/// handler warnings surface in failing test output.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Shorthand for building a [`PlayerId`].
pub fn id(name: &str) -> PlayerId {
    PlayerId::new(name)
}

/// Builds the standard four-player test party on a seeded engine:
///
/// - `korga`: Orc, level 4
/// - `mira`: Elf, level 4
/// - `borin`: Dwarf, level 4 (stone armor pool from configuration)
/// - `vex`: Human, level 4, the hidden-role Warlock
pub fn standard_party(seed: u64) -> RoundEngine {
    standard_party_with(GameConfig::standard(), seed)
}

/// Same party as [`standard_party`], on a custom configuration.
pub fn standard_party_with(config: GameConfig, seed: u64) -> RoundEngine {
    init_logging();
    let mut engine = RoundEngine::with_seed(config, seed);
    engine.register(Player::new(id("korga"), "Korga", Race::Orc, 4));
    engine.register(Player::new(id("mira"), "Mira", Race::Elf, 4));
    engine.register(Player::new(id("borin"), "Borin", Race::Dwarf, 4));
    engine.register(Player::new(id("vex"), "Vex", Race::Human, 4).with_warlock_role());
    engine
}

/// Submits an action that the test expects to be accepted.
pub fn submit(engine: &mut RoundEngine, actor: &str, ability: AbilityKind, target: Option<&str>) {
    engine
        .submit_action(&id(actor), ability, target.map(PlayerId::new))
        .unwrap_or_else(|err| panic!("{actor} could not submit {ability}: {err}"));
}

/// Knocks a player down to an exact hp value for scenario setup.
pub fn set_hp(engine: &mut RoundEngine, player: &str, hp: u32) {
    let player_id = id(player);
    let current = engine
        .player(&player_id)
        .unwrap_or_else(|| panic!("no player {player}"))
        .hp();
    assert!(hp <= current, "set_hp only lowers hp");
    if let Some(player) = engine.player_mut(&player_id) {
        player.take_damage(current - hp);
    }
}
