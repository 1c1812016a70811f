//! Client-facing projections of engine state.
//!
//! A [`PlayerView`] is what a round result carries for each participant:
//! the numbers everyone may see, plus the Warlock marker only once the
//! role has actually been revealed. Hidden roles never leak through a
//! view; the projection reads `role_revealed`, not `is_warlock`.

use serde::{Deserialize, Serialize};

use crate::player::{Player, PlayerId, Race};

/// One active effect as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    /// Effect name, from its display form.
    pub name: String,
    /// Rounds left before expiry.
    pub remaining_turns: u32,
}

/// One cooling ability as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooldownView {
    /// Ability name, from its display form.
    pub name: String,
    /// Rounds until usable again.
    pub remaining_turns: u32,
}

/// Public projection of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Race.
    pub race: Race,
    /// Current hp.
    pub hp: u32,
    /// Maximum hp.
    pub max_hp: u32,
    /// Whether the player is alive.
    pub alive: bool,
    /// Active effects in tick order.
    pub statuses: Vec<StatusView>,
    /// Active cooldowns in ability order.
    pub cooldowns: Vec<CooldownView>,
    /// `true` only after the hidden role has been exposed.
    pub revealed_warlock: bool,
}

impl PlayerView {
    /// Projects a player into its public view.
    #[must_use]
    pub fn of(player: &Player) -> Self {
        let statuses = player
            .effects()
            .active_in_tick_order()
            .into_iter()
            .filter_map(|kind| player.effects().get(kind))
            .map(|effect| StatusView {
                name: effect.kind().to_string(),
                remaining_turns: effect.remaining_turns(),
            })
            .collect();
        let cooldowns = player
            .cooldowns()
            .iter()
            .map(|(kind, remaining)| CooldownView {
                name: kind.to_string(),
                remaining_turns: remaining,
            })
            .collect();

        Self {
            id: player.id().clone(),
            name: player.name().to_string(),
            race: player.race(),
            hp: player.hp(),
            max_hp: player.max_hp(),
            alive: player.is_alive(),
            statuses,
            cooldowns,
            revealed_warlock: player.is_warlock() && player.role_revealed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilityKind;
    use crate::config::GameConfig;
    use crate::effects::StatusEffect;

    fn player() -> Player {
        Player::new(PlayerId::new("vex"), "Vex", Race::Human, 2)
    }

    mod projection_tests {
        use super::*;

        #[test]
        fn hidden_role_stays_hidden_until_revealed() {
            let mut p = player().with_warlock_role();
            assert!(!PlayerView::of(&p).revealed_warlock);

            p.reveal_role();
            assert!(PlayerView::of(&p).revealed_warlock);
        }

        #[test]
        fn revealed_flag_requires_the_role() {
            let mut p = player();
            p.reveal_role();
            assert!(!PlayerView::of(&p).revealed_warlock);
        }

        #[test]
        fn view_carries_statuses_and_cooldowns() {
            let config = GameConfig::standard();
            let mut p = player();
            p.effects_mut()
                .apply(StatusEffect::poison(2, 3, None), &config, 0);
            p.cooldowns_mut().put(AbilityKind::Fireball, 2);

            let view = PlayerView::of(&p);
            assert_eq!(view.statuses.len(), 1);
            assert_eq!(view.statuses[0].name, "Poisoned");
            assert_eq!(view.statuses[0].remaining_turns, 3);
            assert_eq!(view.cooldowns[0].name, "Fireball");
            assert_eq!(view.cooldowns[0].remaining_turns, 3);
        }

        #[test]
        fn view_roundtrips_through_json() {
            let view = PlayerView::of(&player());
            let json = serde_json::to_string(&view).unwrap();
            let back: PlayerView = serde_json::from_str(&json).unwrap();
            assert_eq!(view, back);
        }
    }
}
