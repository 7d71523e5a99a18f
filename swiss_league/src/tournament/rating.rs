//! Player record updates applied when a tournament is confirmed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Tournament;
use crate::registry::{DEFAULT_RATING, PlayerDelta, PlayerId, PlayerRegistry};
use crate::round::Outcome;

/// Elo parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloConfig {
    /// Maximum rating swing per match
    pub k_factor: f64,
    /// Rating assumed for players the registry does not know
    pub default_rating: i32,
    /// Ratings never drop below this
    pub floor: i32,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            default_rating: DEFAULT_RATING,
            floor: 0,
        }
    }
}

/// Probability that `rating` scores against `opponent`
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf(f64::from(opponent - rating) / 400.0))
}

/// Rounded rating change for one match; `score` is 1, 0.5 or 0
pub fn elo_change(rating: i32, opponent: i32, score: f64, k_factor: f64) -> i32 {
    (k_factor * (score - expected_score(rating, opponent))).round() as i32
}

#[derive(Debug, Default)]
struct Running {
    rating: i32,
    wins: u32,
    losses: u32,
    draws: u32,
}

/// Compute each participant's record update.
///
/// Matches are replayed in round order with ratings carried forward. Byes
/// count as wins without a rating change. Ratings only move in rated
/// tournaments; win/loss/draw counters always do.
///
/// # Arguments
///
/// * `tournament` - Tournament whose rounds are replayed
/// * `registry` - Ratings before the tournament
/// * `config` - Elo parameters
///
/// # Returns
///
/// One delta per participant, in participant order
pub fn player_deltas(
    tournament: &Tournament,
    registry: &PlayerRegistry,
    config: &EloConfig,
) -> Vec<PlayerDelta> {
    let rated = tournament.config.format.rated;
    let initial = |id: PlayerId| {
        registry
            .get(id)
            .map_or(config.default_rating, |player| player.rating)
    };

    let mut running: HashMap<PlayerId, Running> = tournament
        .participants
        .iter()
        .map(|p| {
            let entry = Running {
                rating: initial(p.player_id),
                ..Running::default()
            };
            (p.player_id, entry)
        })
        .collect();

    for round in &tournament.rounds {
        for m in &round.matches {
            let Some(p2) = m.player2 else {
                if let Some(entry) = running.get_mut(&m.player1) {
                    entry.wins += 1;
                }
                continue;
            };

            let Some(outcome) = m.outcome_for(m.player1) else {
                continue;
            };
            let score1 = match outcome {
                Outcome::Win | Outcome::Bye => 1.0,
                Outcome::Draw => 0.5,
                Outcome::Loss => 0.0,
            };

            let r1 = running.get(&m.player1).map_or(config.default_rating, |e| e.rating);
            let r2 = running.get(&p2).map_or(config.default_rating, |e| e.rating);
            let change1 = elo_change(r1, r2, score1, config.k_factor);
            let change2 = elo_change(r2, r1, 1.0 - score1, config.k_factor);

            for (player, change) in [(m.player1, change1), (p2, change2)] {
                let Some(entry) = running.get_mut(&player) else {
                    continue;
                };
                if rated {
                    entry.rating = (entry.rating + change).max(config.floor);
                }
                match m.outcome_for(player) {
                    Some(Outcome::Win | Outcome::Bye) => entry.wins += 1,
                    Some(Outcome::Loss) => entry.losses += 1,
                    Some(Outcome::Draw) => entry.draws += 1,
                    None => {}
                }
            }
        }
    }

    tournament
        .participants
        .iter()
        .filter_map(|p| {
            let entry = running.get(&p.player_id)?;
            Some(PlayerDelta {
                player_id: p.player_id,
                rating_change: entry.rating - initial(p.player_id),
                tournaments: 1,
                wins: entry.wins,
                losses: entry.losses,
                draws: entry.draws,
            })
        })
        .collect()
}
