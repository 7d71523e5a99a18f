//! Ranked standings with deterministic tie-breaks.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::ScoringPolicy;
use crate::registry::PlayerId;
use crate::round::{Outcome, Round, RoundNumber};
use crate::tournament::Participant;

/// How far a participant got in the elimination bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopCutProgress {
    /// Last elimination round the participant was paired in
    pub furthest_round: RoundNumber,
    /// Still unbeaten in the bracket
    pub alive: bool,
}

/// One participant's line in the standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based place
    pub rank: u32,
    pub player_id: PlayerId,
    pub seed: u32,
    pub match_points: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub byes: u32,
    pub rounds_played: u32,
    pub match_win_pct: f64,
    pub opponents_match_win_pct: f64,
    /// Only present when game scores were reported
    pub game_win_pct: Option<f64>,
    pub opponents_opponents_win_pct: f64,
    /// Sum of opponents' match points
    pub buchholz: u32,
    /// Sum of opponents' Buchholz scores
    pub sum_buchholz: u32,
    pub dropped: bool,
    pub top_cut: Option<TopCutProgress>,
}

/// Final placement handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentResultRecord {
    pub player_id: PlayerId,
    pub place: u32,
    pub points: u32,
    pub buchholz: u32,
    pub sum_buchholz: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl From<&Standing> for TournamentResultRecord {
    fn from(standing: &Standing) -> Self {
        Self {
            player_id: standing.player_id,
            place: standing.rank,
            points: standing.match_points,
            buchholz: standing.buchholz,
            sum_buchholz: standing.sum_buchholz,
            wins: standing.wins,
            losses: standing.losses,
            draws: standing.draws,
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    match_points: u32,
    wins: u32,
    losses: u32,
    draws: u32,
    byes: u32,
    game_points: u32,
    games_played: u32,
    opponents: Vec<PlayerId>,
    top_cut: Option<TopCutProgress>,
}

impl Tally {
    fn rounds_played(&self) -> u32 {
        self.wins + self.losses + self.draws + self.byes
    }

    fn match_win_pct(&self, policy: &ScoringPolicy) -> f64 {
        let possible = self.rounds_played() * policy.win_points;
        if possible == 0 {
            0.0
        } else {
            f64::from(self.match_points) / f64::from(possible)
        }
    }

    fn game_win_pct(&self, policy: &ScoringPolicy) -> Option<f64> {
        (self.games_played > 0).then(|| {
            f64::from(self.game_points) / f64::from(self.games_played * policy.win_points)
        })
    }
}

/// Average of `values`, zero when empty
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0u32), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / f64::from(count) }
}

fn tally(
    participants: &[Participant],
    rounds: &[Round],
    policy: &ScoringPolicy,
) -> HashMap<PlayerId, Tally> {
    let mut tallies: HashMap<PlayerId, Tally> = participants
        .iter()
        .map(|p| (p.player_id, Tally::default()))
        .collect();

    for round in rounds {
        for m in &round.matches {
            for player in [Some(m.player1), m.player2].into_iter().flatten() {
                let Some(entry) = tallies.get_mut(&player) else {
                    continue;
                };
                let outcome = m.outcome_for(player);

                // bracket rounds only track progress, pending pairings included
                if round.kind.is_top_cut() {
                    let alive =
                        entry.top_cut.is_none_or(|t| t.alive) && outcome != Some(Outcome::Loss);
                    entry.top_cut = Some(TopCutProgress {
                        furthest_round: round.number,
                        alive,
                    });
                    continue;
                }

                let Some(outcome) = outcome else {
                    continue;
                };
                entry.match_points += m.points_for(player);
                match outcome {
                    Outcome::Win => entry.wins += 1,
                    Outcome::Loss => entry.losses += 1,
                    Outcome::Draw => entry.draws += 1,
                    Outcome::Bye => entry.byes += 1,
                }

                if let Some(games) = m.games {
                    let won = if player == m.player1 {
                        games.wins1
                    } else {
                        games.wins2
                    };
                    entry.game_points += u32::from(won) * policy.win_points
                        + u32::from(games.draws) * policy.draw_points;
                    entry.games_played += games.total();
                }

                if let Some(opponent) = m.opponent_of(player) {
                    entry.opponents.push(opponent);
                }
            }
        }
    }

    tallies
}

/// Bracket progress first, then Swiss keys, then seed
fn compare(a: &Standing, b: &Standing) -> Ordering {
    let bracket = match (a.top_cut, b.top_cut) {
        (Some(x), Some(y)) => y
            .furthest_round
            .cmp(&x.furthest_round)
            .then(y.alive.cmp(&x.alive)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    bracket
        .then(b.match_points.cmp(&a.match_points))
        .then(b.opponents_match_win_pct.total_cmp(&a.opponents_match_win_pct))
        .then(
            b.game_win_pct
                .unwrap_or(0.0)
                .total_cmp(&a.game_win_pct.unwrap_or(0.0)),
        )
        .then(
            b.opponents_opponents_win_pct
                .total_cmp(&a.opponents_opponents_win_pct),
        )
        .then(a.seed.cmp(&b.seed))
}

/// Compute ranked standings from scratch.
///
/// Every participant appears, dropped ones included. Swiss rounds supply
/// points and tie-breaks; elimination rounds only order the bracket
/// finishers above everyone else. Pure: identical inputs give identical
/// output.
///
/// # Arguments
///
/// * `participants` - Everyone enrolled, with their seeds
/// * `rounds` - Rounds created so far, in order; undecided matches are ignored
/// * `policy` - Point values and tie-break floors
pub fn compute_standings(
    participants: &[Participant],
    rounds: &[Round],
    policy: &ScoringPolicy,
) -> Vec<Standing> {
    let tallies = tally(participants, rounds, policy);

    let mwp = |id: &PlayerId| {
        tallies
            .get(id)
            .map_or(0.0, |t| t.match_win_pct(policy))
            .max(policy.opponent_win_floor)
    };
    let omw: HashMap<PlayerId, f64> = tallies
        .iter()
        .map(|(id, t)| (*id, mean(t.opponents.iter().map(mwp))))
        .collect();
    let points = |id: &PlayerId| tallies.get(id).map_or(0, |t| t.match_points);
    let buchholz: HashMap<PlayerId, u32> = tallies
        .iter()
        .map(|(id, t)| (*id, t.opponents.iter().map(points).sum()))
        .collect();

    let mut standings: Vec<Standing> = participants
        .iter()
        .filter_map(|p| {
            let t = tallies.get(&p.player_id)?;
            Some(Standing {
                rank: 0,
                player_id: p.player_id,
                seed: p.seed,
                match_points: t.match_points,
                wins: t.wins,
                losses: t.losses,
                draws: t.draws,
                byes: t.byes,
                rounds_played: t.rounds_played(),
                match_win_pct: t.match_win_pct(policy),
                opponents_match_win_pct: omw.get(&p.player_id).copied().unwrap_or(0.0),
                game_win_pct: t.game_win_pct(policy),
                opponents_opponents_win_pct: mean(
                    t.opponents
                        .iter()
                        .map(|o| omw.get(o).copied().unwrap_or(0.0)),
                ),
                buchholz: buchholz.get(&p.player_id).copied().unwrap_or(0),
                sum_buchholz: t
                    .opponents
                    .iter()
                    .map(|o| buchholz.get(o).copied().unwrap_or(0))
                    .sum(),
                dropped: p.dropped,
                top_cut: t.top_cut,
            })
        })
        .collect();

    standings.sort_by(compare);
    for (standing, rank) in standings.iter_mut().zip(1..) {
        standing.rank = rank;
    }

    standings
}

/// Final placements for persistence
pub fn result_records(standings: &[Standing]) -> Vec<TournamentResultRecord> {
    standings.iter().map(TournamentResultRecord::from).collect()
}
