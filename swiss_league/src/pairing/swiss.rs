//! Swiss-system pairing.
//!
//! Round 1 pairs by seed. Later rounds rank participants by points, pair
//! within score groups while avoiding rematches, and pull the nearest
//! participants down from lower groups when a group cannot close on its own.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use super::{PairingHistory, PairingRequest, PairingResult, RoundPairer};
use crate::registry::PlayerId;
use crate::round::{Match, Round, RoundKind, RoundNumber};
use crate::standings::ScoringPolicy;

/// Upper bound on backtracking steps per search
const SEARCH_BUDGET: usize = 200_000;

/// How a group of equally placed participants is split into pairs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingSplit {
    /// Top half plays bottom half (1 vs 5, 2 vs 6, ...)
    #[default]
    Slide,
    /// Neighbours play each other (1 vs 2, 3 vs 4, ...)
    Adjacent,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: PlayerId,
    seed: usize,
    points: u32,
}

/// Score-group pairer
#[derive(Debug, Clone, Default)]
pub struct SwissPairer {
    split: SeedingSplit,
}

impl SwissPairer {
    pub fn new(split: SeedingSplit) -> Self {
        Self { split }
    }

    /// Pair by seed alone; the lowest seed with the fewest byes sits out
    fn pair_by_seed(
        &self,
        participants: &[PlayerId],
        history: &PairingHistory,
    ) -> (Vec<(PlayerId, PlayerId)>, Option<PlayerId>) {
        let mut seeded = participants.to_vec();

        let bye = if seeded.len() % 2 == 1 {
            // reversed so the first minimum found is the lowest seed
            let position = (0..seeded.len())
                .rev()
                .min_by_key(|&i| history.byes(seeded[i]));
            position.map(|i| seeded.remove(i))
        } else {
            None
        };

        let pairs = match self.split {
            SeedingSplit::Slide => {
                let half = seeded.len() / 2;
                (0..half).map(|i| (seeded[i], seeded[i + half])).collect()
            }
            SeedingSplit::Adjacent => seeded.chunks_exact(2).map(|c| (c[0], c[1])).collect(),
        };

        (pairs, bye)
    }

    /// Pair by score groups with rematch avoidance
    fn pair_by_score(
        &self,
        participants: &[PlayerId],
        history: &PairingHistory,
    ) -> (Vec<(PlayerId, PlayerId)>, Option<PlayerId>) {
        let mut ranked: Vec<Entry> = participants
            .iter()
            .enumerate()
            .map(|(seed, &id)| Entry {
                id,
                seed,
                points: history.points(id),
            })
            .collect();
        ranked.sort_by_key(|e| (Reverse(e.points), e.seed));

        if ranked.len() % 2 == 0 {
            if let Some(pairs) = self.search(&ranked, history, true) {
                return (pairs, None);
            }
            log::warn!("No rematch-free pairing exists, allowing rematches");
            return (self.search(&ranked, history, false).unwrap_or_default(), None);
        }

        let fewest = ranked.iter().map(|e| history.byes(e.id)).min().unwrap_or(0);
        let mut candidates: Vec<Entry> = ranked
            .iter()
            .copied()
            .filter(|e| history.byes(e.id) == fewest)
            .collect();
        candidates.sort_by_key(|e| (e.points, Reverse(e.seed)));

        for candidate in &candidates {
            let rest = without(&ranked, candidate.id);
            if let Some(pairs) = self.search(&rest, history, true) {
                log::debug!("Bye to player {} ({} pts)", candidate.id, candidate.points);
                return (pairs, Some(candidate.id));
            }
        }

        let Some(candidate) = candidates.first() else {
            return (Vec::new(), None);
        };
        log::warn!(
            "No rematch-free pairing exists for any bye candidate, allowing rematches; bye to player {}",
            candidate.id
        );
        let rest = without(&ranked, candidate.id);
        (
            self.search(&rest, history, false).unwrap_or_default(),
            Some(candidate.id),
        )
    }

    /// Find a perfect pairing of `players` (ranked order).
    ///
    /// In strict mode rematches are forbidden and `None` means no pairing was
    /// found within the search budget. Relaxed mode always succeeds on an
    /// even field, preferring fresh opponents.
    fn search(
        &self,
        players: &[Entry],
        history: &PairingHistory,
        strict: bool,
    ) -> Option<Vec<(PlayerId, PlayerId)>> {
        let mut paired = vec![false; players.len()];
        let mut pairs = Vec::with_capacity(players.len() / 2);
        let mut budget = SEARCH_BUDGET;

        self.backtrack(players, history, strict, &mut paired, &mut pairs, &mut budget)
            .then_some(pairs)
    }

    fn backtrack(
        &self,
        players: &[Entry],
        history: &PairingHistory,
        strict: bool,
        paired: &mut [bool],
        pairs: &mut Vec<(PlayerId, PlayerId)>,
        budget: &mut usize,
    ) -> bool {
        let Some(first) = paired.iter().position(|p| !p) else {
            return true;
        };

        paired[first] = true;
        for next in self.candidates(players, paired, first, history, strict) {
            if *budget == 0 {
                break;
            }
            *budget -= 1;

            paired[next] = true;
            pairs.push((players[first].id, players[next].id));
            if self.backtrack(players, history, strict, paired, pairs, budget) {
                return true;
            }
            pairs.pop();
            paired[next] = false;
        }
        paired[first] = false;

        false
    }

    /// Opponents to try for `first`, best first: its own score group in
    /// split order, then lower groups from the top down.
    fn candidates(
        &self,
        players: &[Entry],
        paired: &[bool],
        first: usize,
        history: &PairingHistory,
        strict: bool,
    ) -> Vec<usize> {
        let me = players[first];
        let (same, lower): (Vec<usize>, Vec<usize>) = (first + 1..players.len())
            .filter(|&i| !paired[i])
            .partition(|&i| players[i].points == me.points);

        let offset = match self.split {
            SeedingSplit::Slide => ((same.len() + 1) / 2).saturating_sub(1),
            SeedingSplit::Adjacent => 0,
        };

        let mut order: Vec<usize> = same[offset..]
            .iter()
            .chain(&same[..offset])
            .chain(&lower)
            .copied()
            .collect();

        if strict {
            order.retain(|&i| !history.have_met(me.id, players[i].id));
        } else {
            order.sort_by_key(|&i| history.have_met(me.id, players[i].id));
        }
        order
    }
}

fn without(ranked: &[Entry], id: PlayerId) -> Vec<Entry> {
    ranked.iter().copied().filter(|e| e.id != id).collect()
}

/// Lay pairs out on tables 1.., with the bye last and off-table
fn build_round(
    number: RoundNumber,
    pairs: Vec<(PlayerId, PlayerId)>,
    bye: Option<PlayerId>,
    policy: &ScoringPolicy,
) -> Round {
    let mut matches: Vec<Match> = pairs
        .into_iter()
        .zip(1..)
        .map(|((p1, p2), id)| Match::pairing(id, id, p1, p2))
        .collect();

    if let Some(player) = bye {
        matches.push(Match::bye(matches.len() as u32 + 1, player, policy));
    }

    Round::new(number, RoundKind::Swiss, matches)
}

impl RoundPairer for SwissPairer {
    fn pair(&self, request: &PairingRequest<'_>) -> PairingResult<Round> {
        let history = PairingHistory::from_rounds(request.history);

        let (pairs, bye) = if request.history.is_empty() {
            self.pair_by_seed(request.participants, &history)
        } else {
            self.pair_by_score(request.participants, &history)
        };

        Ok(build_round(request.round_number, pairs, bye, request.policy))
    }
}
