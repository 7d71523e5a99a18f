//! Single-elimination top cut.

use super::{PairingError, PairingRequest, PairingResult, RoundPairer};
use crate::registry::PlayerId;
use crate::round::{Match, Round, RoundKind};
use crate::standings::Standing;

/// Bracket size for a top cut of `top_rounds` rounds over `available`
/// participants: the configured size, shrunk to the largest power of two the
/// field can fill. Zero when no bracket can be formed.
pub fn bracket_size_for(top_rounds: u32, available: usize) -> u32 {
    if top_rounds == 0 || available < 2 {
        return 0;
    }
    1u32 << top_rounds.min(available.ilog2()).min(31)
}

/// Elimination bracket pairer
#[derive(Debug, Clone, Default)]
pub struct TopCutPairer {
    bracket_size: u32,
    /// Bracket seeds, best first; empty once the bracket is under way
    seeds: Vec<PlayerId>,
}

impl TopCutPairer {
    /// Seed a new bracket from final Swiss standings, skipping dropped
    /// participants
    pub fn from_standings(standings: &[Standing], bracket_size: u32) -> Self {
        let seeds = standings
            .iter()
            .filter(|s| !s.dropped)
            .map(|s| s.player_id)
            .take(bracket_size as usize)
            .collect();
        Self {
            bracket_size,
            seeds,
        }
    }

    /// Continue a bracket whose first round already exists
    pub fn continuing(bracket_size: u32) -> Self {
        Self {
            bracket_size,
            seeds: Vec::new(),
        }
    }

    /// Advancing players of the last elimination round, in table order
    fn advancing(previous: &Round) -> PairingResult<Vec<PlayerId>> {
        previous
            .matches
            .iter()
            .map(|m| {
                if m.is_bye() {
                    return Ok(m.player1);
                }
                m.winner().ok_or(PairingError::UndecidedBracketMatch {
                    round: previous.number,
                    match_id: m.id,
                })
            })
            .collect()
    }
}

impl RoundPairer for TopCutPairer {
    fn pair(&self, request: &PairingRequest<'_>) -> PairingResult<Round> {
        let previous = request.history.last().filter(|r| r.kind.is_top_cut());
        let (field, players) = match previous {
            Some(round) => {
                let players = match round.kind {
                    RoundKind::TopCut { players, .. } => players / 2,
                    RoundKind::Swiss => self.bracket_size,
                };
                (Self::advancing(round)?, players)
            }
            None => (self.seeds.clone(), self.bracket_size),
        };

        if field.len() < 2 {
            return Err(PairingError::BracketTooSmall {
                available: field.len(),
            });
        }

        // best remaining seed meets the worst
        let half = field.len() / 2;
        let mut pairings = Vec::with_capacity(half);
        let mut byes = Vec::new();
        for i in 0..half {
            let (high, low) = (field[i], field[field.len() - 1 - i]);
            let high_in = request.participants.contains(&high);
            let low_in = request.participants.contains(&low);
            match (high_in, low_in) {
                (true, true) => pairings.push((high, low)),
                (true, false) => byes.push(high),
                (false, true) => byes.push(low),
                (false, false) => {
                    log::warn!("Both {high} and {low} dropped, bracket slot stays empty");
                }
            }
        }

        let mut matches: Vec<Match> = pairings
            .into_iter()
            .zip(1..)
            .map(|((p1, p2), id)| Match::pairing(id, id, p1, p2))
            .collect();
        for player in byes {
            matches.push(Match::bye(matches.len() as u32 + 1, player, request.policy));
        }

        if matches.is_empty() {
            return Err(PairingError::InsufficientParticipants {
                needed: 2,
                available: 0,
            });
        }

        Ok(Round::new(
            request.round_number,
            RoundKind::TopCut {
                bracket_size: self.bracket_size,
                players,
            },
            matches,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::{MatchResult, record_result};
    use crate::standings::ScoringPolicy;

    fn seeded(ids: &[PlayerId]) -> TopCutPairer {
        TopCutPairer {
            bracket_size: ids.len() as u32,
            seeds: ids.to_vec(),
        }
    }

    #[test]
    fn test_bracket_size() {
        assert_eq!(bracket_size_for(3, 10), 8);
        assert_eq!(bracket_size_for(3, 7), 4);
        assert_eq!(bracket_size_for(1, 16), 2);
        assert_eq!(bracket_size_for(0, 16), 0);
        assert_eq!(bracket_size_for(2, 1), 0);
    }

    #[test]
    fn test_first_bracket_round_pairs_best_vs_worst() {
        let policy = ScoringPolicy::default();
        let participants = [10, 20, 30, 40, 50];
        let request = PairingRequest {
            participants: &participants,
            history: &[],
            round_number: 4,
            policy: &policy,
        };
        let round = seeded(&[30, 10, 50, 20]).pair(&request).unwrap();

        assert_eq!(
            round.kind,
            RoundKind::TopCut {
                bracket_size: 4,
                players: 4
            }
        );
        let pairs: Vec<_> = round.matches.iter().map(|m| (m.player1, m.player2)).collect();
        assert_eq!(pairs, vec![(30, Some(20)), (10, Some(50))]);
        assert_eq!(round.stage().to_string(), "Semifinal");
    }

    #[test]
    fn test_next_bracket_round_pairs_winners() {
        let policy = ScoringPolicy::default();
        let participants = [1, 2, 3, 4];
        let semis = seeded(&[1, 2, 3, 4])
            .pair(&PairingRequest {
                participants: &participants,
                history: &[],
                round_number: 3,
                policy: &policy,
            })
            .unwrap();
        let semis = record_result(&semis, 1, MatchResult::Win2.into(), &policy).unwrap();
        let history = vec![semis];

        let pairer = TopCutPairer::continuing(4);
        let request = PairingRequest {
            participants: &participants,
            history: &history,
            round_number: 4,
            policy: &policy,
        };
        assert!(matches!(
            pairer.pair(&request),
            Err(PairingError::UndecidedBracketMatch { round: 3, match_id: 2 })
        ));

        let semis = record_result(&history[0], 2, MatchResult::Win1.into(), &policy).unwrap();
        let history = vec![semis];
        let request = PairingRequest {
            history: &history,
            ..request
        };
        let final_round = pairer.pair(&request).unwrap();
        assert_eq!(final_round.matches.len(), 1);
        assert_eq!(final_round.matches[0].player1, 4);
        assert_eq!(final_round.matches[0].player2, Some(2));
        assert_eq!(final_round.stage().to_string(), "Final");
    }

    #[test]
    fn test_dropped_winner_gives_opponent_a_bye() {
        let policy = ScoringPolicy::default();
        let all = [1, 2, 3, 4];
        let semis = seeded(&all)
            .pair(&PairingRequest {
                participants: &all,
                history: &[],
                round_number: 3,
                policy: &policy,
            })
            .unwrap();
        let semis = record_result(&semis, 1, MatchResult::Win1.into(), &policy).unwrap();
        let semis = record_result(&semis, 2, MatchResult::Win1.into(), &policy).unwrap();
        let history = vec![semis];

        // 2 won but dropped
        let final_round = TopCutPairer::continuing(4)
            .pair(&PairingRequest {
                participants: &[1, 3, 4],
                history: &history,
                round_number: 4,
                policy: &policy,
            })
            .unwrap();
        assert_eq!(final_round.matches.len(), 1);
        assert!(final_round.matches[0].is_bye());
        assert_eq!(final_round.bye_recipient(), Some(1));
    }

    #[test]
    fn test_empty_slot_keeps_bracket_stage() {
        let policy = ScoringPolicy::default();
        let all: Vec<PlayerId> = (1..=8).collect();
        let quarters = seeded(&all)
            .pair(&PairingRequest {
                participants: &all,
                history: &[],
                round_number: 2,
                policy: &policy,
            })
            .unwrap();
        assert_eq!(quarters.stage().to_string(), "Top 8");
        let quarters = (1..=4).fold(quarters, |round, id| {
            record_result(&round, id, MatchResult::Win1.into(), &policy).unwrap()
        });
        let history = vec![quarters];

        // both winners of the outer semifinal slot dropped
        let semis = TopCutPairer::continuing(8)
            .pair(&PairingRequest {
                participants: &[2, 3, 5, 6, 7, 8],
                history: &history,
                round_number: 3,
                policy: &policy,
            })
            .unwrap();
        let pairs: Vec<_> = semis.matches.iter().map(|m| (m.player1, m.player2)).collect();
        assert_eq!(pairs, vec![(2, Some(3))]);
        assert_eq!(
            semis.kind,
            RoundKind::TopCut {
                bracket_size: 8,
                players: 4
            }
        );
        assert_eq!(semis.stage().to_string(), "Semifinal");
    }
}
