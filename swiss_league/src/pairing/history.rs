//! Per-participant facts derived from the rounds played so far.

use std::collections::{HashMap, HashSet};

use crate::registry::PlayerId;
use crate::round::{Round, RoundKind};

/// Pairing-relevant summary of a tournament's match history
#[derive(Debug, Clone, Default)]
pub struct PairingHistory {
    points: HashMap<PlayerId, u32>,
    opponents: HashMap<PlayerId, HashSet<PlayerId>>,
    byes: HashMap<PlayerId, u32>,
}

impl PairingHistory {
    /// Summarize the given rounds.
    ///
    /// Points count Swiss rounds only; opponents and byes count every round.
    pub fn from_rounds(rounds: &[Round]) -> Self {
        let mut history = Self::default();

        for round in rounds {
            for m in &round.matches {
                if round.kind == RoundKind::Swiss {
                    *history.points.entry(m.player1).or_default() += m.points1;
                    if let Some(p2) = m.player2 {
                        *history.points.entry(p2).or_default() += m.points2;
                    }
                }

                match m.player2 {
                    Some(p2) => {
                        history.opponents.entry(m.player1).or_default().insert(p2);
                        history.opponents.entry(p2).or_default().insert(m.player1);
                    }
                    None => *history.byes.entry(m.player1).or_default() += 1,
                }
            }
        }

        history
    }

    /// Swiss match points earned so far
    pub fn points(&self, player: PlayerId) -> u32 {
        self.points.get(&player).copied().unwrap_or(0)
    }

    /// Number of byes received so far
    pub fn byes(&self, player: PlayerId) -> u32 {
        self.byes.get(&player).copied().unwrap_or(0)
    }

    pub fn have_met(&self, a: PlayerId, b: PlayerId) -> bool {
        self.opponents.get(&a).is_some_and(|seen| seen.contains(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::{Match, MatchResult};
    use crate::standings::ScoringPolicy;

    #[test]
    fn test_history_tracks_points_opponents_and_byes() {
        let policy = ScoringPolicy::default();
        let mut decided = Match::pairing(1, 1, 1, 2);
        decided.result = Some(MatchResult::Win1);
        decided.points1 = 3;

        let rounds = vec![Round::new(
            1,
            RoundKind::Swiss,
            vec![decided, Match::bye(2, 3, &policy)],
        )];
        let history = PairingHistory::from_rounds(&rounds);

        assert_eq!(history.points(1), 3);
        assert_eq!(history.points(2), 0);
        assert_eq!(history.points(3), 3);
        assert_eq!(history.byes(3), 1);
        assert!(history.have_met(1, 2));
        assert!(history.have_met(2, 1));
        assert!(!history.have_met(1, 3));
    }

    #[test]
    fn test_top_cut_points_ignored() {
        let mut m = Match::pairing(1, 1, 1, 2);
        m.result = Some(MatchResult::Win1);
        m.points1 = 3;

        let kind = RoundKind::TopCut {
            bracket_size: 2,
            players: 2,
        };
        let rounds = vec![Round::new(4, kind, vec![m])];
        let history = PairingHistory::from_rounds(&rounds);
        assert_eq!(history.points(1), 0);
        assert!(history.have_met(1, 2));
    }
}
