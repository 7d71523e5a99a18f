//! Round and match data models.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::registry::PlayerId;
use crate::standings::ScoringPolicy;

/// Match ID type, unique within a round
pub type MatchId = u32;

/// Round number type (1-indexed)
pub type RoundNumber = u32;

/// Recorded outcome of a match between two real participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    /// First participant won
    Win1,
    /// Second participant won
    Win2,
    Draw,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::Win1 => write!(f, "win for first"),
            MatchResult::Win2 => write!(f, "win for second"),
            MatchResult::Draw => write!(f, "draw"),
        }
    }
}

/// Per-game tally of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub wins1: u8,
    pub wins2: u8,
    pub draws: u8,
}

impl GameRecord {
    pub fn new(wins1: u8, wins2: u8, draws: u8) -> Self {
        Self {
            wins1,
            wins2,
            draws,
        }
    }

    pub fn total(&self) -> u32 {
        u32::from(self.wins1) + u32::from(self.wins2) + u32::from(self.draws)
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wins1, self.wins2, self.draws)
    }
}

/// Result submitted for a match, optionally with its game score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultReport {
    pub result: MatchResult,
    #[serde(default)]
    pub games: Option<GameRecord>,
}

impl ResultReport {
    pub fn with_games(result: MatchResult, games: GameRecord) -> Self {
        Self {
            result,
            games: Some(games),
        }
    }
}

impl From<MatchResult> for ResultReport {
    fn from(result: MatchResult) -> Self {
        Self {
            result,
            games: None,
        }
    }
}

/// How a match ended from one participant's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    Bye,
}

/// One pairing within a round.
///
/// A bye has no second participant, a fixed [`MatchResult::Win1`] result and
/// no points for the absent side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub player1: PlayerId,
    pub player2: Option<PlayerId>,
    pub result: Option<MatchResult>,
    pub games: Option<GameRecord>,
    /// Match points awarded to the first participant
    pub points1: u32,
    /// Match points awarded to the second participant
    pub points2: u32,
    /// Table the match is played at; byes have none
    pub table_number: Option<u32>,
}

impl Match {
    /// Create an unplayed match between two participants
    pub fn pairing(id: MatchId, table_number: u32, player1: PlayerId, player2: PlayerId) -> Self {
        Self {
            id,
            player1,
            player2: Some(player2),
            result: None,
            games: None,
            points1: 0,
            points2: 0,
            table_number: Some(table_number),
        }
    }

    /// Create a bye, resolved on creation
    pub fn bye(id: MatchId, player: PlayerId, policy: &ScoringPolicy) -> Self {
        Self {
            id,
            player1: player,
            player2: None,
            result: Some(MatchResult::Win1),
            games: None,
            points1: policy.bye_points,
            points2: 0,
            table_number: None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.player2.is_none()
    }

    /// Byes are decided on creation; other matches once a result is recorded
    pub fn is_decided(&self) -> bool {
        self.is_bye() || self.result.is_some()
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.player1 == player || self.player2 == Some(player)
    }

    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if self.player1 == player {
            self.player2
        } else if self.player2 == Some(player) {
            Some(self.player1)
        } else {
            None
        }
    }

    /// Outcome for a participant, `None` while undecided or not involved
    pub fn outcome_for(&self, player: PlayerId) -> Option<Outcome> {
        if !self.involves(player) {
            return None;
        }
        if self.is_bye() {
            return Some(Outcome::Bye);
        }

        let first = self.player1 == player;
        self.result.map(|result| match (result, first) {
            (MatchResult::Draw, _) => Outcome::Draw,
            (MatchResult::Win1, true) | (MatchResult::Win2, false) => Outcome::Win,
            _ => Outcome::Loss,
        })
    }

    /// Points awarded to a participant in this match
    pub fn points_for(&self, player: PlayerId) -> u32 {
        if self.player1 == player {
            self.points1
        } else if self.player2 == Some(player) {
            self.points2
        } else {
            0
        }
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.result? {
            MatchResult::Win1 => Some(self.player1),
            MatchResult::Win2 => self.player2,
            MatchResult::Draw => None,
        }
    }
}

/// Phase a round belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundKind {
    Swiss,
    /// Single-elimination round of a bracket seeded with `bracket_size`;
    /// `players` counts the bracket slots entering this round, empty ones
    /// included
    TopCut { bracket_size: u32, players: u32 },
}

impl RoundKind {
    pub fn is_top_cut(&self) -> bool {
        matches!(self, RoundKind::TopCut { .. })
    }
}

/// Display name of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStage {
    Swiss(RoundNumber),
    /// Elimination round with this many players still in
    TopCut(u32),
}

impl fmt::Display for RoundStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundStage::Swiss(number) => write!(f, "Round {number}"),
            RoundStage::TopCut(2) => write!(f, "Final"),
            RoundStage::TopCut(4) => write!(f, "Semifinal"),
            RoundStage::TopCut(players) => write!(f, "Top {players}"),
        }
    }
}

/// Ordered matches of one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub number: RoundNumber,
    pub kind: RoundKind,
    pub matches: Vec<Match>,
    pub completed: bool,
}

impl Round {
    /// Create a round; the completion flag is derived from the matches
    pub fn new(number: RoundNumber, kind: RoundKind, matches: Vec<Match>) -> Self {
        let completed = matches.iter().all(Match::is_decided);
        Self {
            number,
            kind,
            matches,
            completed,
        }
    }

    pub fn find_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn match_for(&self, player: PlayerId) -> Option<&Match> {
        self.matches.iter().find(|m| m.involves(player))
    }

    /// Number of matches still waiting for a result
    pub fn pending(&self) -> usize {
        self.matches.iter().filter(|m| !m.is_decided()).count()
    }

    pub fn bye_recipient(&self) -> Option<PlayerId> {
        self.matches.iter().find(|m| m.is_bye()).map(|m| m.player1)
    }

    pub fn stage(&self) -> RoundStage {
        match self.kind {
            RoundKind::Swiss => RoundStage::Swiss(self.number),
            RoundKind::TopCut { players, .. } => RoundStage::TopCut(players),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bye_is_decided_win() {
        let bye = Match::bye(3, 7, &ScoringPolicy::default());
        assert!(bye.is_bye());
        assert!(bye.is_decided());
        assert_eq!(bye.outcome_for(7), Some(Outcome::Bye));
        assert_eq!(bye.points_for(7), 3);
        assert_eq!(bye.points2, 0);
        assert_eq!(bye.opponent_of(7), None);
    }

    #[test]
    fn test_outcome_from_each_side() {
        let mut m = Match::pairing(1, 1, 10, 20);
        assert_eq!(m.outcome_for(10), None);

        m.result = Some(MatchResult::Win2);
        assert_eq!(m.outcome_for(10), Some(Outcome::Loss));
        assert_eq!(m.outcome_for(20), Some(Outcome::Win));
        assert_eq!(m.winner(), Some(20));
        assert_eq!(m.outcome_for(30), None);
    }

    #[test]
    fn test_round_completion_derived_from_matches() {
        let policy = ScoringPolicy::default();
        let round = Round::new(
            1,
            RoundKind::Swiss,
            vec![Match::pairing(1, 1, 1, 2), Match::bye(2, 3, &policy)],
        );
        assert!(!round.completed);
        assert_eq!(round.pending(), 1);
        assert_eq!(round.bye_recipient(), Some(3));

        let byes_only = Round::new(2, RoundKind::Swiss, vec![Match::bye(1, 3, &policy)]);
        assert!(byes_only.completed);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(RoundStage::Swiss(3).to_string(), "Round 3");
        assert_eq!(RoundStage::TopCut(8).to_string(), "Top 8");
        assert_eq!(RoundStage::TopCut(4).to_string(), "Semifinal");
        assert_eq!(RoundStage::TopCut(2).to_string(), "Final");

        let final_round = Round::new(
            6,
            RoundKind::TopCut {
                bracket_size: 4,
                players: 2,
            },
            vec![Match::pairing(1, 1, 1, 2)],
        );
        assert_eq!(final_round.stage(), RoundStage::TopCut(2));

        // one table left, but four bracket slots entered
        let semifinal = Round::new(
            5,
            RoundKind::TopCut {
                bracket_size: 8,
                players: 4,
            },
            vec![Match::pairing(1, 1, 1, 2)],
        );
        assert_eq!(semifinal.stage().to_string(), "Semifinal");
    }
}
