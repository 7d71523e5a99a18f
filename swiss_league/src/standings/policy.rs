//! Scoring rules applied to match results.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::round::{MatchResult, ResultReport};

/// Point values and tie-break floors for one tournament.
///
/// The defaults follow common Swiss convention: three points for a win or a
/// bye, one for a draw, and a one-third floor on each opponent's match-win
/// percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Match points for a win
    pub win_points: u32,
    /// Match points for a draw
    pub draw_points: u32,
    /// Match points for a loss
    pub loss_points: u32,
    /// Match points for a bye
    pub bye_points: u32,
    /// Lowest match-win percentage counted for any single opponent
    pub opponent_win_floor: f64,
    /// Most games a single match may report (best-of-3 → 3)
    pub max_games_per_match: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            win_points: 3,
            draw_points: 1,
            loss_points: 0,
            bye_points: 3,
            opponent_win_floor: 1.0 / 3.0,
            max_games_per_match: 3,
        }
    }
}

impl ScoringPolicy {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.win_points == 0 {
            return Err(ValidationError::InvalidPolicy(
                "win points must be greater than 0".to_string(),
            ));
        }

        if self.draw_points > self.win_points || self.loss_points > self.draw_points {
            return Err(ValidationError::InvalidPolicy(
                "points must satisfy win >= draw >= loss".to_string(),
            ));
        }

        if self.bye_points > self.win_points {
            return Err(ValidationError::InvalidPolicy(
                "a bye cannot be worth more than a win".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.opponent_win_floor) {
            return Err(ValidationError::InvalidPolicy(
                "opponent win floor must be within 0..=1".to_string(),
            ));
        }

        if self.max_games_per_match == 0 {
            return Err(ValidationError::InvalidPolicy(
                "a match must allow at least one game".to_string(),
            ));
        }

        Ok(())
    }

    /// Match points awarded to (first, second) side for a result
    pub fn points_for(&self, result: MatchResult) -> (u32, u32) {
        match result {
            MatchResult::Win1 => (self.win_points, self.loss_points),
            MatchResult::Win2 => (self.loss_points, self.win_points),
            MatchResult::Draw => (self.draw_points, self.draw_points),
        }
    }

    /// Check a reported game score against the match result and the
    /// per-match game limit.
    pub fn check_report(&self, report: &ResultReport) -> Result<(), ValidationError> {
        let Some(games) = report.games else {
            return Ok(());
        };

        let played = games.total();
        if played == 0 || played > u32::from(self.max_games_per_match) {
            return Err(ValidationError::GameCountOutOfRange {
                played,
                max: self.max_games_per_match,
            });
        }

        let consistent = match report.result {
            MatchResult::Win1 => games.wins1 > games.wins2,
            MatchResult::Win2 => games.wins2 > games.wins1,
            MatchResult::Draw => games.wins1 == games.wins2,
        };
        if !consistent {
            return Err(ValidationError::GameScoreMismatch {
                result: report.result,
                games,
            });
        }

        Ok(())
    }
}
