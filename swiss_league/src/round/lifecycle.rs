//! Result recording and completion detection for a single round.

use crate::errors::{NotFoundError, TournamentResult, ValidationError};
use crate::standings::ScoringPolicy;

use super::{MatchId, MatchResult, ResultReport, Round};

/// Record a match result, returning the updated round.
///
/// The input round is left untouched. Recording over an existing result is a
/// correction; standings derived from the previous value must be recomputed
/// by the caller.
///
/// # Errors
///
/// - `NotFound` if the match id is not part of the round
/// - `Validation` if the match is a bye, the report's game score is
///   inconsistent, or a draw is reported in an elimination round
pub fn record_result(
    round: &Round,
    match_id: MatchId,
    report: ResultReport,
    policy: &ScoringPolicy,
) -> TournamentResult<Round> {
    let position = round
        .matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or(NotFoundError::Match {
            round: round.number,
            match_id,
        })?;

    if round.matches[position].is_bye() {
        return Err(ValidationError::ByeResult { match_id }.into());
    }

    if round.kind.is_top_cut() && report.result == MatchResult::Draw {
        return Err(ValidationError::DrawInTopCut {
            round: round.number,
        }
        .into());
    }

    policy.check_report(&report)?;

    let mut updated = round.clone();
    let entry = &mut updated.matches[position];
    if let Some(previous) = entry.result {
        log::info!(
            "Correcting round {} match {}: {} -> {}",
            round.number,
            match_id,
            previous,
            report.result
        );
    }

    let (points1, points2) = policy.points_for(report.result);
    entry.result = Some(report.result);
    entry.games = report.games;
    entry.points1 = points1;
    entry.points2 = points2;

    updated.completed = is_complete(&updated);
    Ok(updated)
}

/// A round is complete once every match between two real participants has a
/// result. Byes count as complete from creation.
pub fn is_complete(round: &Round) -> bool {
    round.matches.iter().all(|m| m.is_decided())
}
