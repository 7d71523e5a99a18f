//! Rounds, matches, and the lifecycle of a single round.

pub mod lifecycle;
pub mod models;

pub use lifecycle::{is_complete, record_result};
pub use models::{
    GameRecord, Match, MatchId, MatchResult, Outcome, ResultReport, Round, RoundKind, RoundNumber,
    RoundStage,
};
