//! Standings computation and the scoring policy behind it.

pub mod calculator;
pub mod policy;

pub use calculator::{
    Standing, TopCutProgress, TournamentResultRecord, compute_standings, result_records,
};
pub use policy::ScoringPolicy;
