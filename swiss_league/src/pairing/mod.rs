//! Round pairing.
//!
//! A [`PairingEngine`] turns the active participants and the rounds played so
//! far into the next proposed [`Round`]. It never commits anything: the state
//! machine decides whether to keep the proposal.
//!
//! Two strategies exist, dispatched through [`PairingPlan`]:
//! - [`SwissPairer`]: score-group pairing with rematch avoidance and pull-down
//! - [`TopCutPairer`]: single-elimination bracket seeded from standings

pub mod elimination;
pub mod history;
pub mod swiss;

pub use elimination::{TopCutPairer, bracket_size_for};
pub use history::PairingHistory;
pub use swiss::{SeedingSplit, SwissPairer};

use enum_dispatch::enum_dispatch;
use thiserror::Error;

use crate::registry::PlayerId;
use crate::round::{MatchId, Round, RoundNumber};
use crate::standings::ScoringPolicy;

/// Pairing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("need at least {needed} eligible participants, have {available}")]
    InsufficientParticipants { needed: usize, available: usize },

    #[error("round {0} already exists")]
    RoundAlreadyExists(RoundNumber),

    #[error("round {requested} requested, next round is {expected}")]
    OutOfSequence {
        expected: RoundNumber,
        requested: RoundNumber,
    },

    #[error("bracket needs at least 2 participants, {available} available")]
    BracketTooSmall { available: usize },

    #[error("elimination round {round} match {match_id} has no winner yet")]
    UndecidedBracketMatch { round: RoundNumber, match_id: MatchId },
}

/// Result type for pairing operations
pub type PairingResult<T> = Result<T, PairingError>;

/// Everything a pairer may look at
#[derive(Debug, Clone, Copy)]
pub struct PairingRequest<'a> {
    /// Active participants in seed order, best seed first
    pub participants: &'a [PlayerId],
    /// Rounds created so far, in order
    pub history: &'a [Round],
    pub round_number: RoundNumber,
    pub policy: &'a ScoringPolicy,
}

/// Strategy producing one round of pairings
#[enum_dispatch]
pub trait RoundPairer {
    /// Propose the next round
    ///
    /// # Important
    /// Implementations must be deterministic: identical requests yield
    /// identical rounds.
    fn pair(&self, request: &PairingRequest<'_>) -> PairingResult<Round>;
}

/// Pairing strategy for the round being created
#[enum_dispatch(RoundPairer)]
#[derive(Debug, Clone)]
pub enum PairingPlan {
    Swiss(SwissPairer),
    TopCut(TopCutPairer),
}

/// Validates a pairing request and delegates to the planned strategy
#[derive(Debug, Clone)]
pub struct PairingEngine {
    plan: PairingPlan,
}

impl PairingEngine {
    pub fn new(plan: impl Into<PairingPlan>) -> Self {
        Self { plan: plan.into() }
    }

    pub fn swiss(split: SeedingSplit) -> Self {
        Self::new(SwissPairer::new(split))
    }

    /// Produce the next round.
    ///
    /// # Errors
    ///
    /// - `RoundAlreadyExists` if `round_number` is already in the history
    /// - `OutOfSequence` if it skips ahead of the next round number
    /// - `InsufficientParticipants` with fewer than two active participants
    pub fn pair(&self, request: &PairingRequest<'_>) -> PairingResult<Round> {
        let expected = request.history.len() as RoundNumber + 1;
        if request.round_number < expected {
            return Err(PairingError::RoundAlreadyExists(request.round_number));
        }
        if request.round_number > expected {
            return Err(PairingError::OutOfSequence {
                expected,
                requested: request.round_number,
            });
        }

        if request.participants.len() < 2 {
            return Err(PairingError::InsufficientParticipants {
                needed: 2,
                available: request.participants.len(),
            });
        }

        let round = self.plan.pair(request)?;
        log::debug!(
            "Paired round {} ({}): {} match(es)",
            round.number,
            round.stage(),
            round.matches.len()
        );
        Ok(round)
    }
}
