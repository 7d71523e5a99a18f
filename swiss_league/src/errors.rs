//! Error types shared by every tournament operation.
//!
//! Each failure carries the invariant it violated as structured data so the
//! orchestrating layer can translate it into user feedback without parsing
//! strings.

use thiserror::Error;

use crate::{
    pairing::PairingError,
    permissions::PermissionDenied,
    registry::PlayerId,
    round::{GameRecord, MatchId, MatchResult, RoundNumber},
    tournament::{TournamentId, TournamentStatus},
};

/// A referenced entity does not exist
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("tournament {0} not found")]
    Tournament(TournamentId),

    #[error("round {0} not found")]
    Round(RoundNumber),

    #[error("match {match_id} not found in round {round}")]
    Match { round: RoundNumber, match_id: MatchId },

    #[error("player {0} not found")]
    Player(PlayerId),

    #[error("player {0} is not a participant")]
    Participant(PlayerId),
}

/// Malformed input or a request that would corrupt recorded results
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("match {match_id} is a bye and resolves itself")]
    ByeResult { match_id: MatchId },

    #[error("draws are not allowed in elimination round {round}")]
    DrawInTopCut { round: RoundNumber },

    #[error("{played} games reported, at most {max} allowed")]
    GameCountOutOfRange { played: u32, max: u8 },

    #[error("game score {games} contradicts result {result}")]
    GameScoreMismatch {
        result: MatchResult,
        games: GameRecord,
    },

    #[error("results of elimination round {round} are locked once the next round exists")]
    TopCutLocked { round: RoundNumber },

    #[error("results of swiss round {round} are locked once the top cut is seeded")]
    SwissLocked { round: RoundNumber },

    #[error("player {0} is already registered")]
    AlreadyRegistered(PlayerId),

    #[error("player {0} has already dropped")]
    AlreadyDropped(PlayerId),

    #[error("invalid tournament format: {0}")]
    InvalidFormat(String),

    #[error("invalid scoring policy: {0}")]
    InvalidPolicy(String),
}

/// Precondition of a state transition that did not hold
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Precondition {
    #[error("tournament must be {expected}")]
    Status { expected: TournamentStatus },

    #[error("need at least {needed} active participants, have {current}")]
    MinParticipants { needed: usize, current: usize },

    #[error("round {round} still has {pending} match(es) without a result")]
    RoundIncomplete { round: RoundNumber, pending: usize },

    #[error("all {final_round} rounds have already been created")]
    AllRoundsCreated { final_round: RoundNumber },

    #[error("round {current} is not the final round {final_round}")]
    FinalRoundNotReached {
        current: RoundNumber,
        final_round: RoundNumber,
    },

    #[error("no rounds have been created")]
    NoRounds,

    #[error("a confirmed tournament is final")]
    Confirmed,
}

/// Persistence or directory collaborator failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store rejected write: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Tournament errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TournamentError {
    #[error("pairing failed: {0}")]
    Pairing(#[from] PairingError),

    #[error("cannot {operation} while {status}: {precondition}")]
    InvalidTransition {
        operation: &'static str,
        status: TournamentStatus,
        precondition: Precondition,
    },

    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl TournamentError {
    pub(crate) fn transition(
        operation: &'static str,
        status: TournamentStatus,
        precondition: Precondition,
    ) -> Self {
        Self::InvalidTransition {
            operation,
            status,
            precondition,
        }
    }

    /// Get a client-safe error message
    ///
    /// Storage failures are collapsed into a generic message so collaborator
    /// details never reach end users.
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Storage(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
