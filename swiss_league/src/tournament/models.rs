//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;
use crate::pairing::SeedingSplit;
use crate::registry::PlayerId;
use crate::round::{Round, RoundNumber};
use crate::standings::ScoringPolicy;

/// Tournament ID type
pub type TournamentId = i64;

/// Tournament status
///
/// Moves forward only: draft → active → completed → confirmed. The single
/// backward path is the explicit round rollback recovery operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting registrations
    Draft,
    /// Rounds in progress
    Active,
    /// Final round played, awaiting confirmation
    Completed,
    /// Results acknowledged and applied to player records
    Confirmed,
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::Active => "active",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Confirmed => "confirmed",
        };
        write!(f, "{name}")
    }
}

/// Round structure of a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentFormat {
    /// Number of Swiss rounds
    pub swiss_rounds: u32,
    /// Number of elimination rounds after the Swiss phase (0 = none)
    #[serde(default)]
    pub top_rounds: u32,
    /// Whether the tournament seeds by rating and updates ratings
    #[serde(default)]
    pub rated: bool,
    /// Pairing split used for round 1 and within score groups
    #[serde(default)]
    pub seeding: SeedingSplit,
}

impl Default for TournamentFormat {
    fn default() -> Self {
        Self {
            swiss_rounds: 3,
            top_rounds: 0,
            rated: true,
            seeding: SeedingSplit::Slide,
        }
    }
}

impl TournamentFormat {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.swiss_rounds == 0 {
            return Err(ValidationError::InvalidFormat(
                "at least one Swiss round is required".to_string(),
            ));
        }

        if self.top_rounds > 6 {
            return Err(ValidationError::InvalidFormat(
                "top cut cannot exceed 6 rounds (64 players)".to_string(),
            ));
        }

        Ok(())
    }
}

/// Tournament configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Tournament name
    pub name: String,
    /// Host city
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub format: TournamentFormat,
    /// Judge allowed to manage this tournament
    #[serde(default)]
    pub judge_id: Option<PlayerId>,
    #[serde(default)]
    pub scoring: ScoringPolicy,
}

impl TournamentConfig {
    pub fn new(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            name: name.into(),
            city: None,
            description: None,
            format,
            judge_id: None,
            scoring: ScoringPolicy::default(),
        }
    }

    pub fn with_judge(mut self, judge_id: PlayerId) -> Self {
        self.judge_id = Some(judge_id);
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringPolicy) -> Self {
        self.scoring = scoring;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidFormat(
                "tournament name cannot be empty".to_string(),
            ));
        }
        self.format.validate()?;
        self.scoring.validate()
    }
}

/// A player enrolled in one tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub player_id: PlayerId,
    /// 1-based seed; registration order until the tournament starts
    pub seed: u32,
    /// Excluded from future pairing
    #[serde(default)]
    pub dropped: bool,
    /// Last round the participant was part of before dropping
    #[serde(default)]
    pub dropped_after_round: Option<RoundNumber>,
}

impl Participant {
    pub fn new(player_id: PlayerId, seed: u32) -> Self {
        Self {
            player_id,
            seed,
            dropped: false,
            dropped_after_round: None,
        }
    }
}

/// Tournament aggregate
///
/// Owned by the caller between operations; every mutation goes through the
/// state machine methods in [`super::state_machine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    /// Tournament ID
    pub id: TournamentId,
    pub config: TournamentConfig,
    /// Participants in seed order once started
    pub participants: Vec<Participant>,
    /// Rounds in creation order
    pub rounds: Vec<Round>,
    /// Number of rounds created so far
    pub current_round: RoundNumber,
    pub status: TournamentStatus,
    /// Elimination bracket size once seeded
    #[serde(default)]
    pub bracket_size: Option<u32>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Started at timestamp
    pub started_at: Option<DateTime<Utc>>,
    /// Completed at timestamp
    pub completed_at: Option<DateTime<Utc>>,
    /// Confirmed at timestamp
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create a draft tournament
    pub fn new(id: TournamentId, config: TournamentConfig) -> Self {
        Self {
            id,
            config,
            participants: Vec::new(),
            rounds: Vec::new(),
            current_round: 0,
            status: TournamentStatus::Draft,
            bracket_size: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            confirmed_at: None,
        }
    }

    pub fn participant(&self, player: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.player_id == player)
    }

    /// Participants still eligible for pairing, in seed order
    pub fn active_participants(&self) -> Vec<PlayerId> {
        self.participants
            .iter()
            .filter(|p| !p.dropped)
            .map(|p| p.player_id)
            .collect()
    }

    pub fn round(&self, number: RoundNumber) -> Option<&Round> {
        number
            .checked_sub(1)
            .and_then(|index| self.rounds.get(index as usize))
    }

    pub fn last_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// Rounds of the Swiss phase
    pub fn swiss_rounds(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter().filter(|r| !r.kind.is_top_cut())
    }

    /// Number of the last round this tournament will play.
    ///
    /// Before the bracket is seeded this assumes the configured top-cut size;
    /// afterwards it reflects the actual bracket. A bracket thinned out by
    /// drops ends early once it has decided its winner.
    pub fn final_round_number(&self) -> RoundNumber {
        if self.bracket_decided() {
            return self.current_round;
        }

        let top = match self.bracket_size {
            Some(size) if size >= 2 => size.ilog2(),
            Some(_) => 0,
            None => self.config.format.top_rounds,
        };
        self.config.format.swiss_rounds + top
    }

    /// The last elimination round leaves at most one participant able to
    /// play on: a single table, or every advancing player dropped
    fn bracket_decided(&self) -> bool {
        let Some(last) = self.last_round().filter(|r| r.kind.is_top_cut()) else {
            return false;
        };
        if last.matches.len() <= 1 {
            return true;
        }

        last.completed
            && !last
                .matches
                .iter()
                .filter_map(|m| m.winner())
                .any(|id| self.participant(id).is_some_and(|p| !p.dropped))
    }

    pub fn summary(&self) -> TournamentSummary {
        TournamentSummary {
            id: self.id,
            name: self.config.name.clone(),
            city: self.config.city.clone(),
            status: self.status,
            participant_count: self.participants.len(),
            current_round: self.current_round,
            final_round: self.final_round_number(),
            judge_id: self.config.judge_id,
            created_at: self.created_at,
        }
    }
}

/// Tournament list entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSummary {
    /// Tournament ID
    pub id: TournamentId,
    pub name: String,
    pub city: Option<String>,
    pub status: TournamentStatus,
    pub participant_count: usize,
    pub current_round: RoundNumber,
    pub final_round: RoundNumber,
    pub judge_id: Option<PlayerId>,
    pub created_at: DateTime<Utc>,
}
