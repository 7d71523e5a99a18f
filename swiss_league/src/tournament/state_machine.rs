//! Tournament status transitions.
//!
//! Every transition validates its preconditions first and only then commits,
//! so a failed call leaves the tournament exactly as it was. Authorization is
//! a precondition of every mutating method here: callers run the
//! [`PermissionGate`](crate::permissions::PermissionGate) before reaching
//! this module.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::rating::{EloConfig, player_deltas};
use super::{Participant, Tournament, TournamentStatus};
use crate::errors::{
    NotFoundError, Precondition, TournamentError, TournamentResult, ValidationError,
};
use crate::pairing::{
    PairingEngine, PairingError, PairingPlan, PairingRequest, TopCutPairer, bracket_size_for,
};
use crate::registry::{PlayerDelta, PlayerId, PlayerRegistry};
use crate::round::{self, MatchId, ResultReport, Round, RoundNumber};
use crate::standings::{Standing, compute_standings};

/// Outcome of a confirmation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Confirmation {
    /// The tournament was confirmed by this call; the deltas must be routed
    /// to the player directory exactly once
    Confirmed { deltas: Vec<PlayerDelta> },
    /// Already confirmed earlier; nothing to apply
    AlreadyConfirmed,
}

impl Tournament {
    fn require(&self, operation: &'static str, expected: TournamentStatus) -> TournamentResult<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TournamentError::transition(
                operation,
                self.status,
                Precondition::Status { expected },
            ))
        }
    }

    /// The last round, which must be complete
    fn require_round_complete(&self, operation: &'static str) -> TournamentResult<&Round> {
        let last = self
            .rounds
            .last()
            .ok_or_else(|| TournamentError::transition(operation, self.status, Precondition::NoRounds))?;

        if !round::is_complete(last) {
            return Err(TournamentError::transition(
                operation,
                self.status,
                Precondition::RoundIncomplete {
                    round: last.number,
                    pending: last.pending(),
                },
            ));
        }
        Ok(last)
    }

    fn commit_round(&mut self, round: Round) -> &Round {
        self.current_round = round.number;
        self.rounds.push(round);
        &self.rounds[self.rounds.len() - 1]
    }

    /// Enroll a player
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless the tournament is a draft
    /// - `NotFound` if the registry does not know the player
    /// - `Validation` if the player is already enrolled
    pub fn register(&mut self, player: PlayerId, registry: &PlayerRegistry) -> TournamentResult<()> {
        self.require("register participant", TournamentStatus::Draft)?;

        if !registry.contains(player) {
            return Err(NotFoundError::Player(player).into());
        }
        if self.participant(player).is_some() {
            return Err(ValidationError::AlreadyRegistered(player).into());
        }

        let seed = self.participants.len() as u32 + 1;
        self.participants.push(Participant::new(player, seed));
        log::debug!("Player {player} registered for tournament {}", self.id);
        Ok(())
    }

    /// Remove a player from future pairing.
    ///
    /// In a draft the registration is simply withdrawn. Once active the
    /// participant is marked dropped and keeps their history.
    pub fn drop_participant(&mut self, player: PlayerId) -> TournamentResult<()> {
        let position = self
            .participants
            .iter()
            .position(|p| p.player_id == player)
            .ok_or(NotFoundError::Participant(player))?;

        match self.status {
            TournamentStatus::Draft => {
                self.participants.remove(position);
                for (participant, seed) in self.participants.iter_mut().zip(1..) {
                    participant.seed = seed;
                }
            }
            TournamentStatus::Active => {
                let current_round = self.current_round;
                let participant = &mut self.participants[position];
                if participant.dropped {
                    return Err(ValidationError::AlreadyDropped(player).into());
                }
                participant.dropped = true;
                participant.dropped_after_round = Some(current_round);
            }
            status => {
                return Err(TournamentError::transition(
                    "drop participant",
                    status,
                    Precondition::Status {
                        expected: TournamentStatus::Active,
                    },
                ));
            }
        }

        log::info!("Player {player} dropped from tournament {}", self.id);
        Ok(())
    }

    /// Start the tournament: seed participants and pair round 1.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` unless draft with at least two active participants
    /// - `Validation` if the configuration is invalid
    /// - `Pairing` if round 1 cannot be paired
    pub fn start(&mut self, registry: &PlayerRegistry) -> TournamentResult<&Round> {
        const OP: &str = "start tournament";
        self.require(OP, TournamentStatus::Draft)?;
        self.config.validate()?;

        let active = self.active_participants();
        if active.len() < 2 {
            return Err(TournamentError::transition(
                OP,
                self.status,
                Precondition::MinParticipants {
                    needed: 2,
                    current: active.len(),
                },
            ));
        }

        let order = registry.seed_order(&active, self.config.format.rated);
        let mut participants: Vec<Participant> = order
            .iter()
            .zip(1..)
            .map(|(&id, seed)| Participant::new(id, seed))
            .collect();
        // dropped registrations keep trailing seeds
        let dropped = self.participants.iter().filter(|p| p.dropped).cloned();
        for (mut participant, seed) in dropped.zip(participants.len() as u32 + 1..) {
            participant.seed = seed;
            participants.push(participant);
        }

        let round = PairingEngine::swiss(self.config.format.seeding).pair(&PairingRequest {
            participants: &order,
            history: &[],
            round_number: 1,
            policy: &self.config.scoring,
        })?;

        self.participants = participants;
        self.status = TournamentStatus::Active;
        self.started_at = Some(Utc::now());
        log::info!(
            "Tournament {} started with {} participants",
            self.id,
            order.len()
        );
        Ok(self.commit_round(round))
    }

    /// Create the next round once the current one is complete.
    ///
    /// Swiss rounds come first. When they are exhausted and a top cut is
    /// configured, the bracket is seeded from the final Swiss standings.
    pub fn advance_round(&mut self) -> TournamentResult<&Round> {
        const OP: &str = "advance round";
        self.require(OP, TournamentStatus::Active)?;
        self.require_round_complete(OP)?;

        let final_round = self.final_round_number();
        if self.current_round >= final_round {
            return Err(TournamentError::transition(
                OP,
                self.status,
                Precondition::AllRoundsCreated { final_round },
            ));
        }

        let next = self.current_round + 1;
        let active = self.active_participants();
        let format = &self.config.format;

        let (engine, bracket_size) = if next <= format.swiss_rounds {
            (PairingEngine::swiss(format.seeding), None)
        } else {
            match self.bracket_size {
                Some(size) => (PairingEngine::new(TopCutPairer::continuing(size)), Some(size)),
                None => {
                    let size = bracket_size_for(format.top_rounds, active.len());
                    if size < 2 {
                        return Err(PairingError::BracketTooSmall {
                            available: active.len(),
                        }
                        .into());
                    }
                    let standings = self.standings();
                    let plan: PairingPlan = TopCutPairer::from_standings(&standings, size).into();
                    log::info!("Tournament {} seeding top {size}", self.id);
                    (PairingEngine::new(plan), Some(size))
                }
            }
        };

        let round = engine.pair(&PairingRequest {
            participants: &active,
            history: &self.rounds,
            round_number: next,
            policy: &self.config.scoring,
        })?;

        self.bracket_size = bracket_size;
        log::info!("Tournament {} advanced to {}", self.id, round.stage());
        Ok(self.commit_round(round))
    }

    /// Record or correct a match result.
    ///
    /// Elimination results lock once the following round exists, and Swiss
    /// results lock once the bracket has been seeded, since later pairings
    /// were built from them. Corrections past that point go through
    /// [`Tournament::rollback_round`].
    pub fn record_result(
        &mut self,
        round_number: RoundNumber,
        match_id: MatchId,
        report: ResultReport,
    ) -> TournamentResult<&Round> {
        self.require("record result", TournamentStatus::Active)?;

        let index = round_number
            .checked_sub(1)
            .map(|i| i as usize)
            .filter(|&i| i < self.rounds.len())
            .ok_or(NotFoundError::Round(round_number))?;

        let current = &self.rounds[index];
        if current.kind.is_top_cut() && index + 1 < self.rounds.len() {
            return Err(ValidationError::TopCutLocked {
                round: round_number,
            }
            .into());
        }
        if !current.kind.is_top_cut() && self.bracket_size.is_some() {
            return Err(ValidationError::SwissLocked {
                round: round_number,
            }
            .into());
        }

        let updated = round::record_result(current, match_id, report, &self.config.scoring)?;
        self.rounds[index] = updated;
        Ok(&self.rounds[index])
    }

    /// Current standings, recomputed from every round
    pub fn standings(&self) -> Vec<Standing> {
        compute_standings(&self.participants, &self.rounds, &self.config.scoring)
    }

    /// Close an active tournament whose final round is complete
    pub fn complete(&mut self) -> TournamentResult<()> {
        const OP: &str = "complete tournament";
        self.require(OP, TournamentStatus::Active)?;
        self.require_round_complete(OP)?;

        let final_round = self.final_round_number();
        if self.current_round < final_round {
            return Err(TournamentError::transition(
                OP,
                self.status,
                Precondition::FinalRoundNotReached {
                    current: self.current_round,
                    final_round,
                },
            ));
        }

        self.status = TournamentStatus::Completed;
        self.completed_at = Some(Utc::now());
        log::info!("Tournament {} completed", self.id);
        Ok(())
    }

    /// Confirm a completed tournament.
    ///
    /// Computes player record updates from the final results. Confirming an
    /// already confirmed tournament returns [`Confirmation::AlreadyConfirmed`]
    /// and changes nothing.
    ///
    /// # Arguments
    ///
    /// * `registry` - Player ratings before the tournament
    /// * `elo` - Rating parameters
    pub fn confirm(
        &mut self,
        registry: &PlayerRegistry,
        elo: &EloConfig,
    ) -> TournamentResult<Confirmation> {
        if self.status == TournamentStatus::Confirmed {
            log::debug!("Tournament {} already confirmed", self.id);
            return Ok(Confirmation::AlreadyConfirmed);
        }
        self.require("confirm tournament", TournamentStatus::Completed)?;

        let deltas = player_deltas(self, registry, elo);
        self.status = TournamentStatus::Confirmed;
        self.confirmed_at = Some(Utc::now());
        log::info!("Tournament {} confirmed", self.id);
        Ok(Confirmation::Confirmed { deltas })
    }

    /// Administrative recovery: delete the last round.
    ///
    /// A completed tournament reopens as active; removing round 1 returns it
    /// to draft. Confirmed tournaments are final.
    pub fn rollback_round(&mut self) -> TournamentResult<Round> {
        const OP: &str = "roll back round";
        match self.status {
            TournamentStatus::Confirmed => {
                return Err(TournamentError::transition(
                    OP,
                    self.status,
                    Precondition::Confirmed,
                ));
            }
            TournamentStatus::Draft => {
                return Err(TournamentError::transition(
                    OP,
                    self.status,
                    Precondition::Status {
                        expected: TournamentStatus::Active,
                    },
                ));
            }
            TournamentStatus::Active | TournamentStatus::Completed => {}
        }

        let removed = self
            .rounds
            .pop()
            .ok_or_else(|| TournamentError::transition(OP, self.status, Precondition::NoRounds))?;

        if !self.rounds.iter().any(|r| r.kind.is_top_cut()) {
            self.bracket_size = None;
        }
        self.current_round = self.rounds.len() as RoundNumber;
        self.completed_at = None;

        if self.rounds.is_empty() {
            self.status = TournamentStatus::Draft;
            self.started_at = None;
        } else {
            self.status = TournamentStatus::Active;
        }

        log::warn!(
            "Tournament {} rolled back {}; now {}",
            self.id,
            removed.stage(),
            self.status
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Player;
    use crate::round::MatchResult;
    use crate::tournament::{TournamentConfig, TournamentFormat};

    fn registry() -> PlayerRegistry {
        PlayerRegistry::new((1..=8).map(|id| Player::new(id, format!("P{id}"))))
    }

    fn tournament(players: i64, swiss_rounds: u32, top_rounds: u32) -> Tournament {
        let format = TournamentFormat {
            swiss_rounds,
            top_rounds,
            rated: false,
            ..TournamentFormat::default()
        };
        let mut t = Tournament::new(1, TournamentConfig::new("League night", format));
        let registry = registry();
        for id in 1..=players {
            t.register(id, &registry).unwrap();
        }
        t
    }

    /// First listed player wins every open match of the current round
    fn play_out(t: &mut Tournament) {
        let round = t.current_round;
        let open: Vec<MatchId> = t
            .last_round()
            .unwrap()
            .matches
            .iter()
            .filter(|m| !m.is_decided())
            .map(|m| m.id)
            .collect();
        for id in open {
            t.record_result(round, id, MatchResult::Win1.into()).unwrap();
        }
    }

    #[test]
    fn test_register_rules() {
        let mut t = tournament(2, 1, 0);
        let registry = registry();

        assert_eq!(
            t.register(1, &registry),
            Err(TournamentError::Validation(ValidationError::AlreadyRegistered(1)))
        );
        assert_eq!(
            t.register(99, &registry),
            Err(TournamentError::NotFound(NotFoundError::Player(99)))
        );
    }

    #[test]
    fn test_start_requires_two_participants() {
        let mut t = tournament(1, 3, 0);
        let err = t.start(&registry()).unwrap_err();
        assert!(matches!(
            err,
            TournamentError::InvalidTransition {
                precondition: Precondition::MinParticipants { needed: 2, current: 1 },
                ..
            }
        ));
        assert_eq!(t.status, TournamentStatus::Draft);
        assert!(t.rounds.is_empty());
    }

    #[test]
    fn test_start_seeds_by_rating_when_rated() {
        let mut t = tournament(3, 1, 0);
        t.config.format.rated = true;
        let registry = PlayerRegistry::new([
            Player::new(1, "A").with_rating(1000),
            Player::new(2, "B").with_rating(1400),
            Player::new(3, "C").with_rating(1200),
        ]);

        t.start(&registry).unwrap();
        let order: Vec<_> = t.participants.iter().map(|p| (p.player_id, p.seed)).collect();
        assert_eq!(order, vec![(2, 1), (3, 2), (1, 3)]);
        assert_eq!(t.rounds[0].bye_recipient(), Some(1));
        assert_eq!(t.current_round, 1);
        assert!(t.started_at.is_some());
    }

    #[test]
    fn test_advance_blocked_by_incomplete_round() {
        let mut t = tournament(4, 3, 0);
        t.start(&registry()).unwrap();

        let err = t.advance_round().unwrap_err();
        assert!(matches!(
            err,
            TournamentError::InvalidTransition {
                precondition: Precondition::RoundIncomplete { round: 1, pending: 2 },
                ..
            }
        ));
        assert_eq!(t.rounds.len(), 1);
    }

    #[test]
    fn test_full_swiss_run() {
        let mut t = tournament(4, 2, 0);
        t.start(&registry()).unwrap();
        play_out(&mut t);
        t.advance_round().unwrap();
        play_out(&mut t);

        let err = t.advance_round().unwrap_err();
        assert!(matches!(
            err,
            TournamentError::InvalidTransition {
                precondition: Precondition::AllRoundsCreated { final_round: 2 },
                ..
            }
        ));

        t.complete().unwrap();
        assert_eq!(t.status, TournamentStatus::Completed);
        assert_eq!(t.current_round as usize, t.rounds.len());
    }

    #[test]
    fn test_complete_requires_final_round() {
        let mut t = tournament(4, 2, 0);
        t.start(&registry()).unwrap();
        play_out(&mut t);
        assert!(matches!(
            t.complete(),
            Err(TournamentError::InvalidTransition {
                precondition: Precondition::FinalRoundNotReached {
                    current: 1,
                    final_round: 2
                },
                ..
            })
        ));
    }

    #[test]
    fn test_top_cut_seeded_from_standings() {
        let mut t = tournament(5, 2, 1);
        t.start(&registry()).unwrap();
        play_out(&mut t);
        t.advance_round().unwrap();
        play_out(&mut t);

        let leaders: Vec<_> = t.standings().iter().take(2).map(|s| s.player_id).collect();
        let top = t.advance_round().unwrap().clone();
        assert!(top.kind.is_top_cut());
        assert_eq!(top.stage().to_string(), "Final");
        assert_eq!(top.matches[0].player1, leaders[0]);
        assert_eq!(top.matches[0].player2, Some(leaders[1]));
        assert_eq!(t.bracket_size, Some(2));

        let err = t.record_result(3, 1, MatchResult::Draw.into()).unwrap_err();
        assert!(matches!(
            err,
            TournamentError::Validation(ValidationError::DrawInTopCut { round: 3 })
        ));

        t.record_result(3, 1, MatchResult::Win2.into()).unwrap();
        t.complete().unwrap();
        assert_eq!(t.standings()[0].player_id, leaders[1]);
    }

    #[test]
    fn test_top_cut_result_locked_after_next_round() {
        let mut t = tournament(8, 1, 2);
        t.start(&registry()).unwrap();
        play_out(&mut t);
        t.advance_round().unwrap();
        play_out(&mut t);
        t.advance_round().unwrap();

        let err = t.record_result(2, 1, MatchResult::Win2.into()).unwrap_err();
        assert_eq!(
            err,
            TournamentError::Validation(ValidationError::TopCutLocked { round: 2 })
        );
    }

    #[test]
    fn test_swiss_results_locked_once_bracket_seeded() {
        let mut t = tournament(4, 1, 1);
        t.start(&registry()).unwrap();
        play_out(&mut t);
        let final_round = t.advance_round().unwrap().clone();

        let err = t.record_result(1, 1, MatchResult::Win2.into()).unwrap_err();
        assert_eq!(
            err,
            TournamentError::Validation(ValidationError::SwissLocked { round: 1 })
        );
        assert_eq!(t.round(2), Some(&final_round));

        // rolling the bracket back reopens the Swiss results
        t.rollback_round().unwrap();
        assert_eq!(t.bracket_size, None);
        t.record_result(1, 1, MatchResult::Win2.into()).unwrap();
    }

    #[test]
    fn test_dropped_participant_skips_pairing() {
        let mut t = tournament(4, 2, 0);
        t.start(&registry()).unwrap();
        play_out(&mut t);
        t.drop_participant(4).unwrap();
        assert_eq!(
            t.drop_participant(4),
            Err(TournamentError::Validation(ValidationError::AlreadyDropped(4)))
        );

        let round = t.advance_round().unwrap();
        assert!(round.match_for(4).is_none());
        assert!(round.bye_recipient().is_some());
        assert_eq!(t.standings().len(), 4);
    }

    #[test]
    fn test_confirm_is_idempotent() {
        let mut t = tournament(2, 1, 0);
        t.start(&registry()).unwrap();
        play_out(&mut t);

        assert!(matches!(
            t.confirm(&registry(), &EloConfig::default()),
            Err(TournamentError::InvalidTransition { .. })
        ));

        t.complete().unwrap();
        let first = t.confirm(&registry(), &EloConfig::default()).unwrap();
        assert!(matches!(first, Confirmation::Confirmed { ref deltas } if deltas.len() == 2));
        assert_eq!(
            t.confirm(&registry(), &EloConfig::default()).unwrap(),
            Confirmation::AlreadyConfirmed
        );
        assert_eq!(t.status, TournamentStatus::Confirmed);
    }

    #[test]
    fn test_rollback_round() {
        let mut t = tournament(4, 1, 0);
        t.start(&registry()).unwrap();
        play_out(&mut t);
        t.complete().unwrap();

        let removed = t.rollback_round().unwrap();
        assert_eq!(removed.number, 1);
        assert_eq!(t.status, TournamentStatus::Draft);
        assert_eq!(t.current_round, 0);
        assert!(t.completed_at.is_none());

        assert!(matches!(
            t.rollback_round(),
            Err(TournamentError::InvalidTransition { .. })
        ));

        // restart works after rolling back to draft
        t.start(&registry()).unwrap();
        assert_eq!(t.rounds.len(), 1);
    }

    #[test]
    fn test_rollback_refused_once_confirmed() {
        let mut t = tournament(2, 1, 0);
        t.start(&registry()).unwrap();
        play_out(&mut t);
        t.complete().unwrap();
        t.confirm(&registry(), &EloConfig::default()).unwrap();

        assert!(matches!(
            t.rollback_round(),
            Err(TournamentError::InvalidTransition {
                precondition: Precondition::Confirmed,
                ..
            })
        ));
    }
}
