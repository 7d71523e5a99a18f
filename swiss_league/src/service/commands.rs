//! Command surface over the tournament state machine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::TournamentStore;
use crate::errors::{NotFoundError, TournamentResult};
use crate::permissions::{Actor, PermissionGate};
use crate::registry::{Player, PlayerDirectory, PlayerId, PlayerRegistry};
use crate::round::{MatchId, ResultReport, Round, RoundNumber};
use crate::standings::Standing;
use crate::tournament::{
    Confirmation, EloConfig, Tournament, TournamentConfig, TournamentId, TournamentSummary,
};

type LockTable = Mutex<HashMap<TournamentId, Arc<AsyncMutex<()>>>>;

/// Writer lock on one tournament.
///
/// Releasing it drops the tournament's entry from the lock table when no
/// other writer holds or waits on it, so the table only holds tournaments
/// with writes in flight.
struct WriteGuard<'a> {
    locks: &'a LockTable,
    id: TournamentId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.id);
        }
    }
}

/// Orchestrates authorization, loading, state transitions and saving.
///
/// Writers are serialized per tournament: each mutating command holds that
/// tournament's lock from load to save, applies the transition to its own
/// snapshot, and saves only on success. Readers get independent snapshots
/// from the store and never observe a half-applied change.
pub struct TournamentService {
    /// Persistence collaborator
    store: Arc<dyn TournamentStore>,

    /// Identity collaborator
    directory: Arc<dyn PlayerDirectory>,

    /// Rating parameters applied on confirmation
    elo: EloConfig,

    /// Per-tournament writer locks, present while a write is in flight
    locks: LockTable,
}

impl TournamentService {
    /// Create a new tournament service
    ///
    /// # Arguments
    ///
    /// * `store` - Tournament persistence
    /// * `directory` - Player directory
    pub fn new(store: Arc<dyn TournamentStore>, directory: Arc<dyn PlayerDirectory>) -> Self {
        Self {
            store,
            directory,
            elo: EloConfig::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Override the rating parameters
    pub fn with_elo(mut self, elo: EloConfig) -> Self {
        self.elo = elo;
        self
    }

    fn lock_for(&self, id: TournamentId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id).or_default())
    }

    async fn load(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.store
            .load(id)
            .await?
            .ok_or_else(|| NotFoundError::Tournament(id).into())
    }

    /// Take the tournament's writer lock, load it and authorize `actor`
    async fn load_for_update(
        &self,
        actor: &Actor,
        id: TournamentId,
        action: &str,
    ) -> TournamentResult<(WriteGuard<'_>, Tournament)> {
        let guard = WriteGuard {
            locks: &self.locks,
            id,
            guard: Some(self.lock_for(id).lock_owned().await),
        };
        let tournament = self.load(id).await?;
        PermissionGate::authorize_manage(actor, &tournament, action)?;
        Ok((guard, tournament))
    }

    async fn registry_for(&self, tournament: &Tournament) -> TournamentResult<PlayerRegistry> {
        let ids: Vec<PlayerId> = tournament
            .participants
            .iter()
            .map(|p| p.player_id)
            .collect();
        Ok(self.directory.snapshot(&ids).await?)
    }

    /// Create a draft tournament
    ///
    /// # Arguments
    ///
    /// * `actor` - Must be an admin or judge
    /// * `config` - Validated before anything is stored
    pub async fn create_tournament(
        &self,
        actor: &Actor,
        config: TournamentConfig,
    ) -> TournamentResult<Tournament> {
        PermissionGate::authorize_create(actor)?;
        config.validate()?;

        let tournament = self.store.create(config).await?;
        log::info!(
            "Tournament {} '{}' created by {}",
            tournament.id,
            tournament.config.name,
            actor.id
        );
        Ok(tournament)
    }

    /// Enroll a player in a draft tournament
    pub async fn register_participant(
        &self,
        actor: &Actor,
        id: TournamentId,
        player: PlayerId,
    ) -> TournamentResult<Tournament> {
        let (_guard, mut tournament) = self
            .load_for_update(actor, id, "register participant")
            .await?;

        let registry = self.directory.snapshot(&[player]).await?;
        tournament.register(player, &registry)?;

        self.store.save(&tournament).await?;
        Ok(tournament)
    }

    /// Withdraw a registration, or drop an active participant
    pub async fn drop_participant(
        &self,
        actor: &Actor,
        id: TournamentId,
        player: PlayerId,
    ) -> TournamentResult<Tournament> {
        let (_guard, mut tournament) = self
            .load_for_update(actor, id, "drop participant")
            .await?;

        tournament.drop_participant(player)?;

        self.store.save(&tournament).await?;
        Ok(tournament)
    }

    /// Seed participants and pair round 1
    pub async fn start_tournament(
        &self,
        actor: &Actor,
        id: TournamentId,
    ) -> TournamentResult<Tournament> {
        let (_guard, mut tournament) = self
            .load_for_update(actor, id, "start tournament")
            .await?;

        let registry = self.registry_for(&tournament).await?;
        tournament.start(&registry)?;

        self.store.save(&tournament).await?;
        Ok(tournament)
    }

    /// Pair the next round
    ///
    /// # Returns
    ///
    /// * `Round` - The newly created round
    pub async fn advance_round(&self, actor: &Actor, id: TournamentId) -> TournamentResult<Round> {
        let (_guard, mut tournament) = self.load_for_update(actor, id, "advance round").await?;

        let round = tournament.advance_round()?.clone();

        self.store.save(&tournament).await?;
        Ok(round)
    }

    /// Record or correct a match result
    ///
    /// # Returns
    ///
    /// * `Round` - The round holding the match, after the update
    pub async fn record_match_result(
        &self,
        actor: &Actor,
        id: TournamentId,
        round: RoundNumber,
        match_id: MatchId,
        report: ResultReport,
    ) -> TournamentResult<Round> {
        let (_guard, mut tournament) = self.load_for_update(actor, id, "record result").await?;

        let updated = tournament.record_result(round, match_id, report)?.clone();

        self.store.save(&tournament).await?;
        log::debug!(
            "Tournament {id} round {round} match {match_id}: {}",
            report.result
        );
        Ok(updated)
    }

    /// Ranked standings; readable by every role
    pub async fn get_standings(
        &self,
        _actor: &Actor,
        id: TournamentId,
    ) -> TournamentResult<Vec<Standing>> {
        Ok(self.load(id).await?.standings())
    }

    /// Close the tournament after its final round
    pub async fn complete_tournament(
        &self,
        actor: &Actor,
        id: TournamentId,
    ) -> TournamentResult<Tournament> {
        let (_guard, mut tournament) = self
            .load_for_update(actor, id, "complete tournament")
            .await?;

        tournament.complete()?;

        self.store.save(&tournament).await?;
        Ok(tournament)
    }

    /// Confirm a completed tournament and update player records.
    ///
    /// The directory applies a tournament's deltas at most once, so a retry
    /// after a failed save cannot double-count. Confirming an already
    /// confirmed tournament returns it unchanged.
    pub async fn confirm_tournament(
        &self,
        actor: &Actor,
        id: TournamentId,
    ) -> TournamentResult<Tournament> {
        let (_guard, mut tournament) = self
            .load_for_update(actor, id, "confirm tournament")
            .await?;

        let registry = self.registry_for(&tournament).await?;
        match tournament.confirm(&registry, &self.elo)? {
            Confirmation::AlreadyConfirmed => Ok(tournament),
            Confirmation::Confirmed { deltas } => {
                let applied = self.directory.apply_tournament_result(id, &deltas).await?;
                if !applied {
                    log::warn!("Tournament {id} results were already applied to player records");
                }
                self.store.save(&tournament).await?;
                Ok(tournament)
            }
        }
    }

    /// Administrative recovery: delete the last round
    ///
    /// # Returns
    ///
    /// * `Round` - The removed round
    pub async fn rollback_round(&self, actor: &Actor, id: TournamentId) -> TournamentResult<Round> {
        let (_guard, mut tournament) = self.load_for_update(actor, id, "roll back round").await?;

        let removed = tournament.rollback_round()?;

        self.store.save(&tournament).await?;
        Ok(removed)
    }

    /// Load a tournament snapshot
    pub async fn get_tournament(
        &self,
        _actor: &Actor,
        id: TournamentId,
    ) -> TournamentResult<Tournament> {
        self.load(id).await
    }

    /// Summaries of every tournament
    pub async fn list_tournaments(&self) -> TournamentResult<Vec<TournamentSummary>> {
        Ok(self.store.list().await?)
    }

    /// Look up a player profile
    pub async fn get_player(&self, id: PlayerId) -> TournamentResult<Player> {
        self.directory
            .get_player(id)
            .await?
            .ok_or_else(|| NotFoundError::Player(id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{StoreError, StoreResult, TournamentError};
    use crate::permissions::Role;
    use crate::registry::InMemoryPlayerDirectory;
    use crate::round::MatchResult;
    use crate::service::InMemoryTournamentStore;
    use crate::tournament::{TournamentFormat, TournamentStatus};
    use async_trait::async_trait;

    /// Store whose saves always fail
    struct BrokenStore(InMemoryTournamentStore);

    #[async_trait]
    impl TournamentStore for BrokenStore {
        async fn create(&self, config: TournamentConfig) -> StoreResult<Tournament> {
            self.0.create(config).await
        }

        async fn load(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
            self.0.load(id).await
        }

        async fn save(&self, _tournament: &Tournament) -> StoreResult<()> {
            Err(StoreError::Unavailable("disk full".to_string()))
        }

        async fn list(&self) -> StoreResult<Vec<TournamentSummary>> {
            self.0.list().await
        }
    }

    fn directory() -> Arc<InMemoryPlayerDirectory> {
        Arc::new(InMemoryPlayerDirectory::new(
            (1..=4).map(|id| Player::new(id, format!("P{id}"))),
        ))
    }

    fn admin() -> Actor {
        Actor::new(100, Role::Admin)
    }

    fn format() -> TournamentFormat {
        TournamentFormat {
            swiss_rounds: 1,
            ..TournamentFormat::default()
        }
    }

    #[tokio::test]
    async fn test_player_cannot_create() {
        let service = TournamentService::new(Arc::new(InMemoryTournamentStore::new()), directory());
        let err = service
            .create_tournament(&Actor::new(1, Role::Player), TournamentConfig::new("Open", format()))
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_state_untouched() {
        let inner = InMemoryTournamentStore::new();
        let created = inner
            .create(TournamentConfig::new("Open", format()))
            .await
            .unwrap();
        let service = TournamentService::new(Arc::new(BrokenStore(inner)), directory());

        let err = service
            .register_participant(&admin(), created.id, 1)
            .await
            .unwrap_err();
        assert_eq!(err.client_message(), "Internal server error");

        let stored = service.get_tournament(&admin(), created.id).await.unwrap();
        assert!(stored.participants.is_empty());
    }

    #[tokio::test]
    async fn test_judge_runs_own_tournament() {
        let service = TournamentService::new(Arc::new(InMemoryTournamentStore::new()), directory());
        let judge = Actor::new(50, Role::Judge);
        let t = service
            .create_tournament(&judge, TournamentConfig::new("Open", format()).with_judge(50))
            .await
            .unwrap();

        for player in [1, 2] {
            service.register_participant(&judge, t.id, player).await.unwrap();
        }
        let started = service.start_tournament(&judge, t.id).await.unwrap();
        assert_eq!(started.status, TournamentStatus::Active);

        let other = Actor::new(51, Role::Judge);
        assert!(matches!(
            service
                .record_match_result(&other, t.id, 1, 1, MatchResult::Win1.into())
                .await,
            Err(TournamentError::PermissionDenied(_))
        ));

        let round = service
            .record_match_result(&judge, t.id, 1, 1, MatchResult::Win1.into())
            .await
            .unwrap();
        assert!(round.completed);
    }

    #[tokio::test]
    async fn test_lock_table_emptied_after_writes() {
        let service = Arc::new(TournamentService::new(
            Arc::new(InMemoryTournamentStore::new()),
            directory(),
        ));
        let t = service
            .create_tournament(&admin(), TournamentConfig::new("Open", format()))
            .await
            .unwrap();
        let id = t.id;

        let writers: Vec<_> = (1..=4)
            .map(|player| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.register_participant(&admin(), id, player).await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }
        // failed writes release their entry too
        assert!(service.advance_round(&admin(), 77).await.is_err());

        assert!(service.locks.lock().unwrap().is_empty());
        let stored = service.get_tournament(&admin(), id).await.unwrap();
        assert_eq!(stored.participants.len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_tournament() {
        let service = TournamentService::new(Arc::new(InMemoryTournamentStore::new()), directory());
        assert_eq!(
            service.advance_round(&admin(), 77).await.unwrap_err(),
            TournamentError::NotFound(NotFoundError::Tournament(77))
        );
    }
}
