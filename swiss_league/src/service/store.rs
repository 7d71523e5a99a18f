//! Persistence collaborator boundary.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::errors::{StoreError, StoreResult};
use crate::tournament::{Tournament, TournamentConfig, TournamentId, TournamentSummary};

/// Tournament storage owned outside the engine
///
/// A failed `save` means the mutation was not applied; callers may retry
/// with the same input.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Allocate an id and persist a new draft tournament
    async fn create(&self, config: TournamentConfig) -> StoreResult<Tournament>;

    /// Load a tournament snapshot
    async fn load(&self, id: TournamentId) -> StoreResult<Option<Tournament>>;

    /// Persist a tournament, replacing the stored copy
    async fn save(&self, tournament: &Tournament) -> StoreResult<()>;

    /// Summaries of every stored tournament, oldest first
    async fn list(&self) -> StoreResult<Vec<TournamentSummary>>;
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: TournamentId,
    tournaments: BTreeMap<TournamentId, Tournament>,
}

/// In-process tournament store
#[derive(Debug, Default)]
pub struct InMemoryTournamentStore {
    state: RwLock<StoreState>,
}

impl InMemoryTournamentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentStore for InMemoryTournamentStore {
    async fn create(&self, config: TournamentConfig) -> StoreResult<Tournament> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let tournament = Tournament::new(state.next_id, config);
        state.tournaments.insert(tournament.id, tournament.clone());
        Ok(tournament)
    }

    async fn load(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        Ok(self.state.read().await.tournaments.get(&id).cloned())
    }

    async fn save(&self, tournament: &Tournament) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let Some(slot) = state.tournaments.get_mut(&tournament.id) else {
            return Err(StoreError::Rejected(format!(
                "tournament {} was never created",
                tournament.id
            )));
        };
        *slot = tournament.clone();
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<TournamentSummary>> {
        Ok(self
            .state
            .read()
            .await
            .tournaments
            .values()
            .map(Tournament::summary)
            .collect())
    }
}
