//! Identity collaborator boundary.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use super::{Player, PlayerDelta, PlayerId, PlayerRegistry};
use crate::errors::StoreResult;
use crate::tournament::TournamentId;

/// Player directory owned outside the engine
///
/// The only write the engine routes back is the aggregate update of a
/// confirmed tournament, which implementations must apply at most once per
/// tournament id.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    /// Fetch a single player profile
    async fn get_player(&self, id: PlayerId) -> StoreResult<Option<Player>>;

    /// Build a registry snapshot holding the requested players.
    ///
    /// Unknown ids are skipped.
    async fn snapshot(&self, ids: &[PlayerId]) -> StoreResult<PlayerRegistry>;

    /// Apply a confirmed tournament's deltas.
    ///
    /// Returns `false` without touching any player when the tournament was
    /// already applied.
    async fn apply_tournament_result(
        &self,
        tournament_id: TournamentId,
        deltas: &[PlayerDelta],
    ) -> StoreResult<bool>;
}

#[derive(Debug, Default)]
struct DirectoryState {
    players: HashMap<PlayerId, Player>,
    applied: HashSet<TournamentId>,
}

/// In-process player directory
#[derive(Debug, Default)]
pub struct InMemoryPlayerDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryPlayerDirectory {
    pub fn new(players: impl IntoIterator<Item = Player>) -> Self {
        Self {
            state: RwLock::new(DirectoryState {
                players: players.into_iter().map(|p| (p.id, p)).collect(),
                applied: HashSet::new(),
            }),
        }
    }

    /// Insert or replace a player profile
    pub async fn upsert(&self, player: Player) {
        self.state.write().await.players.insert(player.id, player);
    }

    pub async fn all_players(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.state.read().await.players.values().cloned().collect();
        players.sort_by_key(|p| p.id);
        players
    }
}

#[async_trait]
impl PlayerDirectory for InMemoryPlayerDirectory {
    async fn get_player(&self, id: PlayerId) -> StoreResult<Option<Player>> {
        Ok(self.state.read().await.players.get(&id).cloned())
    }

    async fn snapshot(&self, ids: &[PlayerId]) -> StoreResult<PlayerRegistry> {
        let state = self.state.read().await;
        Ok(PlayerRegistry::new(
            ids.iter().filter_map(|id| state.players.get(id).cloned()),
        ))
    }

    async fn apply_tournament_result(
        &self,
        tournament_id: TournamentId,
        deltas: &[PlayerDelta],
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        if !state.applied.insert(tournament_id) {
            log::debug!("Tournament {tournament_id} results already applied");
            return Ok(false);
        }

        for delta in deltas {
            if let Some(player) = state.players.get_mut(&delta.player_id) {
                player.apply(delta);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(player_id: PlayerId) -> PlayerDelta {
        PlayerDelta {
            player_id,
            rating_change: 16,
            tournaments: 1,
            wins: 2,
            losses: 1,
            draws: 0,
        }
    }

    #[tokio::test]
    async fn test_apply_tournament_result_once() {
        let directory = InMemoryPlayerDirectory::new([Player::new(1, "Anna")]);

        assert!(directory.apply_tournament_result(5, &[delta(1)]).await.unwrap());
        assert!(!directory.apply_tournament_result(5, &[delta(1)]).await.unwrap());

        let player = directory.get_player(1).await.unwrap().unwrap();
        assert_eq!(player.tournaments, 1);
        assert_eq!(player.wins, 2);
        assert_eq!(player.rating, 1216);
    }

    #[tokio::test]
    async fn test_snapshot_skips_unknown_ids() {
        let directory = InMemoryPlayerDirectory::new([Player::new(1, "Anna"), Player::new(2, "Boris")]);
        let registry = directory.snapshot(&[1, 3]).await.unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(1));
    }
}
