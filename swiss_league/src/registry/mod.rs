//! Read-only view of the players available for pairing.
//!
//! The engine never talks to the identity collaborator directly. Callers
//! fetch a [`PlayerRegistry`] snapshot from a [`PlayerDirectory`] and hand it
//! to the operations that need ratings or identity checks.

pub mod directory;
pub mod models;

pub use directory::{InMemoryPlayerDirectory, PlayerDirectory};
pub use models::{DEFAULT_RATING, Player, PlayerDelta, PlayerId};

use std::collections::HashMap;

/// Snapshot of player profiles keyed by id
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
}

impl PlayerRegistry {
    pub fn new(players: impl IntoIterator<Item = Player>) -> Self {
        Self {
            players: players.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// Rating of a player, falling back to [`DEFAULT_RATING`] for unknown ids
    pub fn rating(&self, id: PlayerId) -> i32 {
        self.players.get(&id).map_or(DEFAULT_RATING, |p| p.rating)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Order players for seeding.
    ///
    /// Rated events seed by rating, highest first; equal ratings keep
    /// registration order. Unrated events seed purely by registration order.
    pub fn seed_order(&self, registered: &[PlayerId], rated: bool) -> Vec<PlayerId> {
        let mut order = registered.to_vec();
        if rated {
            // stable sort keeps registration order among equal ratings
            order.sort_by_key(|&id| std::cmp::Reverse(self.rating(id)));
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PlayerRegistry {
        PlayerRegistry::new([
            Player::new(1, "Anna").with_rating(1500),
            Player::new(2, "Boris").with_rating(1700),
            Player::new(3, "Vera").with_rating(1500),
            Player::new(4, "Gleb"),
        ])
    }

    #[test]
    fn test_rated_seed_order_by_rating_then_registration() {
        let order = registry().seed_order(&[1, 2, 3, 4], true);
        assert_eq!(order, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_unrated_seed_order_is_registration_order() {
        let order = registry().seed_order(&[3, 1, 4, 2], false);
        assert_eq!(order, vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_unknown_player_gets_default_rating() {
        assert_eq!(registry().rating(99), DEFAULT_RATING);
        assert!(!registry().contains(99));
    }
}
