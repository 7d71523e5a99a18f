//! Player data models.

use serde::{Deserialize, Serialize};

/// Player ID type
pub type PlayerId = i64;

/// Rating assigned to players the directory has no rating for
pub const DEFAULT_RATING: i32 = 1200;

/// Player profile with cumulative tournament counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub city: Option<String>,
    pub rating: i32,
    pub tournaments: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl Player {
    /// Create a player with the default rating and empty counters
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            city: None,
            rating: DEFAULT_RATING,
            tournaments: 0,
            wins: 0,
            losses: 0,
            draws: 0,
        }
    }

    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Fold a confirmed tournament's outcome into the counters.
    ///
    /// Ratings never go below zero.
    pub fn apply(&mut self, delta: &PlayerDelta) {
        self.rating = (self.rating + delta.rating_change).max(0);
        self.tournaments += delta.tournaments;
        self.wins += delta.wins;
        self.losses += delta.losses;
        self.draws += delta.draws;
    }
}

/// Change to a player's aggregates produced by confirming one tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDelta {
    pub player_id: PlayerId,
    pub rating_change: i32,
    pub tournaments: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}
