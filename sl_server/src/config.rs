//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use swiss_league::{Player, PlayerId, ScoringPolicy};

const DEFAULT_BIND: &str = "127.0.0.1:6969";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// JSON file seeding the player directory
    pub players_file: Option<PathBuf>,
    /// Prometheus exporter address; metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Scoring applied to tournaments created without their own policy
    pub scoring: ScoringPolicy,
}

/// Player entry in the seed file
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSeed {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub rating: Option<i32>,
}

impl From<PlayerSeed> for Player {
    fn from(seed: PlayerSeed) -> Self {
        let mut player = Player::new(seed.id, seed.name);
        player.city = seed.city;
        if let Some(rating) = seed.rating {
            player.rating = rating;
        }
        player
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `players_file_override` - Optional player seed file (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        players_file_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env("SERVER_BIND")?.unwrap_or(default_bind()?),
        };

        let players_file =
            players_file_override.or_else(|| std::env::var("PLAYERS_FILE").ok().map(PathBuf::from));

        let metrics_bind = parse_env("METRICS_BIND")?;

        let defaults = ScoringPolicy::default();
        let scoring = ScoringPolicy {
            win_points: parse_env("SCORING_WIN_POINTS")?.unwrap_or(defaults.win_points),
            draw_points: parse_env("SCORING_DRAW_POINTS")?.unwrap_or(defaults.draw_points),
            loss_points: defaults.loss_points,
            bye_points: parse_env("SCORING_BYE_POINTS")?.unwrap_or(defaults.bye_points),
            opponent_win_floor: parse_env("SCORING_OMW_FLOOR")?
                .unwrap_or(defaults.opponent_win_floor),
            max_games_per_match: parse_env("SCORING_MAX_GAMES")?
                .unwrap_or(defaults.max_games_per_match),
        };

        Ok(ServerConfig {
            bind,
            players_file,
            metrics_bind,
            scoring,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate().map_err(|e| ConfigError::Invalid {
            var: "SCORING_*".to_string(),
            reason: e.to_string(),
        })?;

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server address ({})", self.bind),
            });
        }

        Ok(())
    }

    /// Read the player seed file, if one is configured
    pub fn load_players(&self) -> Result<Vec<Player>, ConfigError> {
        match &self.players_file {
            Some(path) => load_players(path),
            None => Ok(Vec::new()),
        }
    }
}

/// Parse a JSON array of [`PlayerSeed`] entries
pub fn load_players(path: &Path) -> Result<Vec<Player>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::PlayersFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_players(&raw).map_err(|reason| ConfigError::PlayersFile {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_players(raw: &str) -> Result<Vec<Player>, String> {
    let seeds: Vec<PlayerSeed> = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = seeds.iter().find(|s| !seen.insert(s.id)) {
        return Err(format!("duplicate player id {}", dup.id));
    }

    Ok(seeds.into_iter().map(Player::from).collect())
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Cannot load players from {}: {reason}", path.display())]
    PlayersFile { path: PathBuf, reason: String },
}

fn default_bind() -> Result<SocketAddr, ConfigError> {
    DEFAULT_BIND.parse().map_err(|_| ConfigError::Invalid {
        var: "SERVER_BIND".to_string(),
        reason: format!("Default {DEFAULT_BIND} is not an address"),
    })
}

/// Parse an optional environment variable; a set but malformed value is an error
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
