//! Authorization of tournament mutations.
//!
//! The gate is a set of pure predicates over the acting user and the target
//! tournament. It has no side effects and never reaches the state machine
//! itself; the command layer runs it before every mutating call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::registry::PlayerId;
use crate::tournament::{Tournament, TournamentId};

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May manage every tournament
    Admin,
    /// May manage tournaments they are assigned to
    Judge,
    Player,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Judge => write!(f, "judge"),
            Role::Player => write!(f, "player"),
        }
    }
}

/// Unknown role name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "judge" => Ok(Role::Judge),
            "player" => Ok(Role::Player),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Authenticated user performing an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: PlayerId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: PlayerId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Caller lacks authorization
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{role} {actor_id} may not {action}")]
pub struct PermissionDenied {
    pub actor_id: PlayerId,
    pub role: Role,
    pub action: String,
    /// Target tournament, if any
    pub tournament_id: Option<TournamentId>,
}

/// Role-based authorization predicates
pub struct PermissionGate;

impl PermissionGate {
    /// Whether `actor` may mutate a tournament judged by `judge_id`.
    ///
    /// Admins may mutate anything; a judge only a tournament naming them as
    /// its judge; everyone else is denied.
    pub fn can_manage(actor: &Actor, judge_id: Option<PlayerId>) -> bool {
        match actor.role {
            Role::Admin => true,
            Role::Judge => judge_id == Some(actor.id),
            Role::Player => false,
        }
    }

    /// Whether `actor` may create tournaments
    pub fn can_create_tournament(actor: &Actor) -> bool {
        match actor.role {
            Role::Admin | Role::Judge => true,
            Role::Player => false,
        }
    }

    /// Reading tournament state is open to every role
    pub fn can_view(_actor: &Actor) -> bool {
        true
    }

    /// Require management rights over `tournament`
    pub fn authorize_manage(
        actor: &Actor,
        tournament: &Tournament,
        action: &str,
    ) -> Result<(), PermissionDenied> {
        if Self::can_manage(actor, tournament.config.judge_id) {
            Ok(())
        } else {
            Err(PermissionDenied {
                actor_id: actor.id,
                role: actor.role,
                action: action.to_string(),
                tournament_id: Some(tournament.id),
            })
        }
    }

    /// Require the right to create tournaments
    pub fn authorize_create(actor: &Actor) -> Result<(), PermissionDenied> {
        if Self::can_create_tournament(actor) {
            Ok(())
        } else {
            Err(PermissionDenied {
                actor_id: actor.id,
                role: actor.role,
                action: "create tournament".to_string(),
                tournament_id: None,
            })
        }
    }
}
