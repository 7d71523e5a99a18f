//! Pages an interface can show.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::permissions::{Actor, PermissionGate};
use crate::tournament::TournamentId;

/// Navigation target
///
/// Only the tournament view carries a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    Home,
    Tournaments,
    Players,
    Rating,
    Profile,
    CreateTournament,
    TournamentView { tournament_id: TournamentId },
}

impl Page {
    /// Whether `actor` may open this page
    pub fn is_accessible(&self, actor: &Actor) -> bool {
        match self {
            Page::CreateTournament => PermissionGate::can_create_tournament(actor),
            Page::Home
            | Page::Tournaments
            | Page::Players
            | Page::Rating
            | Page::Profile
            | Page::TournamentView { .. } => PermissionGate::can_view(actor),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Home => write!(f, "/"),
            Page::Tournaments => write!(f, "/tournaments"),
            Page::Players => write!(f, "/players"),
            Page::Rating => write!(f, "/rating"),
            Page::Profile => write!(f, "/profile"),
            Page::CreateTournament => write!(f, "/tournaments/new"),
            Page::TournamentView { tournament_id } => write!(f, "/tournaments/{tournament_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Role;

    #[test]
    fn test_tournament_view_carries_id() {
        let page = Page::TournamentView { tournament_id: 12 };
        assert_eq!(page.to_string(), "/tournaments/12");

        let json = serde_json::to_value(page).unwrap();
        assert_eq!(json["page"], "tournament_view");
        assert_eq!(json["tournament_id"], 12);

        let plain = serde_json::to_value(Page::Rating).unwrap();
        assert_eq!(plain, serde_json::json!({ "page": "rating" }));
    }

    #[test]
    fn test_create_page_needs_staff_role() {
        assert!(!Page::CreateTournament.is_accessible(&Actor::new(1, Role::Player)));
        assert!(Page::CreateTournament.is_accessible(&Actor::new(1, Role::Judge)));
        assert!(Page::Tournaments.is_accessible(&Actor::new(1, Role::Player)));
    }
}
