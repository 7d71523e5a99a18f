//! Tournament aggregate and its state machine.
//!
//! A [`Tournament`] moves through `draft → active → completed → confirmed`:
//! - Participant registration while in draft
//! - Seeding and round 1 pairing on start
//! - Swiss rounds, then an optional single-elimination top cut
//! - Rating and record updates computed on confirmation
//!
//! ## Example
//!
//! ```
//! use swiss_league::registry::{Player, PlayerRegistry};
//! use swiss_league::round::MatchResult;
//! use swiss_league::tournament::{Tournament, TournamentConfig, TournamentFormat};
//!
//! let registry = PlayerRegistry::new([Player::new(1, "Anna"), Player::new(2, "Boris")]);
//! let format = TournamentFormat { swiss_rounds: 1, ..TournamentFormat::default() };
//! let mut tournament = Tournament::new(1, TournamentConfig::new("Friday Swiss", format));
//!
//! tournament.register(1, &registry)?;
//! tournament.register(2, &registry)?;
//! tournament.start(&registry)?;
//! tournament.record_result(1, 1, MatchResult::Win1.into())?;
//! tournament.complete()?;
//!
//! assert_eq!(tournament.standings()[0].player_id, 1);
//! # Ok::<(), swiss_league::TournamentError>(())
//! ```

pub mod models;
pub mod rating;
pub mod state_machine;

pub use models::{
    Participant, Tournament, TournamentConfig, TournamentFormat, TournamentId, TournamentStatus,
    TournamentSummary,
};
pub use rating::EloConfig;
pub use state_machine::Confirmation;
