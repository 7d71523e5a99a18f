//! # Swiss League
//!
//! A Swiss-system tournament progression engine.
//!
//! The core pairs rounds, records results, computes standings with
//! deterministic tie-breaks, and moves a tournament through its lifecycle.
//! It performs no I/O of its own: persistence and player identity are
//! collaborator traits the caller supplies, and every transition works on a
//! tournament value the caller owns.
//!
//! ## Lifecycle
//!
//! - **Draft**: participants register
//! - **Active**: Swiss rounds are paired and played, followed by an optional
//!   single-elimination top cut seeded from the Swiss standings
//! - **Completed**: the final round is over
//! - **Confirmed**: results are acknowledged and player records updated once
//!
//! ## Core Modules
//!
//! - [`registry`]: Player profiles and the directory collaborator
//! - [`pairing`]: Swiss and elimination pairing
//! - [`round`]: Matches, results, and round completion
//! - [`standings`]: Ranking and tie-breaks
//! - [`tournament`]: The tournament aggregate and its state machine
//! - [`permissions`]: Role-based authorization
//! - [`service`]: Command surface with per-tournament write serialization

pub mod errors;
pub mod navigation;
pub mod pairing;
pub mod permissions;
pub mod registry;
pub mod round;
pub mod service;
pub mod standings;
pub mod tournament;

pub use errors::{
    NotFoundError, Precondition, StoreError, StoreResult, TournamentError, TournamentResult,
    ValidationError,
};
pub use pairing::{PairingEngine, PairingError, PairingResult, SeedingSplit};
pub use permissions::{Actor, PermissionDenied, PermissionGate, Role};
pub use registry::{Player, PlayerDirectory, PlayerId, PlayerRegistry};
pub use round::{Match, MatchResult, ResultReport, Round};
pub use service::{InMemoryTournamentStore, TournamentService, TournamentStore};
pub use standings::{ScoringPolicy, Standing, compute_standings};
pub use tournament::{Tournament, TournamentConfig, TournamentFormat, TournamentStatus};
