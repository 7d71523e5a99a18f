//! Command surface consumed by the orchestrating application.
//!
//! [`TournamentService`] ties the pure core to its collaborators: it runs the
//! permission gate, loads the tournament from a [`TournamentStore`], applies
//! one transition, routes confirmed results to the
//! [`PlayerDirectory`](crate::registry::PlayerDirectory) and saves.

pub mod commands;
pub mod store;

pub use commands::TournamentService;
pub use store::{InMemoryTournamentStore, TournamentStore};
