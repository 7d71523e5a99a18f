//! Structured logging configuration.
//!
//! The engine logs through the `log` facade; those records are bridged into
//! the tracing subscriber installed here so both land in one stream.

use swiss_league::{Actor, TournamentError, tournament::TournamentId};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from `RUST_LOG`, defaulting to `info`.
///
/// # Example
///
/// ```no_run
/// use sl_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true);

    // `init` also installs the log-to-tracing bridge
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Audit entry for a tournament command
///
/// # Arguments
///
/// * `command` - Command name
/// * `tournament_id` - Target tournament, if it exists yet
/// * `actor` - Caller
/// * `outcome` - Error returned by the command, if any
///
/// # Example
///
/// ```
/// use sl_server::logging::log_tournament_event;
/// use swiss_league::{Actor, Role};
///
/// log_tournament_event("start_tournament", Some(4), &Actor::new(1, Role::Admin), None);
/// ```
pub fn log_tournament_event(
    command: &str,
    tournament_id: Option<TournamentId>,
    actor: &Actor,
    outcome: Option<&TournamentError>,
) {
    match outcome {
        None => tracing::info!(
            command = command,
            tournament_id = tournament_id,
            actor_id = actor.id,
            role = %actor.role,
            "Tournament command applied"
        ),
        Some(TournamentError::PermissionDenied(denied)) => tracing::warn!(
            command = command,
            tournament_id = tournament_id,
            actor_id = actor.id,
            role = %actor.role,
            "SECURITY: {}",
            denied
        ),
        Some(TournamentError::Storage(e)) => tracing::error!(
            command = command,
            tournament_id = tournament_id,
            actor_id = actor.id,
            "Tournament command failed in storage: {}",
            e
        ),
        Some(e) => tracing::info!(
            command = command,
            tournament_id = tournament_id,
            actor_id = actor.id,
            "Tournament command rejected: {}",
            e
        ),
    }
}

/// Log pairing duration, warning on slow pairings
pub fn log_pairing(tournament_id: TournamentId, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            tournament_id = tournament_id,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow pairing"
        );
    } else {
        tracing::debug!(
            tournament_id = tournament_id,
            duration_ms = duration_ms,
            "Round paired"
        );
    }
}
