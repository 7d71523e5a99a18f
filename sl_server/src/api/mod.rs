//! HTTP API for the tournament server.
//!
//! Exposes the tournament command surface as JSON endpoints. The server owns
//! the single source of truth (an in-memory store); every mutating request
//! goes through [`TournamentService`], which serializes writers per
//! tournament and saves only fully applied transitions.
//!
//! # Modules
//!
//! - [`tournaments`]: Tournament lifecycle, rounds, results and standings
//! - [`players`]: Player profile lookup
//! - [`middleware`]: Caller identity extraction
//! - [`request_id`]: Request correlation
//! - [`error`]: Error to status code mapping
//!
//! # Identity
//!
//! Authentication happens upstream. The authenticating proxy forwards the
//! caller as `x-actor-id` and `x-actor-role` headers; requests under
//! `/api/v1` without them are rejected with `401 Unauthorized`.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use sl_server::api::{create_router, AppState};
//! use std::sync::Arc;
//! use swiss_league::{InMemoryTournamentStore, ScoringPolicy, TournamentService};
//! use swiss_league::registry::InMemoryPlayerDirectory;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let service = TournamentService::new(
//!     Arc::new(InMemoryTournamentStore::new()),
//!     Arc::new(InMemoryPlayerDirectory::new([])),
//! );
//! let state = AppState::new(service, ScoringPolicy::default());
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod middleware;
pub mod players;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use swiss_league::{ScoringPolicy, TournamentService};
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TournamentService>,
    /// Scoring for tournaments created without an explicit policy
    pub default_scoring: Arc<ScoringPolicy>,
}

impl AppState {
    pub fn new(service: TournamentService, default_scoring: ScoringPolicy) -> Self {
        Self {
            service: Arc::new(service),
            default_scoring: Arc::new(default_scoring),
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET  /health                                                   - Health check (public)
/// POST /api/v1/tournaments                                       - Create tournament
/// GET  /api/v1/tournaments                                       - List tournaments
/// GET  /api/v1/tournaments/{id}                                  - Get tournament
/// POST /api/v1/tournaments/{id}/participants                     - Register participant
/// POST /api/v1/tournaments/{id}/participants/{player_id}/drop    - Drop participant
/// POST /api/v1/tournaments/{id}/start                            - Start tournament
/// POST /api/v1/tournaments/{id}/rounds/advance                   - Pair next round
/// POST /api/v1/tournaments/{id}/rounds/rollback                  - Delete last round
/// POST /api/v1/tournaments/{id}/rounds/{round}/matches/{match_id}/result
///                                                                - Record result
/// GET  /api/v1/tournaments/{id}/standings                        - Standings
/// POST /api/v1/tournaments/{id}/complete                         - Complete
/// POST /api/v1/tournaments/{id}/confirm                          - Confirm
/// GET  /api/v1/players/{id}                                      - Player profile
/// ```
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Versioned routes; all require caller identity
fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/tournaments",
            post(tournaments::create_tournament).get(tournaments::list_tournaments),
        )
        .route("/tournaments/{id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{id}/participants",
            post(tournaments::register_participant),
        )
        .route(
            "/tournaments/{id}/participants/{player_id}/drop",
            post(tournaments::drop_participant),
        )
        .route("/tournaments/{id}/start", post(tournaments::start_tournament))
        .route(
            "/tournaments/{id}/rounds/advance",
            post(tournaments::advance_round),
        )
        .route(
            "/tournaments/{id}/rounds/rollback",
            post(tournaments::rollback_round),
        )
        .route(
            "/tournaments/{id}/rounds/{round}/matches/{match_id}/result",
            post(tournaments::record_result),
        )
        .route(
            "/tournaments/{id}/standings",
            get(tournaments::get_standings),
        )
        .route(
            "/tournaments/{id}/complete",
            post(tournaments::complete_tournament),
        )
        .route(
            "/tournaments/{id}/confirm",
            post(tournaments::confirm_tournament),
        )
        .route("/players/{id}", get(players::get_player))
        .layer(axum::middleware::from_fn(middleware::actor_middleware))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` while the store answers, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"0.1.0","tournaments":2,"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let tournaments = state.service.list_tournaments().await;
    let healthy = tournaments.is_ok();

    if let Ok(list) = &tournaments {
        crate::metrics::tournaments_stored(list.len());
    }

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "tournaments": tournaments.map(|l| l.len()).ok(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
