//! Tournament API handlers.
//!
//! Each handler forwards one command to the [`TournamentService`] with the
//! caller's [`Actor`], then records metrics and an audit log entry. All
//! endpoints require the actor headers; reads are open to every role, writes
//! follow the permission rules of the engine.
//!
//! # Examples
//!
//! Create a tournament:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments \
//!   -H "x-actor-id: 1" -H "x-actor-role: judge" \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Friday Swiss", "format": {"swiss_rounds": 4, "top_rounds": 2, "rated": true}}'
//! ```
//!
//! Record a result with its game score:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments/1/rounds/2/matches/3/result \
//!   -H "x-actor-id: 1" -H "x-actor-role: judge" \
//!   -H "Content-Type: application/json" \
//!   -d '{"result": "win1", "games": {"wins1": 2, "wins2": 1, "draws": 0}}'
//! ```
//!
//! [`TournamentService`]: swiss_league::TournamentService

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::time::Instant;
use swiss_league::{
    Actor, PlayerId, ResultReport, Round, ScoringPolicy, Standing, Tournament, TournamentConfig,
    TournamentFormat, TournamentResult,
    round::{MatchId, RoundNumber},
    tournament::{TournamentId, TournamentSummary},
};

use super::AppState;
use super::error::ApiError;
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub format: TournamentFormat,
    #[serde(default)]
    pub judge_id: Option<PlayerId>,
    /// Falls back to the server's default scoring
    #[serde(default)]
    pub scoring: Option<ScoringPolicy>,
}

impl CreateTournamentRequest {
    fn into_config(self, default_scoring: &ScoringPolicy) -> TournamentConfig {
        let mut config = TournamentConfig::new(self.name, self.format)
            .with_scoring(self.scoring.unwrap_or_else(|| default_scoring.clone()));
        config.city = self.city;
        config.description = self.description;
        config.judge_id = self.judge_id;
        config
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterParticipantRequest {
    pub player_id: PlayerId,
}

/// Record metrics and an audit entry for a finished command
fn audit<T>(
    command: &'static str,
    tournament_id: Option<TournamentId>,
    actor: &Actor,
    started: Instant,
    result: TournamentResult<T>,
) -> Result<T, ApiError> {
    metrics::command_duration_ms(command, started.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(value) => {
            metrics::commands_total(command, "ok");
            logging::log_tournament_event(command, tournament_id, actor, None);
            Ok(value)
        }
        Err(err) => {
            logging::log_tournament_event(command, tournament_id, actor, Some(&err));
            let err = ApiError(err);
            metrics::commands_total(command, err.status().1);
            Err(err)
        }
    }
}

/// Pairing time for commands that create a round
fn record_pairing(tournament_id: TournamentId, started: Instant) {
    let elapsed = started.elapsed();
    metrics::pairing_duration_ms(elapsed.as_secs_f64() * 1000.0);
    logging::log_pairing(tournament_id, elapsed.as_millis() as u64);
}

/// Create a draft tournament.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is a player
/// - `422 Unprocessable Entity`: Invalid format or scoring
pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateTournamentRequest>,
) -> Result<(StatusCode, Json<Tournament>), ApiError> {
    let started = Instant::now();
    let config = request.into_config(&state.default_scoring);
    let result = state.service.create_tournament(&actor, config).await;
    let id = result.as_ref().ok().map(|t| t.id);
    let tournament = audit("create_tournament", id, &actor, started, result)?;
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// List tournament summaries.
pub async fn list_tournaments(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
) -> Result<Json<Vec<TournamentSummary>>, ApiError> {
    Ok(Json(state.service.list_tournaments().await?))
}

/// Full tournament snapshot including rounds and participants.
///
/// # Errors
///
/// - `404 Not Found`: Tournament doesn't exist
pub async fn get_tournament(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    Ok(Json(state.service.get_tournament(&actor, id).await?))
}

/// Register a player in a draft tournament.
///
/// # Errors
///
/// - `404 Not Found`: Unknown tournament or player
/// - `409 Conflict`: Tournament already started
/// - `422 Unprocessable Entity`: Player already registered
pub async fn register_participant(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<TournamentId>,
    Json(request): Json<RegisterParticipantRequest>,
) -> Result<Json<Tournament>, ApiError> {
    let started = Instant::now();
    let result = state
        .service
        .register_participant(&actor, id, request.player_id)
        .await;
    audit("register_participant", Some(id), &actor, started, result).map(Json)
}

/// Withdraw a registration or drop an active participant.
pub async fn drop_participant(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((id, player_id)): Path<(TournamentId, PlayerId)>,
) -> Result<Json<Tournament>, ApiError> {
    let started = Instant::now();
    let result = state.service.drop_participant(&actor, id, player_id).await;
    audit("drop_participant", Some(id), &actor, started, result).map(Json)
}

/// Seed participants and pair round 1.
///
/// # Errors
///
/// - `409 Conflict`: Not a draft, or fewer than two participants
pub async fn start_tournament(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    let started = Instant::now();
    let result = state.service.start_tournament(&actor, id).await;
    if result.is_ok() {
        record_pairing(id, started);
    }
    audit("start_tournament", Some(id), &actor, started, result).map(Json)
}

/// Pair the next round once the current one is complete.
///
/// # Response
///
/// Returns `200 OK` with the new round:
/// ```json
/// {
///   "number": 2,
///   "kind": {"type": "swiss"},
///   "matches": [{"id": 1, "player1": 1, "player2": 3, "result": null, "games": null,
///                "points1": 0, "points2": 0, "table_number": 1}],
///   "completed": false
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Current round incomplete, or all rounds created
pub async fn advance_round(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<TournamentId>,
) -> Result<Json<Round>, ApiError> {
    let started = Instant::now();
    let result = state.service.advance_round(&actor, id).await;
    if result.is_ok() {
        record_pairing(id, started);
    }
    audit("advance_round", Some(id), &actor, started, result).map(Json)
}

/// Delete the last round (administrative recovery).
pub async fn rollback_round(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<TournamentId>,
) -> Result<Json<Round>, ApiError> {
    let started = Instant::now();
    let result = state.service.rollback_round(&actor, id).await;
    audit("rollback_round", Some(id), &actor, started, result).map(Json)
}

/// Record or correct a match result.
///
/// # Errors
///
/// - `404 Not Found`: Unknown round or match
/// - `409 Conflict`: Tournament not active
/// - `422 Unprocessable Entity`: Bye match, draw in the top cut, inconsistent
///   game score, or locked elimination round
pub async fn record_result(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((id, round, match_id)): Path<(TournamentId, RoundNumber, MatchId)>,
    Json(report): Json<ResultReport>,
) -> Result<Json<Round>, ApiError> {
    let started = Instant::now();
    let result = state
        .service
        .record_match_result(&actor, id, round, match_id, report)
        .await;
    audit("record_result", Some(id), &actor, started, result).map(Json)
}

/// Current standings, best first.
pub async fn get_standings(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<TournamentId>,
) -> Result<Json<Vec<Standing>>, ApiError> {
    Ok(Json(state.service.get_standings(&actor, id).await?))
}

/// Close the tournament after its final round.
pub async fn complete_tournament(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    let started = Instant::now();
    let result = state.service.complete_tournament(&actor, id).await;
    audit("complete_tournament", Some(id), &actor, started, result).map(Json)
}

/// Confirm a completed tournament and update player records.
///
/// Repeating the call returns the confirmed tournament unchanged.
pub async fn confirm_tournament(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    let started = Instant::now();
    let result = state.service.confirm_tournament(&actor, id).await;
    audit("confirm_tournament", Some(id), &actor, started, result).map(Json)
}
