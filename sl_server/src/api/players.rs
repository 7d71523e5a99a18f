//! Player profile lookup.

use axum::{
    Json,
    extract::{Extension, Path, State},
};
use swiss_league::{Actor, Player, PlayerId};

use super::AppState;
use super::error::ApiError;

/// Player profile with rating and cumulative record.
///
/// # Response
///
/// ```json
/// {"id": 3, "name": "Ada", "city": "Riga", "rating": 1214, "tournaments": 1, "wins": 2, "losses": 1, "draws": 0}
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown player
pub async fn get_player(
    State(state): State<AppState>,
    Extension(_actor): Extension<Actor>,
    Path(id): Path<PlayerId>,
) -> Result<Json<Player>, ApiError> {
    Ok(Json(state.service.get_player(id).await?))
}
