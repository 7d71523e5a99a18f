//! Caller identity middleware for the versioned API.
//!
//! Authentication is performed upstream; the authenticating proxy forwards
//! the caller's id and role in request headers. This middleware turns them
//! into an [`Actor`] in the request extensions for downstream handlers.
//!
//! # Extracting the Actor
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use swiss_league::Actor;
//!
//! async fn handler(Extension(actor): Extension<Actor>) -> String {
//!     format!("{} {}", actor.role, actor.id)
//! }
//! # let _ = handler;
//! ```

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use swiss_league::{Actor, PlayerId, Role};

/// Header carrying the caller's player id
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Header carrying the caller's role (`admin`, `judge` or `player`)
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

fn actor_from_headers(headers: &HeaderMap) -> Option<Actor> {
    let id: PlayerId = headers
        .get(ACTOR_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    let role: Role = headers.get(ACTOR_ROLE_HEADER)?.to_str().ok()?.parse().ok()?;
    Some(Actor::new(id, role))
}

/// Inject the calling [`Actor`] into request extensions.
///
/// # Behavior
///
/// - **Both headers valid**: Injects `Actor` → Calls next handler
/// - **Missing or malformed header**: Returns `401 Unauthorized`
pub async fn actor_middleware(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let Some(actor) = actor_from_headers(request.headers()) else {
        tracing::debug!(uri = %request.uri(), "Rejected request without caller identity");
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
