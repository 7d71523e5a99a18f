//! Mapping of engine errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use swiss_league::TournamentError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error class
    pub kind: &'static str,
}

/// Handler error wrapping a [`TournamentError`]
#[derive(Debug)]
pub struct ApiError(pub TournamentError);

impl ApiError {
    /// Status code and error class for the wrapped error
    ///
    /// - Pairing failures and invalid transitions: `409 Conflict`
    /// - Permission failures: `403 Forbidden`
    /// - Unknown entities: `404 Not Found`
    /// - Malformed input: `422 Unprocessable Entity`
    /// - Storage failures: `500 Internal Server Error`
    pub fn status(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            TournamentError::Pairing(_) => (StatusCode::CONFLICT, "pairing"),
            TournamentError::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, "invalid_transition")
            }
            TournamentError::PermissionDenied(_) => (StatusCode::FORBIDDEN, "permission_denied"),
            TournamentError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            TournamentError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
            TournamentError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
        }
    }
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status();
        let body = ErrorResponse {
            error: self.0.client_message(),
            kind,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swiss_league::{
        NotFoundError, PairingError, PermissionDenied, Role, StoreError, ValidationError,
    };

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(TournamentError, StatusCode)> = vec![
            (
                PairingError::BracketTooSmall { available: 1 }.into(),
                StatusCode::CONFLICT,
            ),
            (
                PermissionDenied {
                    actor_id: 1,
                    role: Role::Player,
                    action: "start tournament".to_string(),
                    tournament_id: Some(1),
                }
                .into(),
                StatusCode::FORBIDDEN,
            ),
            (NotFoundError::Tournament(9).into(), StatusCode::NOT_FOUND),
            (
                ValidationError::AlreadyRegistered(3).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                StoreError::Unavailable("down".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status().0, expected);
        }
    }

    #[test]
    fn test_storage_details_hidden() {
        let response =
            ApiError(StoreError::Unavailable("10.0.0.3 refused".to_string()).into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
