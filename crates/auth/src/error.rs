//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Authentication error
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingAuthorization,
    InvalidAuthorizationFormat,
    InvalidToken,
    InvalidUserId,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AuthError::MissingAuthorization => {
                ("MISSING_AUTHORIZATION", "Authorization header required")
            }
            AuthError::InvalidAuthorizationFormat => (
                "INVALID_AUTHORIZATION",
                "Invalid authorization header format",
            ),
            AuthError::InvalidToken => ("INVALID_TOKEN", "Invalid or expired token"),
            AuthError::InvalidUserId => ("INVALID_TOKEN", "Invalid user ID in token"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
