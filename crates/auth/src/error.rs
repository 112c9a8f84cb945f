use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors produced while authenticating a request.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("signing key not found: {0}")]
    UnknownKey(String),
    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),
    #[error("token was rejected by claim")]
    Rejected,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::KeyFetch(_) => tracing::error!("Auth error: {}", self),
            _ => tracing::debug!("Rejected request: {}", self),
        }

        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "JWT is invalid." })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_is_unauthorized() {
        let errors = [
            AuthError::MissingToken,
            AuthError::InvalidToken("bad signature".to_string()),
            AuthError::UnknownKey("kid-1".to_string()),
            AuthError::KeyFetch("timeout".to_string()),
            AuthError::Rejected,
        ];
        for error in errors {
            assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(AuthError::MissingToken.to_string(), "missing bearer token");
        assert_eq!(
            AuthError::UnknownKey("abc".to_string()).to_string(),
            "signing key not found: abc"
        );
    }
}
