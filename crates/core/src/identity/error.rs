use thiserror::Error;

/// Errors reported by an identity service backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("user not found: {user_id}")]
    NotFound { user_id: String },
    #[error("identity service rejected credentials: {0}")]
    Unauthorized(String),
    #[error("identity service request failed: {0}")]
    RequestFailed(String),
    #[error("unexpected identity service response: {0}")]
    InvalidResponse(String),
    #[error("role is not defined in the identity service: {0}")]
    RoleNotDefined(String),
}

/// Result type for identity service operations.
pub type Result<T> = std::result::Result<T, IdentityError>;

/// Maps an [`IdentityError`] to an HTTP status code.
///
/// Failures of the upstream service surface as 502 (Bad Gateway).
pub fn identity_error_to_status_code(error: &IdentityError) -> u16 {
    match error {
        IdentityError::NotFound { .. } => 404,
        IdentityError::Unauthorized(_) => 502,
        IdentityError::RequestFailed(_) => 502,
        IdentityError::InvalidResponse(_) => 502,
        IdentityError::RoleNotDefined(_) => 500,
    }
}
