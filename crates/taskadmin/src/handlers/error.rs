use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use taskadmin_core::cache::CacheError;
use taskadmin_core::identity::{identity_error_to_status_code, IdentityError};
use taskadmin_core::storage::{repository_error_to_status_code, RepositoryError};

use crate::services::ServiceError;

/// Handler error. The status code is picked by downcasting the wrapped error.
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        let code = if let Some(err) = self.0.downcast_ref::<ServiceError>() {
            service_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            repository_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<IdentityError>() {
            identity_error_to_status_code(err)
        } else if let Some(err) = self.0.downcast_ref::<CacheError>() {
            cache_error_to_status_code(err)
        } else if self.0.is::<JsonRejection>() {
            400
        } else {
            500
        };

        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn service_error_to_status_code(error: &ServiceError) -> u16 {
    match error {
        ServiceError::Validation(_) => 400,
        ServiceError::TaskNotFound | ServiceError::TaskRunNotFound => 404,
        ServiceError::MissingUserId => 502,
        ServiceError::Repository(err) => repository_error_to_status_code(err),
        ServiceError::Cache(err) => cache_error_to_status_code(err),
        ServiceError::Identity(err) => identity_error_to_status_code(err),
        ServiceError::FanOut(_) => 500,
    }
}

fn cache_error_to_status_code(error: &CacheError) -> u16 {
    match error {
        CacheError::ConnectionFailed(_) => 503,
        CacheError::OperationFailed(_) | CacheError::Serialization(_) => 500,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.0.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %message, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %message, "Request rejected");
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
