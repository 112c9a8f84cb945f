use thiserror::Error;

use taskadmin_core::cache::CacheError;
use taskadmin_core::identity::IdentityError;
use taskadmin_core::storage::{PaginationError, RepositoryError};
use taskadmin_core::task::TaskError;
use taskadmin_core::user::UserError;

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input, rejected before any I/O.
    #[error("{0}")]
    Validation(String),
    #[error("task not found")]
    TaskNotFound,
    #[error("no task run found with the given ID")]
    TaskRunNotFound,
    #[error("identity service returned a user without an id")]
    MissingUserId,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// A fan-out unit panicked or was cancelled.
    #[error("concurrent lookup failed: {0}")]
    FanOut(String),
}

impl From<TaskError> for ServiceError {
    fn from(err: TaskError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<UserError> for ServiceError {
    fn from(err: UserError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<PaginationError> for ServiceError {
    fn from(err: PaginationError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
