use thiserror::Error;

use super::UserRole;

/// Errors produced while decoding or validating user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("invalid user role: {0}")]
    InvalidRole(i64),
    #[error("role {0} cannot be assigned")]
    UnassignableRole(UserRole),
    #[error("user id cannot be empty")]
    EmptyUserId,
}
