//! Pure functions for serializing/deserializing cached values to/from bytes.
//!
//! Values are stored as JSON so entries can be inspected with any Redis client.

use thiserror::Error;

use crate::task::TaskDto;
use crate::user::{User, UserRole};

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes a task to JSON bytes.
pub fn serialize_task(task: &TaskDto) -> Result<Vec<u8>> {
    serde_json::to_vec(task).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a task.
pub fn deserialize_task(bytes: &[u8]) -> Result<TaskDto> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes a user to JSON bytes.
pub fn serialize_user(user: &User) -> Result<Vec<u8>> {
    serde_json::to_vec(user).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a user.
pub fn deserialize_user(bytes: &[u8]) -> Result<User> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes a role list to JSON bytes (an array of role codes).
pub fn serialize_user_roles(roles: &[UserRole]) -> Result<Vec<u8>> {
    serde_json::to_vec(roles).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a role list.
pub fn deserialize_user_roles(bytes: &[u8]) -> Result<Vec<UserRole>> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use chrono::Utc;

    fn sample_task() -> TaskDto {
        let now = Utc::now();
        TaskDto {
            id: "42".to_string(),
            task_name: "crawl".to_string(),
            task_definition: r#"{"depth":1}"#.to_string(),
            status: TaskStatus::Created,
            owner: "u1".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_task_round_trip() {
        let task = sample_task();
        let bytes = serialize_task(&task).unwrap();
        assert_eq!(deserialize_task(&bytes).unwrap(), task);
    }

    #[test]
    fn test_user_round_trip_keeps_roles() {
        let user = User::with_id("u1")
            .with_email("u1@example.com")
            .with_roles(vec![UserRole::Member]);
        let bytes = serialize_user(&user).unwrap();
        assert_eq!(deserialize_user(&bytes).unwrap(), user);
    }

    #[test]
    fn test_user_roles_are_an_integer_array() {
        let bytes = serialize_user_roles(&[UserRole::User, UserRole::Admin]).unwrap();
        assert_eq!(bytes, b"[1,3]");
    }

    #[test]
    fn test_deserialize_task_malformed() {
        let result = deserialize_task(b"not json");
        assert!(matches!(
            result,
            Err(SerializationError::DeserializeFailed(_))
        ));
    }

    #[test]
    fn test_deserialize_task_with_unknown_status_fails() {
        let mut value = serde_json::to_value(sample_task()).unwrap();
        value["status"] = serde_json::json!(17);
        let bytes = serde_json::to_vec(&value).unwrap();
        assert!(deserialize_task(&bytes).is_err());
    }

    #[test]
    fn test_deserialize_user_roles_rejects_unknown_code() {
        assert!(deserialize_user_roles(b"[1,9]").is_err());
    }
}
