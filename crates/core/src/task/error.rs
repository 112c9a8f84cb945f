use thiserror::Error;

/// Errors produced while decoding or validating task input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("invalid {kind} id: {value}")]
    InvalidId { kind: &'static str, value: String },
    #[error("invalid task status: {0}")]
    InvalidStatus(i64),
    #[error("task status cannot be unknown")]
    UnknownStatus,
    #[error("invalid {field}: {value}")]
    InvalidUuid { field: &'static str, value: String },
    #[error("task name cannot be empty")]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_display() {
        let error = TaskError::InvalidId {
            kind: "task",
            value: "abc".to_string(),
        };
        assert_eq!(error.to_string(), "invalid task id: abc");
    }

    #[test]
    fn test_invalid_status_display() {
        assert_eq!(
            TaskError::InvalidStatus(9).to_string(),
            "invalid task status: 9"
        );
    }

    #[test]
    fn test_invalid_uuid_display() {
        let error = TaskError::InvalidUuid {
            field: "execution_id",
            value: "nope".to_string(),
        };
        assert_eq!(error.to_string(), "invalid execution_id: nope");
    }
}
