use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::TaskError;

/// Lifecycle status shared by tasks and task runs.
///
/// Encoded as an integer on the wire and in the cache. `Unknown` is the zero
/// value and is never written to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    Unknown = 0,
    Created = 1,
    Running = 2,
    Complete = 3,
    Failed = 4,
    Cancelled = 5,
    Pending = 6,
}

impl TaskStatus {
    /// Every status, in encoding order.
    pub const ALL: [TaskStatus; 7] = [
        TaskStatus::Unknown,
        TaskStatus::Created,
        TaskStatus::Running,
        TaskStatus::Complete,
        TaskStatus::Failed,
        TaskStatus::Cancelled,
        TaskStatus::Pending,
    ];

    /// Returns the integer encoding of this status.
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Decodes a status from its integer encoding.
    ///
    /// Values outside the enum are rejected rather than mapped to `Unknown`.
    pub fn from_code(code: i64) -> Result<Self, TaskError> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(TaskError::InvalidStatus(code))
    }

    /// Returns the lowercase name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Unknown => "unknown",
            TaskStatus::Created => "created",
            TaskStatus::Running => "running",
            TaskStatus::Complete => "complete",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Pending => "pending",
        }
    }

    /// Returns false for the `Unknown` sentinel.
    pub fn is_known(self) -> bool {
        self != TaskStatus::Unknown
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i64> for TaskStatus {
    type Error = TaskError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        Self::from_code(code).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(TaskStatus::Unknown.code(), 0);
        assert_eq!(TaskStatus::Created.code(), 1);
        assert_eq!(TaskStatus::Running.code(), 2);
        assert_eq!(TaskStatus::Complete.code(), 3);
        assert_eq!(TaskStatus::Failed.code(), 4);
        assert_eq!(TaskStatus::Cancelled.code(), 5);
        assert_eq!(TaskStatus::Pending.code(), 6);
    }

    #[test]
    fn test_from_code_accepts_every_variant() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_code(status.code()), Ok(status));
        }
    }

    #[test]
    fn test_from_code_rejects_out_of_range() {
        assert_eq!(TaskStatus::from_code(7), Err(TaskError::InvalidStatus(7)));
        assert_eq!(TaskStatus::from_code(-1), Err(TaskError::InvalidStatus(-1)));
    }

    #[test]
    fn test_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&TaskStatus::Running).unwrap(), "2");
    }

    #[test]
    fn test_deserialize_unknown_integer_fails() {
        let result: Result<TaskStatus, _> = serde_json::from_str("42");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_string_names() {
        let result: Result<TaskStatus, _> = serde_json::from_str("\"running\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_display_uses_lowercase_name() {
        assert_eq!(TaskStatus::Cancelled.to_string(), "cancelled");
        assert!(!TaskStatus::Unknown.is_known());
        assert!(TaskStatus::Pending.is_known());
    }
}
