//! Parsing of externally supplied identifiers.
//!
//! Path parameters arrive as strings; the stores key tasks and runs by
//! numeric surrogate keys. Parsing happens before any I/O.

use uuid::Uuid;

use super::TaskError;

/// Parses a task id from its external string form.
pub fn parse_task_id(value: &str) -> Result<u64, TaskError> {
    parse_numeric_id("task", value)
}

/// Parses a task run id from its external string form.
pub fn parse_run_id(value: &str) -> Result<u64, TaskError> {
    parse_numeric_id("task run", value)
}

/// Parses a UUID field, naming the field in the error.
pub fn parse_uuid_field(field: &'static str, value: &str) -> Result<Uuid, TaskError> {
    Uuid::parse_str(value.trim()).map_err(|_| TaskError::InvalidUuid {
        field,
        value: value.to_string(),
    })
}

fn parse_numeric_id(kind: &'static str, value: &str) -> Result<u64, TaskError> {
    value.trim().parse::<u64>().map_err(|_| TaskError::InvalidId {
        kind,
        value: value.to_string(),
    })
}
