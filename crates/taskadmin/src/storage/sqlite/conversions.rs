//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use taskadmin_core::storage::RepositoryError;
use taskadmin_core::task::{Task, TaskRun, TaskRunArtifact, TaskStatus};

/// Convert a SQLite row to a Task.
///
/// Expected columns: id, owner, task_name, task_definition, status,
/// created_at, updated_at, deleted_at
pub fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let id: i64 = row.get(0)?;
    let owner: String = row.get(1)?;
    let task_name: String = row.get(2)?;
    let definition: String = row.get(3)?;
    let status: i64 = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    let deleted_at: Option<String> = row.get(7)?;

    Ok(Task {
        id: to_id(0, id)?,
        owner,
        task_name,
        task_definition: parse_json(3, &definition)?,
        status: parse_status(4, status)?,
        created_at: parse_datetime(5, &created_at)?,
        updated_at: parse_datetime(6, &updated_at)?,
        deleted_at: deleted_at
            .map(|s| parse_datetime(7, &s))
            .transpose()?,
    })
}

/// Convert a SQLite row to a TaskRun.
///
/// Expected columns: id, task_id, execution_id, status, start_time, end_time,
/// error_message, created_at, updated_at
pub fn row_to_task_run(row: &Row) -> rusqlite::Result<TaskRun> {
    let id: i64 = row.get(0)?;
    let task_id: i64 = row.get(1)?;
    let execution_id: Option<String> = row.get(2)?;
    let status: i64 = row.get(3)?;
    let start_time: Option<String> = row.get(4)?;
    let end_time: Option<String> = row.get(5)?;
    let error_message: Option<String> = row.get(6)?;
    let created_at: String = row.get(7)?;
    let updated_at: String = row.get(8)?;

    Ok(TaskRun {
        id: to_id(0, id)?,
        task_id: to_id(1, task_id)?,
        execution_id,
        status: parse_status(3, status)?,
        start_time: start_time.map(|s| parse_datetime(4, &s)).transpose()?,
        end_time: end_time.map(|s| parse_datetime(5, &s)).transpose()?,
        error_message,
        created_at: parse_datetime(7, &created_at)?,
        updated_at: parse_datetime(8, &updated_at)?,
    })
}

/// Convert a SQLite row to a TaskRunArtifact.
pub fn row_to_artifact(row: &Row) -> rusqlite::Result<TaskRunArtifact> {
    let execution_id: String = row.get(0)?;
    let execution_task_id: String = row.get(1)?;
    let artifact_id: String = row.get(2)?;
    let created_at: String = row.get(3)?;
    let additional_data: String = row.get(11)?;

    Ok(TaskRunArtifact {
        execution_id: parse_uuid(0, &execution_id)?,
        execution_task_id: parse_uuid(1, &execution_task_id)?,
        artifact_id: parse_uuid(2, &artifact_id)?,
        created_at: parse_datetime(3, &created_at)?,
        artifact_type: row.get(4)?,
        url: row.get(5)?,
        content_type: row.get(6)?,
        content_length: row.get(7)?,
        status_code: row.get(8)?,
        storage_bucket: row.get(9)?,
        storage_key: row.get(10)?,
        additional_data: parse_json::<BTreeMap<String, String>>(11, &additional_data)?,
    })
}

/// Serialize a JSON-compatible value for a TEXT column.
pub fn to_json_text<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Format a DateTime<Utc> for SQLite storage.
///
/// Fixed microsecond precision with a `Z` suffix, so lexical order matches
/// chronological order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Convert a domain id to an INTEGER column value.
pub fn to_sql_id(id: u64) -> Result<i64, RepositoryError> {
    i64::try_from(id).map_err(|_| RepositoryError::InvalidData(format!("id out of range: {id}")))
}

fn conversion_error(
    column: usize,
    ty: Type,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(err))
}

fn to_id(column: usize, value: i64) -> rusqlite::Result<u64> {
    u64::try_from(value).map_err(|e| conversion_error(column, Type::Integer, e))
}

fn parse_status(column: usize, code: i64) -> rusqlite::Result<TaskStatus> {
    TaskStatus::from_code(code).map_err(|e| conversion_error(column, Type::Integer, e))
}

fn parse_uuid(column: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| conversion_error(column, Type::Text, e))
}

fn parse_datetime(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, Type::Text, e))
}

fn parse_json<T: serde::de::DeserializeOwned>(column: usize, s: &str) -> rusqlite::Result<T> {
    serde_json::from_str(s).map_err(|e| conversion_error(column, Type::Text, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let fractional = whole + chrono::Duration::microseconds(1500);

        assert_eq!(format_datetime(&whole), "2024-05-01T12:00:00.000000Z");
        assert_eq!(format_datetime(&fractional), "2024-05-01T12:00:00.001500Z");
        assert!(format_datetime(&whole) < format_datetime(&fractional));
    }

    #[test]
    fn test_parse_datetime_roundtrips_formatted_value() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap();
        assert_eq!(parse_datetime(0, &format_datetime(&dt)).unwrap(), dt);
    }

    #[test]
    fn test_parse_status_rejects_unknown_code() {
        assert!(parse_status(4, 42).is_err());
        assert_eq!(parse_status(4, 2).unwrap(), TaskStatus::Running);
    }

    #[test]
    fn test_to_sql_id_rejects_overflow() {
        assert_eq!(to_sql_id(7).unwrap(), 7);
        assert!(matches!(
            to_sql_id(u64::MAX),
            Err(RepositoryError::InvalidData(_))
        ));
    }

    #[test]
    fn test_to_json_text_for_additional_data() {
        let mut data = BTreeMap::new();
        data.insert("depth".to_string(), "2".to_string());
        assert_eq!(to_json_text(&data).unwrap(), r#"{"depth":"2"}"#);
    }
}
