//! DynamoDB key generation functions.
//!
//! Artifacts of one execution share a partition. The sort key starts with a
//! fixed-width timestamp so a reverse range query yields newest first.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

pub const RUN_PREFIX: &str = "RUN#";
pub const ARTIFACT_PREFIX: &str = "ARTIFACT#";

/// Generate the partition key for an execution's artifacts.
///
/// Pattern: `RUN#<execution_id>`
pub fn artifact_pk(execution_id: Uuid) -> String {
    format!("{RUN_PREFIX}{execution_id}")
}

/// Generate the sort key for an artifact.
///
/// Pattern: `ARTIFACT#<created_at>#<artifact_id>`, with `created_at` in
/// RFC 3339 at microsecond precision.
pub fn artifact_sk(created_at: &DateTime<Utc>, artifact_id: Uuid) -> String {
    format!(
        "{ARTIFACT_PREFIX}{}#{artifact_id}",
        created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    )
}
