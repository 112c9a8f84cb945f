use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TaskStatus;

/// A scraping/extraction job definition as held by the relational store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub owner: String,
    pub task_name: String,
    /// Opaque job definition. Never interpreted by this crate.
    pub task_definition: serde_json::Value,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Returns true if the task has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A task that has not been persisted yet. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub owner: String,
    pub task_name: String,
    pub task_definition: serde_json::Value,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Attaches the store-assigned id, producing the persisted record.
    pub fn into_task(self, id: u64) -> Task {
        Task {
            id,
            owner: self.owner,
            task_name: self.task_name,
            task_definition: self.task_definition,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.created_at,
            deleted_at: None,
        }
    }
}

/// One execution of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRun {
    pub id: u64,
    pub task_id: u64,
    /// Correlates the run with its artifacts in the artifact store.
    pub execution_id: Option<String>,
    pub status: TaskStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task run that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTaskRun {
    pub task_id: u64,
    pub execution_id: Option<String>,
    pub status: TaskStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl NewTaskRun {
    /// Attaches the store-assigned id, producing the persisted record.
    pub fn into_run(self, id: u64) -> TaskRun {
        TaskRun {
            id,
            task_id: self.task_id,
            execution_id: self.execution_id,
            status: self.status,
            start_time: self.start_time,
            end_time: None,
            error_message: None,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// An artifact captured during a task run.
///
/// Keyed by (execution id, execution task id, artifact id). All three are
/// time-ordered UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRunArtifact {
    pub execution_id: Uuid,
    pub execution_task_id: Uuid,
    pub artifact_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub artifact_type: String,
    pub url: String,
    pub content_type: String,
    pub content_length: i64,
    pub status_code: i32,
    pub storage_bucket: String,
    pub storage_key: String,
    #[serde(default)]
    pub additional_data: BTreeMap<String, String>,
}

/// Orders artifacts newest first, breaking ties by artifact id descending.
pub fn newest_first(a: &TaskRunArtifact, b: &TaskRunArtifact) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.artifact_id.cmp(&a.artifact_id))
}
