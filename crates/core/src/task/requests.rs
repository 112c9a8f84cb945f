//! Request payloads for task, task run and artifact operations.
//!
//! Pure data plus the transforms that turn a payload into a record. No I/O.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::parse_uuid_field;
use super::{NewTask, NewTaskRun, Task, TaskError, TaskRun, TaskRunArtifact, TaskStatus};

/// Request payload for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub task_name: String,
    #[serde(default)]
    pub task_definition: serde_json::Value,
}

impl CreateTaskRequest {
    /// Builds the record to persist. New tasks always start as `Created`.
    pub fn into_new_task(self, owner: &str, now: DateTime<Utc>) -> Result<NewTask, TaskError> {
        if self.task_name.trim().is_empty() {
            return Err(TaskError::EmptyName);
        }
        Ok(NewTask {
            owner: owner.to_string(),
            task_name: self.task_name,
            task_definition: self.task_definition,
            status: TaskStatus::Created,
            created_at: now,
        })
    }
}

/// Request payload for updating a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_definition: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl UpdateTaskRequest {
    /// Rejects values that may not be persisted.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.task_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(TaskError::EmptyName);
        }
        if self.status == Some(TaskStatus::Unknown) {
            return Err(TaskError::UnknownStatus);
        }
        Ok(())
    }

    /// Applies the supplied fields onto a loaded task.
    ///
    /// Owner, id and creation time are never touched.
    pub fn apply_to(self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(name) = self.task_name {
            task.task_name = name;
        }
        if let Some(definition) = self.task_definition {
            task.task_definition = definition;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        task.updated_at = now;
    }
}

/// Request payload for starting a task run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskRunRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

impl CreateTaskRunRequest {
    /// Builds the run to persist. New runs always start as `Created`.
    ///
    /// The execution id must be a UUID; it is stored in canonical form.
    pub fn into_new_run(
        self,
        task_id: u64,
        now: DateTime<Utc>,
    ) -> Result<NewTaskRun, TaskError> {
        let execution_id = self
            .execution_id
            .map(|value| parse_uuid_field("execution_id", &value).map(|id| id.to_string()))
            .transpose()?;

        Ok(NewTaskRun {
            task_id,
            execution_id,
            status: TaskStatus::Created,
            start_time: self.start_time,
            created_at: now,
        })
    }
}

/// Request payload for updating a task run. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRunRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl UpdateTaskRunRequest {
    /// Rejects values that may not be persisted.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.status == Some(TaskStatus::Unknown) {
            return Err(TaskError::UnknownStatus);
        }
        if let Some(execution_id) = &self.execution_id {
            parse_uuid_field("execution_id", execution_id)?;
        }
        Ok(())
    }

    /// Applies the supplied fields onto a loaded run.
    pub fn apply_to(self, run: &mut TaskRun, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            run.status = status;
        }
        if let Some(execution_id) = self.execution_id {
            let canonical = parse_uuid_field("execution_id", &execution_id)
                .map(|id| id.to_string())
                .unwrap_or(execution_id);
            run.execution_id = Some(canonical);
        }
        if let Some(start_time) = self.start_time {
            run.start_time = Some(start_time);
        }
        if let Some(end_time) = self.end_time {
            run.end_time = Some(end_time);
        }
        if let Some(error_message) = self.error_message {
            run.error_message = Some(error_message);
        }
        run.updated_at = now;
    }
}

/// Request payload for recording an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArtifactRequest {
    pub execution_id: String,
    pub execution_task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub artifact_type: String,
    pub url: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub content_length: i64,
    #[serde(default)]
    pub status_code: i32,
    #[serde(default)]
    pub storage_bucket: String,
    #[serde(default)]
    pub storage_key: String,
    #[serde(default)]
    pub additional_data: BTreeMap<String, String>,
}

impl CreateArtifactRequest {
    /// Parses the identifiers and builds the artifact row.
    ///
    /// A missing artifact id is generated as a time-ordered UUID.
    pub fn into_artifact(self, now: DateTime<Utc>) -> Result<TaskRunArtifact, TaskError> {
        let execution_id = parse_uuid_field("execution_id", &self.execution_id)?;
        let execution_task_id = parse_uuid_field("execution_task_id", &self.execution_task_id)?;
        let artifact_id = match self.artifact_id.as_deref() {
            Some(raw) => parse_uuid_field("artifact_id", raw)?,
            None => Uuid::now_v7(),
        };

        Ok(TaskRunArtifact {
            execution_id,
            execution_task_id,
            artifact_id,
            created_at: self.created_at.unwrap_or(now),
            artifact_type: self.artifact_type,
            url: self.url,
            content_type: self.content_type,
            content_length: self.content_length,
            status_code: self.status_code,
            storage_bucket: self.storage_bucket,
            storage_key: self.storage_key,
            additional_data: self.additional_data,
        })
    }
}
