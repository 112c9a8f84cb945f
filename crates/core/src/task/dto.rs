//! Externally visible shapes of tasks and task runs.
//!
//! `TaskDto` is also the one representation stored in the cache under
//! `task:<id>`. The storage record is never cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Task, TaskRun, TaskStatus};

/// A task as returned to callers and held in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: String,
    pub task_name: String,
    pub task_definition: String,
    pub status: TaskStatus,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Task> for TaskDto {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            task_name: task.task_name.clone(),
            task_definition: task.task_definition.to_string(),
            status: task.status,
            owner: task.owner.clone(),
            created_at: task.created_at,
            updated_at: task.updated_at,
            deleted_at: task.deleted_at,
        }
    }
}

impl From<Task> for TaskDto {
    fn from(task: Task) -> Self {
        Self::from(&task)
    }
}

/// A task run as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRunDto {
    pub id: u64,
    pub task_id: u64,
    pub execution_id: Option<String>,
    pub status: TaskStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl From<TaskRun> for TaskRunDto {
    fn from(run: TaskRun) -> Self {
        Self {
            id: run.id,
            task_id: run.task_id,
            execution_id: run.execution_id,
            status: run.status,
            start_time: run.start_time,
            end_time: run.end_time,
            error_message: run.error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        let now = Utc::now();
        Task {
            id: 42,
            owner: "u1".to_string(),
            task_name: "crawl".to_string(),
            task_definition: serde_json::json!({"depth": 2}),
            status: TaskStatus::Created,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_task_dto_stringifies_id_and_definition() {
        let dto = TaskDto::from(&sample_task());
        assert_eq!(dto.id, "42");
        assert_eq!(dto.task_definition, r#"{"depth":2}"#);
        assert_eq!(dto.owner, "u1");
    }

    #[test]
    fn test_task_dto_wire_shape() {
        let value = serde_json::to_value(TaskDto::from(sample_task())).unwrap();
        assert_eq!(value["id"], "42");
        assert_eq!(value["status"], 1);
        assert!(value["deleted_at"].is_null());
    }

    #[test]
    fn test_task_run_dto_from_run() {
        let now = Utc::now();
        let run = TaskRun {
            id: 3,
            task_id: 42,
            execution_id: Some("exec".to_string()),
            status: TaskStatus::Failed,
            start_time: Some(now),
            end_time: Some(now),
            error_message: Some("boom".to_string()),
            created_at: now,
            updated_at: now,
        };
        let dto = TaskRunDto::from(run);
        assert_eq!(dto.task_id, 42);
        assert_eq!(dto.status, TaskStatus::Failed);
        assert_eq!(dto.error_message.as_deref(), Some("boom"));
    }
}
