use async_trait::async_trait;
use uuid::Uuid;

use crate::task::{NewTask, NewTaskRun, Task, TaskRun, TaskRunArtifact};

use super::Result;

/// Repository for task operations.
///
/// Soft-deleted tasks are invisible to every read and to `update_task`.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Lists every live task ordered by id.
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Lists the live tasks owned by a user ordered by id.
    async fn list_tasks_by_owner(&self, owner: &str) -> Result<Vec<Task>>;

    /// Gets a task by its ID.
    async fn get_task(&self, id: u64) -> Result<Option<Task>>;

    /// Persists a new task and returns it with its assigned ID.
    async fn create_task(&self, task: NewTask) -> Result<Task>;

    /// Replaces an existing task. Fails with `NotFound` if it does not exist.
    async fn update_task(&self, task: &Task) -> Result<()>;

    /// Soft-deletes a task. Fails with `NotFound` if it does not exist.
    async fn delete_task(&self, id: u64) -> Result<()>;
}

/// Repository for task run operations.
#[async_trait]
pub trait TaskRunRepository: Send + Sync {
    /// Lists the runs of a task ordered by id.
    async fn list_task_runs(&self, task_id: u64) -> Result<Vec<TaskRun>>;

    /// Gets a run by its ID.
    async fn get_task_run(&self, id: u64) -> Result<Option<TaskRun>>;

    /// Persists a new run and returns it with its assigned ID.
    async fn create_task_run(&self, run: NewTaskRun) -> Result<TaskRun>;

    /// Replaces an existing run. Fails with `NotFound` if it does not exist.
    async fn update_task_run(&self, run: &TaskRun) -> Result<()>;
}

/// Repository for task run artifacts, partitioned by execution id.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Inserts an artifact row.
    async fn insert_artifact(&self, artifact: &TaskRunArtifact) -> Result<()>;

    /// Lists one page of an execution's artifacts, newest first with the
    /// artifact id as tie-break.
    async fn list_artifacts(
        &self,
        execution_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<TaskRunArtifact>>;
}
