//! Task, task run and artifact operations.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};

use taskadmin_core::cache::{Cache, TaskCache};
use taskadmin_core::storage::{
    ArtifactRepository, Pagination, RepositoryError, TaskRepository, TaskRunRepository,
};
use taskadmin_core::task::{
    parse_run_id, parse_task_id, parse_uuid_field, CreateArtifactRequest, CreateTaskRequest,
    CreateTaskRunRequest, Task, TaskDto, TaskRun, TaskRunArtifact, TaskRunDto, UpdateTaskRequest,
    UpdateTaskRunRequest,
};

use super::error::{Result, ServiceError};

/// Owns the task cache policy. Runs and artifacts are never cached.
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    runs: Arc<dyn TaskRunRepository>,
    artifacts: Arc<dyn ArtifactRepository>,
    cache: TaskCache,
}

/// Maps a store-level `NotFound` to the given domain error.
fn not_found_as(err: RepositoryError, domain: ServiceError) -> ServiceError {
    if err.is_not_found() {
        domain
    } else {
        ServiceError::Repository(err)
    }
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        runs: Arc<dyn TaskRunRepository>,
        artifacts: Arc<dyn ArtifactRepository>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            tasks,
            runs,
            artifacts,
            cache: TaskCache::new(cache),
        }
    }

    pub async fn list_tasks(&self) -> Result<Vec<TaskDto>> {
        let tasks = self.tasks.list_tasks().await?;
        Ok(tasks.into_iter().map(TaskDto::from).collect())
    }

    pub async fn list_user_tasks(&self, owner: &str) -> Result<Vec<TaskDto>> {
        let tasks = self.tasks.list_tasks_by_owner(owner).await?;
        Ok(tasks.into_iter().map(TaskDto::from).collect())
    }

    /// Gets a task through `task:<id>`.
    ///
    /// A malformed id fails before the cache or the store is touched.
    pub async fn get_task(&self, task_id: &str) -> Result<TaskDto> {
        let id = parse_task_id(task_id)?;
        if let Some(task) = self.cache.get(&id).await? {
            return Ok(task);
        }

        let task = self.load_task(id).await?;
        let dto = TaskDto::from(task);
        self.cache.set(&dto).await?;
        Ok(dto)
    }

    /// Creates a task owned by `owner`. The cache is not populated.
    pub async fn create_task(&self, owner: &str, request: CreateTaskRequest) -> Result<TaskDto> {
        let new_task = request.into_new_task(owner, Utc::now())?;
        let task = self.tasks.create_task(new_task).await?;
        debug!(task_id = task.id, owner, "Created task");
        Ok(TaskDto::from(task))
    }

    /// Applies the supplied fields to a stored task, then invalidates `task:<id>`.
    pub async fn update_task(&self, task_id: &str, request: UpdateTaskRequest) -> Result<TaskDto> {
        let id = parse_task_id(task_id)?;
        request.validate()?;

        let mut task = self.load_task(id).await?;
        request.apply_to(&mut task, Utc::now());
        self.tasks
            .update_task(&task)
            .await
            .map_err(|e| not_found_as(e, ServiceError::TaskNotFound))?;
        self.cache.invalidate(&id).await?;
        Ok(TaskDto::from(task))
    }

    /// Soft-deletes a task, then invalidates `task:<id>`.
    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        let id = parse_task_id(task_id)?;
        self.tasks
            .delete_task(id)
            .await
            .map_err(|e| not_found_as(e, ServiceError::TaskNotFound))?;
        self.cache.invalidate(&id).await?;
        debug!(task_id = id, "Deleted task");
        Ok(())
    }

    pub async fn list_task_runs(&self, task_id: &str) -> Result<Vec<TaskRunDto>> {
        let id = parse_task_id(task_id)?;
        let runs = self.runs.list_task_runs(id).await?;
        Ok(runs.into_iter().map(TaskRunDto::from).collect())
    }

    /// Creates a run for an existing task.
    ///
    /// A malformed execution id fails before the store is touched.
    pub async fn create_task_run(
        &self,
        task_id: &str,
        request: CreateTaskRunRequest,
    ) -> Result<TaskRunDto> {
        let id = parse_task_id(task_id)?;
        let new_run = request.into_new_run(id, Utc::now())?;
        self.load_task(id).await?;
        let run = self.runs.create_task_run(new_run).await?;
        Ok(TaskRunDto::from(run))
    }

    pub async fn get_task_run(&self, run_id: &str) -> Result<TaskRunDto> {
        let id = parse_run_id(run_id)?;
        Ok(TaskRunDto::from(self.load_run(id).await?))
    }

    /// Applies the supplied fields to a stored run and returns the result.
    pub async fn update_task_run(
        &self,
        run_id: &str,
        request: UpdateTaskRunRequest,
    ) -> Result<TaskRunDto> {
        let id = parse_run_id(run_id)?;
        request.validate()?;

        let mut run = self.load_run(id).await?;
        request.apply_to(&mut run, Utc::now());
        self.runs
            .update_task_run(&run)
            .await
            .map_err(|e| not_found_as(e, ServiceError::TaskRunNotFound))?;
        Ok(TaskRunDto::from(run))
    }

    /// Lists one page of a run's artifacts, newest first.
    ///
    /// A run that has no execution id yet has no artifacts.
    pub async fn list_artifacts(
        &self,
        run_id: &str,
        pagination: Pagination,
    ) -> Result<Vec<TaskRunArtifact>> {
        let id = parse_run_id(run_id)?;
        let run = self.load_run(id).await?;
        let Some(execution_id) = run.execution_id.as_deref() else {
            return Ok(Vec::new());
        };
        let execution_id = parse_uuid_field("execution_id", execution_id)?;

        self.artifacts
            .list_artifacts(execution_id, pagination.limit(), pagination.offset())
            .await
            .inspect_err(|err| error!(run_id = id, error = %err, "Failed to list artifacts"))
            .map_err(ServiceError::from)
    }

    pub async fn create_artifact(&self, request: CreateArtifactRequest) -> Result<TaskRunArtifact> {
        let artifact = request.into_artifact(Utc::now())?;
        self.artifacts.insert_artifact(&artifact).await?;
        Ok(artifact)
    }

    async fn load_task(&self, id: u64) -> Result<Task> {
        self.tasks
            .get_task(id)
            .await?
            .ok_or(ServiceError::TaskNotFound)
    }

    async fn load_run(&self, id: u64) -> Result<TaskRun> {
        self.runs
            .get_task_run(id)
            .await?
            .ok_or(ServiceError::TaskRunNotFound)
    }
}
