//! In-memory repository implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use taskadmin_core::storage::{
    ArtifactRepository, RepositoryError, Result, TaskRepository, TaskRunRepository,
};
use taskadmin_core::task::{newest_first, NewTask, NewTaskRun, Task, TaskRun, TaskRunArtifact};

/// In-memory storage backend.
///
/// Ids are assigned from per-table sequences starting at 1, like an
/// auto-increment column.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    tasks: Arc<RwLock<BTreeMap<u64, Task>>>,
    runs: Arc<RwLock<BTreeMap<u64, TaskRun>>>,
    artifacts: Arc<RwLock<HashMap<Uuid, Vec<TaskRunArtifact>>>>,
    next_task_id: Arc<AtomicU64>,
    next_run_id: Arc<AtomicU64>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(BTreeMap::new())),
            runs: Arc::new(RwLock::new(BTreeMap::new())),
            artifacts: Arc::new(RwLock::new(HashMap::new())),
            next_task_id: Arc::new(AtomicU64::new(1)),
            next_run_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

fn task_not_found(id: u64) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: "Task",
        id: id.to_string(),
    }
}

#[async_trait]
impl TaskRepository for InMemoryRepository {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.values().filter(|t| !t.is_deleted()).cloned().collect())
    }

    async fn list_tasks_by_owner(&self, owner: &str) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .values()
            .filter(|t| !t.is_deleted() && t.owner == owner)
            .cloned()
            .collect())
    }

    async fn get_task(&self, id: u64) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).filter(|t| !t.is_deleted()).cloned())
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let id = self.next_task_id.fetch_add(1, Ordering::SeqCst);
        let task = task.into_task(id);
        self.tasks.write().await.insert(id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&task.id) {
            Some(existing) if !existing.is_deleted() => {
                *existing = task.clone();
                Ok(())
            }
            _ => Err(task_not_found(task.id)),
        }
    }

    async fn delete_task(&self, id: u64) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&id) {
            Some(existing) if !existing.is_deleted() => {
                existing.deleted_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(task_not_found(id)),
        }
    }
}

#[async_trait]
impl TaskRunRepository for InMemoryRepository {
    async fn list_task_runs(&self, task_id: u64) -> Result<Vec<TaskRun>> {
        let runs = self.runs.read().await;
        Ok(runs
            .values()
            .filter(|r| r.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn get_task_run(&self, id: u64) -> Result<Option<TaskRun>> {
        let runs = self.runs.read().await;
        Ok(runs.get(&id).cloned())
    }

    async fn create_task_run(&self, run: NewTaskRun) -> Result<TaskRun> {
        let id = self.next_run_id.fetch_add(1, Ordering::SeqCst);
        let run = run.into_run(id);
        self.runs.write().await.insert(id, run.clone());
        Ok(run)
    }

    async fn update_task_run(&self, run: &TaskRun) -> Result<()> {
        let mut runs = self.runs.write().await;
        match runs.get_mut(&run.id) {
            Some(existing) => {
                *existing = run.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entity_type: "TaskRun",
                id: run.id.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ArtifactRepository for InMemoryRepository {
    async fn insert_artifact(&self, artifact: &TaskRunArtifact) -> Result<()> {
        let mut artifacts = self.artifacts.write().await;
        let partition = artifacts.entry(artifact.execution_id).or_default();
        if partition
            .iter()
            .any(|a| a.artifact_id == artifact.artifact_id)
        {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "TaskRunArtifact",
                id: artifact.artifact_id.to_string(),
            });
        }
        partition.push(artifact.clone());
        partition.sort_by(newest_first);
        Ok(())
    }

    async fn list_artifacts(
        &self,
        execution_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<TaskRunArtifact>> {
        let artifacts = self.artifacts.read().await;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(artifacts
            .get(&execution_id)
            .map(|partition| {
                partition
                    .iter()
                    .skip(offset)
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
