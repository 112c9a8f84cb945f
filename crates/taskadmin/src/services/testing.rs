//! Test doubles shared by the service and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use taskadmin_core::cache::{Cache, CacheError, Result as CacheResult};
use taskadmin_core::identity::{IdentityError, IdentityProvider, Result as IdentityResult};
use taskadmin_core::storage::{
    ArtifactRepository, Result as RepoResult, TaskRepository, TaskRunRepository,
};
use taskadmin_core::task::{NewTask, NewTaskRun, Task, TaskRun, TaskRunArtifact};
use taskadmin_core::user::{IdentityRole, User, UserPage, UserRole};

use crate::identity::InMemoryIdentityProvider;
use crate::storage::InMemoryRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    Get(String),
    Set(String),
    Delete(String),
}

/// Cache that records every operation and can be told to fail.
#[derive(Default)]
pub struct RecordingCache {
    store: RwLock<HashMap<String, Vec<u8>>>,
    ops: Mutex<Vec<CacheOp>>,
    fail_gets: AtomicBool,
    fail_sets: AtomicBool,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<CacheOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn fail_gets(&self) {
        self.fail_gets.store(true, Ordering::SeqCst);
    }

    pub fn fail_sets(&self) {
        self.fail_sets.store(true, Ordering::SeqCst);
    }

    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.store.read().await.get(key).cloned()
    }

    pub async fn put_raw(&self, key: &str, value: &[u8]) {
        self.store
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
    }

    fn record(&self, op: CacheOp) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl Cache for RecordingCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.record(CacheOp::Get(key.to_string()));
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionFailed("cache down".to_string()));
        }
        Ok(self.store.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        self.record(CacheOp::Set(key.to_string()));
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(CacheError::OperationFailed("cache full".to_string()));
        }
        self.put_raw(key, value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.record(CacheOp::Delete(key.to_string()));
        self.store.write().await.remove(key);
        Ok(())
    }
}

/// In-memory repository that counts every call.
#[derive(Default)]
pub struct CountingRepository {
    inner: InMemoryRepository,
    calls: AtomicUsize,
}

impl CountingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) -> &InMemoryRepository {
        self.calls.fetch_add(1, Ordering::SeqCst);
        &self.inner
    }
}

#[async_trait]
impl TaskRepository for CountingRepository {
    async fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.hit().list_tasks().await
    }

    async fn list_tasks_by_owner(&self, owner: &str) -> RepoResult<Vec<Task>> {
        self.hit().list_tasks_by_owner(owner).await
    }

    async fn get_task(&self, id: u64) -> RepoResult<Option<Task>> {
        self.hit().get_task(id).await
    }

    async fn create_task(&self, task: NewTask) -> RepoResult<Task> {
        self.hit().create_task(task).await
    }

    async fn update_task(&self, task: &Task) -> RepoResult<()> {
        self.hit().update_task(task).await
    }

    async fn delete_task(&self, id: u64) -> RepoResult<()> {
        self.hit().delete_task(id).await
    }
}

#[async_trait]
impl TaskRunRepository for CountingRepository {
    async fn list_task_runs(&self, task_id: u64) -> RepoResult<Vec<TaskRun>> {
        self.hit().list_task_runs(task_id).await
    }

    async fn get_task_run(&self, id: u64) -> RepoResult<Option<TaskRun>> {
        self.hit().get_task_run(id).await
    }

    async fn create_task_run(&self, run: NewTaskRun) -> RepoResult<TaskRun> {
        self.hit().create_task_run(run).await
    }

    async fn update_task_run(&self, run: &TaskRun) -> RepoResult<()> {
        self.hit().update_task_run(run).await
    }
}

#[async_trait]
impl ArtifactRepository for CountingRepository {
    async fn insert_artifact(&self, artifact: &TaskRunArtifact) -> RepoResult<()> {
        self.hit().insert_artifact(artifact).await
    }

    async fn list_artifacts(
        &self,
        execution_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> RepoResult<Vec<TaskRunArtifact>> {
        self.hit().list_artifacts(execution_id, limit, offset).await
    }
}

/// In-memory identity directory that counts role lookups and can fail them.
#[derive(Default)]
pub struct CountingIdentity {
    inner: InMemoryIdentityProvider,
    role_calls: AtomicUsize,
    failing_user: Mutex<Option<String>>,
    aliases: Mutex<HashMap<String, String>>,
}

impl CountingIdentity {
    pub fn with_users(entries: impl IntoIterator<Item = (User, Vec<IdentityRole>)>) -> Self {
        Self {
            inner: InMemoryIdentityProvider::with_users(entries),
            ..Self::default()
        }
    }

    pub fn role_calls(&self) -> usize {
        self.role_calls.load(Ordering::SeqCst)
    }

    /// Makes role lookups for `user_id` fail.
    pub fn fail_roles_for(&self, user_id: &str) {
        *self.failing_user.lock().unwrap() = Some(user_id.to_string());
    }

    /// Makes `get_user(alias)` return the record stored under `canonical`.
    pub fn alias(&self, alias: &str, canonical: &str) {
        self.aliases
            .lock()
            .unwrap()
            .insert(alias.to_string(), canonical.to_string());
    }
}

#[async_trait]
impl IdentityProvider for CountingIdentity {
    async fn list_users(&self, page: u32, per_page: u32) -> IdentityResult<UserPage> {
        self.inner.list_users(page, per_page).await
    }

    async fn get_user(&self, user_id: &str) -> IdentityResult<User> {
        let canonical = self.aliases.lock().unwrap().get(user_id).cloned();
        self.inner
            .get_user(canonical.as_deref().unwrap_or(user_id))
            .await
    }

    async fn update_user(&self, user_id: &str, update: &User) -> IdentityResult<User> {
        self.inner.update_user(user_id, update).await
    }

    async fn delete_user(&self, user_id: &str) -> IdentityResult<()> {
        self.inner.delete_user(user_id).await
    }

    async fn list_user_roles(&self, user_id: &str) -> IdentityResult<Vec<UserRole>> {
        self.role_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_user.lock().unwrap().clone();
        if failing.as_deref() == Some(user_id) {
            return Err(IdentityError::RequestFailed("503 Service Unavailable".to_string()));
        }
        self.inner.list_user_roles(user_id).await
    }

    async fn assign_role(&self, user_id: &str, role: IdentityRole) -> IdentityResult<()> {
        self.inner.assign_role(user_id, role).await
    }

    async fn remove_role(&self, user_id: &str, role: IdentityRole) -> IdentityResult<()> {
        self.inner.remove_role(user_id, role).await
    }
}
