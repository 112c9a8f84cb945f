//! SQLite repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use taskadmin_core::storage::{
    ArtifactRepository, RepositoryError, Result, TaskRepository, TaskRunRepository,
};
use taskadmin_core::task::{NewTask, NewTaskRun, Task, TaskRun, TaskRunArtifact};

use super::conversions::{
    format_datetime, row_to_artifact, row_to_task, row_to_task_run, to_json_text, to_sql_id,
};
use super::error::{map_tokio_rusqlite_error, map_tokio_rusqlite_error_with_id};
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// Turns a zero-row write into `QueryReturnedNoRows` so it maps to `NotFound`.
fn require_row(rows: usize) -> std::result::Result<(), tokio_rusqlite::Error> {
    if rows == 0 {
        Err(wrap_err(rusqlite::Error::QueryReturnedNoRows))
    } else {
        Ok(())
    }
}

/// SQLite-based repository implementation.
///
/// Holds tasks, task runs and artifacts in one database file.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn query_tasks(&self, sql: &'static str, owner: Option<String>) -> Result<Vec<Task>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                let rows = match &owner {
                    Some(owner) => stmt.query_map([owner], row_to_task),
                    None => stmt.query_map([], row_to_task),
                }
                .map_err(wrap_err)?;

                let mut tasks = Vec::new();
                for row_result in rows {
                    tasks.push(row_result.map_err(wrap_err)?);
                }
                Ok(tasks)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Task"))
    }
}

#[async_trait]
impl TaskRepository for SqliteRepository {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.query_tasks(schema::SELECT_TASKS, None).await
    }

    async fn list_tasks_by_owner(&self, owner: &str) -> Result<Vec<Task>> {
        self.query_tasks(schema::SELECT_TASKS_BY_OWNER, Some(owner.to_string()))
            .await
    }

    async fn get_task(&self, id: u64) -> Result<Option<Task>> {
        let sql_id = to_sql_id(id)?;

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_TASK_BY_ID).map_err(wrap_err)?;
                match stmt.query_row([sql_id], row_to_task) {
                    Ok(task) => Ok(Some(task)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Task", id.to_string()))
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let definition = to_json_text(&task.task_definition)?;
        let created_at = format_datetime(&task.created_at);
        let owner = task.owner.clone();
        let task_name = task.task_name.clone();
        let status = task.status.code();

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_TASK,
                    rusqlite::params![owner, task_name, definition, status, created_at, created_at],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "Task"))?;

        let id = u64::try_from(id)
            .map_err(|_| RepositoryError::InvalidData(format!("negative task id: {id}")))?;
        Ok(task.into_task(id))
    }

    async fn update_task(&self, task: &Task) -> Result<()> {
        let sql_id = to_sql_id(task.id)?;
        let task_name = task.task_name.clone();
        let definition = to_json_text(&task.task_definition)?;
        let status = task.status.code();
        let updated_at = format_datetime(&task.updated_at);

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_TASK,
                        rusqlite::params![sql_id, task_name, definition, status, updated_at],
                    )
                    .map_err(wrap_err)?;
                require_row(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Task", task.id.to_string()))
    }

    async fn delete_task(&self, id: u64) -> Result<()> {
        let sql_id = to_sql_id(id)?;
        let deleted_at = format_datetime(&Utc::now());

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::SOFT_DELETE_TASK, rusqlite::params![sql_id, deleted_at])
                    .map_err(wrap_err)?;
                require_row(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Task", id.to_string()))
    }
}

#[async_trait]
impl TaskRunRepository for SqliteRepository {
    async fn list_task_runs(&self, task_id: u64) -> Result<Vec<TaskRun>> {
        let sql_task_id = to_sql_id(task_id)?;

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_TASK_RUNS_BY_TASK)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map([sql_task_id], row_to_task_run)
                    .map_err(wrap_err)?;

                let mut runs = Vec::new();
                for row_result in rows {
                    runs.push(row_result.map_err(wrap_err)?);
                }
                Ok(runs)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "TaskRun"))
    }

    async fn get_task_run(&self, id: u64) -> Result<Option<TaskRun>> {
        let sql_id = to_sql_id(id)?;

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_TASK_RUN_BY_ID)
                    .map_err(wrap_err)?;
                match stmt.query_row([sql_id], row_to_task_run) {
                    Ok(run) => Ok(Some(run)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "TaskRun", id.to_string()))
    }

    async fn create_task_run(&self, run: NewTaskRun) -> Result<TaskRun> {
        let task_id = to_sql_id(run.task_id)?;
        let execution_id = run.execution_id.clone();
        let status = run.status.code();
        let start_time = run.start_time.as_ref().map(format_datetime);
        let created_at = format_datetime(&run.created_at);

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_TASK_RUN,
                    rusqlite::params![
                        task_id,
                        execution_id,
                        status,
                        start_time,
                        created_at,
                        created_at
                    ],
                )
                .map_err(wrap_err)?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "TaskRun"))?;

        let id = u64::try_from(id)
            .map_err(|_| RepositoryError::InvalidData(format!("negative task run id: {id}")))?;
        Ok(run.into_run(id))
    }

    async fn update_task_run(&self, run: &TaskRun) -> Result<()> {
        let sql_id = to_sql_id(run.id)?;
        let execution_id = run.execution_id.clone();
        let status = run.status.code();
        let start_time = run.start_time.as_ref().map(format_datetime);
        let end_time = run.end_time.as_ref().map(format_datetime);
        let error_message = run.error_message.clone();
        let updated_at = format_datetime(&run.updated_at);

        self.conn
            .call(move |conn| {
                let rows = conn
                    .execute(
                        schema::UPDATE_TASK_RUN,
                        rusqlite::params![
                            sql_id,
                            execution_id,
                            status,
                            start_time,
                            end_time,
                            error_message,
                            updated_at
                        ],
                    )
                    .map_err(wrap_err)?;
                require_row(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "TaskRun", run.id.to_string()))
    }
}

#[async_trait]
impl ArtifactRepository for SqliteRepository {
    async fn insert_artifact(&self, artifact: &TaskRunArtifact) -> Result<()> {
        let execution_id = artifact.execution_id.to_string();
        let execution_task_id = artifact.execution_task_id.to_string();
        let artifact_id = artifact.artifact_id.to_string();
        let created_at = format_datetime(&artifact.created_at);
        let artifact_type = artifact.artifact_type.clone();
        let url = artifact.url.clone();
        let content_type = artifact.content_type.clone();
        let content_length = artifact.content_length;
        let status_code = artifact.status_code;
        let storage_bucket = artifact.storage_bucket.clone();
        let storage_key = artifact.storage_key.clone();
        let additional_data = to_json_text(&artifact.additional_data)?;

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_ARTIFACT,
                    rusqlite::params![
                        execution_id,
                        execution_task_id,
                        artifact_id,
                        created_at,
                        artifact_type,
                        url,
                        content_type,
                        content_length,
                        status_code,
                        storage_bucket,
                        storage_key,
                        additional_data
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| {
                map_tokio_rusqlite_error_with_id(
                    e,
                    "TaskRunArtifact",
                    artifact.artifact_id.to_string(),
                )
            })
    }

    async fn list_artifacts(
        &self,
        execution_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<TaskRunArtifact>> {
        let execution_id = execution_id.to_string();
        let offset = i64::try_from(offset)
            .map_err(|_| RepositoryError::InvalidData(format!("offset out of range: {offset}")))?;

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_ARTIFACTS_PAGE)
                    .map_err(wrap_err)?;
                let rows = stmt
                    .query_map(
                        rusqlite::params![execution_id, i64::from(limit), offset],
                        row_to_artifact,
                    )
                    .map_err(wrap_err)?;

                let mut artifacts = Vec::new();
                for row_result in rows {
                    artifacts.push(row_result.map_err(wrap_err)?);
                }
                Ok(artifacts)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, "TaskRunArtifact"))
    }
}
