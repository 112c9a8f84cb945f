//! SQLite schema definitions and SQL query constants.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner TEXT NOT NULL,
    task_name TEXT NOT NULL,
    task_definition TEXT NOT NULL,
    status INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS task_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL,
    execution_id TEXT,
    status INTEGER NOT NULL,
    start_time TEXT,
    end_time TEXT,
    error_message TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (task_id) REFERENCES tasks(id)
);

CREATE TABLE IF NOT EXISTS task_run_artifacts (
    execution_id TEXT NOT NULL,
    execution_task_id TEXT NOT NULL,
    artifact_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    artifact_type TEXT NOT NULL,
    url TEXT NOT NULL,
    content_type TEXT NOT NULL,
    content_length INTEGER NOT NULL,
    status_code INTEGER NOT NULL,
    storage_bucket TEXT NOT NULL,
    storage_key TEXT NOT NULL,
    additional_data TEXT NOT NULL,
    PRIMARY KEY (execution_id, artifact_id)
);

CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner);
CREATE INDEX IF NOT EXISTS idx_task_runs_task_id ON task_runs(task_id);
CREATE INDEX IF NOT EXISTS idx_artifacts_execution_created
    ON task_run_artifacts(execution_id, created_at DESC, artifact_id DESC);
"#;

// Task queries
pub const INSERT_TASK: &str = r#"
INSERT INTO tasks (owner, task_name, task_definition, status, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_TASKS: &str = r#"
SELECT id, owner, task_name, task_definition, status, created_at, updated_at, deleted_at
FROM tasks
WHERE deleted_at IS NULL
ORDER BY id ASC
"#;

pub const SELECT_TASKS_BY_OWNER: &str = r#"
SELECT id, owner, task_name, task_definition, status, created_at, updated_at, deleted_at
FROM tasks
WHERE owner = ?1 AND deleted_at IS NULL
ORDER BY id ASC
"#;

pub const SELECT_TASK_BY_ID: &str = r#"
SELECT id, owner, task_name, task_definition, status, created_at, updated_at, deleted_at
FROM tasks
WHERE id = ?1 AND deleted_at IS NULL
"#;

pub const UPDATE_TASK: &str = r#"
UPDATE tasks
SET task_name = ?2, task_definition = ?3, status = ?4, updated_at = ?5
WHERE id = ?1 AND deleted_at IS NULL
"#;

pub const SOFT_DELETE_TASK: &str = r#"
UPDATE tasks
SET deleted_at = ?2, updated_at = ?2
WHERE id = ?1 AND deleted_at IS NULL
"#;

// Task run queries
pub const INSERT_TASK_RUN: &str = r#"
INSERT INTO task_runs (task_id, execution_id, status, start_time, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_TASK_RUNS_BY_TASK: &str = r#"
SELECT id, task_id, execution_id, status, start_time, end_time, error_message, created_at, updated_at
FROM task_runs
WHERE task_id = ?1
ORDER BY id ASC
"#;

pub const SELECT_TASK_RUN_BY_ID: &str = r#"
SELECT id, task_id, execution_id, status, start_time, end_time, error_message, created_at, updated_at
FROM task_runs
WHERE id = ?1
"#;

pub const UPDATE_TASK_RUN: &str = r#"
UPDATE task_runs
SET execution_id = ?2, status = ?3, start_time = ?4, end_time = ?5, error_message = ?6, updated_at = ?7
WHERE id = ?1
"#;

// Artifact queries
pub const INSERT_ARTIFACT: &str = r#"
INSERT INTO task_run_artifacts (
    execution_id, execution_task_id, artifact_id, created_at, artifact_type, url,
    content_type, content_length, status_code, storage_bucket, storage_key, additional_data
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
"#;

pub const SELECT_ARTIFACTS_PAGE: &str = r#"
SELECT execution_id, execution_task_id, artifact_id, created_at, artifact_type, url,
    content_type, content_length, status_code, storage_bucket, storage_key, additional_data
FROM task_run_artifacts
WHERE execution_id = ?1
ORDER BY created_at DESC, artifact_id DESC
LIMIT ?2 OFFSET ?3
"#;
