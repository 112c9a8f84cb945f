//! Task CRUD handlers.
//!
//! Path ids are handed to the service as strings; parsing them is a service
//! concern so malformed ids fail the same way everywhere.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use taskadmin_core::task::{CreateTaskRequest, TaskDto, UpdateTaskRequest};

use crate::{handlers::AppError, state::AppState};

/// List every task (GET /api/task).
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<TaskDto>>, AppError> {
    Ok(Json(state.tasks.list_tasks().await?))
}

/// List the tasks a user owns (GET /api/user/{userId}/task).
pub async fn list_user_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<TaskDto>>, AppError> {
    Ok(Json(state.tasks.list_user_tasks(&user_id).await?))
}

/// Create a task owned by the path user (POST /api/user/{userId}/task).
pub async fn create_task(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = body?;
    let task = state.tasks.create_task(&user_id, payload).await?;

    tracing::info!(task_id = %task.id, owner = %user_id, "Created task");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Get a task (GET /api/user/{userId}/task/{taskId}).
pub async fn get_task(
    State(state): State<AppState>,
    Path((_user_id, task_id)): Path<(String, String)>,
) -> Result<Json<TaskDto>, AppError> {
    Ok(Json(state.tasks.get_task(&task_id).await?))
}

/// Update a task (PUT /api/user/{userId}/task/{taskId}).
pub async fn update_task(
    State(state): State<AppState>,
    Path((_user_id, task_id)): Path<(String, String)>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskDto>, AppError> {
    let Json(payload) = body?;
    tracing::debug!(task_id = %task_id, payload = ?payload, "Received update task request");

    let task = state.tasks.update_task(&task_id, payload).await?;

    tracing::info!(task_id = %task.id, "Updated task");

    Ok(Json(task))
}

/// Delete a task (DELETE /api/user/{userId}/task/{taskId}).
pub async fn delete_task(
    State(state): State<AppState>,
    Path((_user_id, task_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state.tasks.delete_task(&task_id).await?;

    tracing::info!(task_id = %task_id, "Deleted task");

    Ok(StatusCode::NO_CONTENT)
}
