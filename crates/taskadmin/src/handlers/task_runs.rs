//! Task run handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use taskadmin_core::task::{CreateTaskRunRequest, TaskRunDto, UpdateTaskRunRequest};

use crate::{handlers::AppError, state::AppState};

/// List the runs of a task (GET /api/user/{userId}/task/{taskId}/run).
pub async fn list_task_runs(
    State(state): State<AppState>,
    Path((_user_id, task_id)): Path<(String, String)>,
) -> Result<Json<Vec<TaskRunDto>>, AppError> {
    Ok(Json(state.tasks.list_task_runs(&task_id).await?))
}

/// Create a run for a task (POST /api/user/{userId}/task/{taskId}/run).
///
/// A request without a JSON content type yields a run with no execution id.
/// A malformed JSON body is still rejected.
pub async fn create_task_run(
    State(state): State<AppState>,
    Path((_user_id, task_id)): Path<(String, String)>,
    body: Result<Option<Json<CreateTaskRunRequest>>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = body?.map(|Json(p)| p).unwrap_or_default();
    let run = state.tasks.create_task_run(&task_id, payload).await?;

    tracing::info!(run_id = run.id, task_id = run.task_id, "Created task run");

    Ok((StatusCode::CREATED, Json(run)))
}

/// Get a run (GET /api/user/{userId}/task/{taskId}/run/{runId}).
pub async fn get_task_run(
    State(state): State<AppState>,
    Path((_user_id, _task_id, run_id)): Path<(String, String, String)>,
) -> Result<Json<TaskRunDto>, AppError> {
    Ok(Json(state.tasks.get_task_run(&run_id).await?))
}

/// Partially update a run (PUT /api/user/{userId}/task/{taskId}/run/{runId}).
pub async fn update_task_run(
    State(state): State<AppState>,
    Path((_user_id, _task_id, run_id)): Path<(String, String, String)>,
    body: Result<Json<UpdateTaskRunRequest>, JsonRejection>,
) -> Result<Json<TaskRunDto>, AppError> {
    let Json(payload) = body?;
    let run = state.tasks.update_task_run(&run_id, payload).await?;

    tracing::info!(run_id = run.id, status = ?run.status, "Updated task run");

    Ok(Json(run))
}
