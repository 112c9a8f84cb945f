use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use taskadmin_core::storage::Pagination;
use taskadmin_core::task::{CreateArtifactRequest, TaskRunArtifact};

use crate::{handlers::AppError, services::ServiceError, state::AppState};

/// Raw `?page=&pageSize=` parameters, validated by [`Pagination::parse`].
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

impl PageQuery {
    pub fn pagination(&self) -> Result<Pagination, ServiceError> {
        Ok(Pagination::parse(
            self.page.as_deref(),
            self.page_size.as_deref(),
        )?)
    }
}

/// List one page of a run's artifacts, newest first
/// (GET /api/user/{userId}/task/{taskId}/run/{runId}/artifact).
pub async fn list_artifacts(
    State(state): State<AppState>,
    Path((_user_id, _task_id, run_id)): Path<(String, String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<TaskRunArtifact>>, AppError> {
    let pagination = query.pagination()?;
    Ok(Json(state.tasks.list_artifacts(&run_id, pagination).await?))
}

/// Record an artifact (POST /api/user/{userId}/task/{taskId}/run/{runId}/artifact).
pub async fn create_artifact(
    State(state): State<AppState>,
    body: Result<Json<CreateArtifactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = body?;
    let artifact = state.tasks.create_artifact(payload).await?;

    tracing::info!(
        execution_id = %artifact.execution_id,
        artifact_id = %artifact.artifact_id,
        "Created artifact"
    );

    Ok((StatusCode::CREATED, Json(artifact)))
}
