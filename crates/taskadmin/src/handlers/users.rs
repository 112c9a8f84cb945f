//! User and role handlers. Users live in the identity service.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use taskadmin_core::user::{RoleRequest, User, UserPage, UserRole};

use crate::{
    handlers::{artifacts::PageQuery, AppError},
    state::AppState,
};

/// List one page of users with their roles (GET /api/user).
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserPage>, AppError> {
    let pagination = query.pagination()?;
    Ok(Json(state.users.list_users(pagination).await?))
}

/// Get a user (GET /api/user/{userId}).
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get_user(&user_id).await?))
}

/// Update a user's profile (PUT /api/user/{userId}).
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<User>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let Json(payload) = body?;
    let user = state.users.update_user(&user_id, payload).await?;

    tracing::info!(user_id = %user_id, "Updated user");

    Ok(Json(user))
}

/// Delete a user (DELETE /api/user/{userId}).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.users.delete_user(&user_id).await?;

    tracing::info!(user_id = %user_id, "Deleted user");

    Ok(StatusCode::NO_CONTENT)
}

/// List a user's roles straight from the identity service
/// (GET /api/user/{userId}/roles).
pub async fn list_user_roles(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UserRole>>, AppError> {
    Ok(Json(state.users.list_user_roles(&user_id).await?))
}

/// Assign a role (POST /api/user/{userId}/roles).
pub async fn assign_role(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(RoleRequest { role }) = body?;
    state.users.assign_role(&user_id, role).await?;

    tracing::info!(user_id = %user_id, role = %role, "Assigned role");

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a role (DELETE /api/user/{userId}/roles).
pub async fn remove_role(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(RoleRequest { role }) = body?;
    state.users.remove_role(&user_id, role).await?;

    tracing::info!(user_id = %user_id, role = %role, "Removed role");

    Ok(StatusCode::NO_CONTENT)
}
