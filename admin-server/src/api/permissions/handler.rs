//! Permission Vocabulary Handlers
//!
//! Permissions are opaque names; the server never interprets them beyond
//! exact membership. Deleting one revokes it from every role through the
//! schema cascade.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::permission;
use crate::security_log;
use crate::utils::{AppError, AppResult};
use shared::models::{Permission, PermissionCreate, PermissionUpdate};

pub async fn list_permissions(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<Permission>>> {
    let permissions = permission::find_all(&state.pool).await?;
    Ok(Json(permissions))
}

pub async fn get_permission(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Permission>> {
    let found = permission::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))?;
    Ok(Json(found))
}

pub async fn create_permission(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PermissionCreate>,
) -> AppResult<(StatusCode, Json<Permission>)> {
    payload.validate()?;

    let created = permission::create(&state.pool, payload).await?;

    security_log!(
        "INFO",
        "permission_created",
        actor = current_user.email.clone(),
        permission = created.name.clone()
    );

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_permission(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PermissionUpdate>,
) -> AppResult<Json<Permission>> {
    payload.validate()?;

    let updated = permission::update(&state.pool, id, payload).await?;

    security_log!(
        "INFO",
        "permission_updated",
        actor = current_user.email.clone(),
        permission = updated.name.clone()
    );

    Ok(Json(updated))
}

pub async fn delete_permission(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    permission::delete(&state.pool, id).await?;

    security_log!(
        "INFO",
        "permission_deleted",
        actor = current_user.email.clone(),
        permission_id = id
    );

    Ok(StatusCode::NO_CONTENT)
}
