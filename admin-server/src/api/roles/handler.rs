//! Role Management Handlers
//!
//! Roles bundle permissions; changing a role's grants changes what every
//! assigned user resolves to on their next login or refresh. Active
//! sessions keep their issued set until then.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::role;
use crate::security_log;
use crate::utils::{AppError, AppResult};
use shared::models::{Permission, RoleCreate, RoleUpdate, RoleWithPermissions};

pub async fn list_roles(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<RoleWithPermissions>>> {
    let roles = role::find_all(&state.pool).await?;
    Ok(Json(roles))
}

pub async fn get_role(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RoleWithPermissions>> {
    let found = role::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;
    Ok(Json(found))
}

pub async fn create_role(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<RoleCreate>,
) -> AppResult<(StatusCode, Json<RoleWithPermissions>)> {
    payload.validate()?;

    let created = role::create(&state.pool, payload).await?;

    security_log!(
        "INFO",
        "role_created",
        actor = current_user.email.clone(),
        role = created.name.clone()
    );

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_role(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<RoleWithPermissions>> {
    payload.validate()?;

    let updated = role::update(&state.pool, id, payload).await?;

    security_log!(
        "INFO",
        "role_updated",
        actor = current_user.email.clone(),
        role = updated.name.clone()
    );

    Ok(Json(updated))
}

pub async fn get_role_permissions(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Permission>>> {
    let found = role::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;
    Ok(Json(found.permissions))
}

#[derive(Debug, Deserialize)]
pub struct SetPermissionsRequest {
    pub permission_ids: Vec<i64>,
}

/// Replace a role's grants with exactly the given set
pub async fn set_role_permissions(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<SetPermissionsRequest>,
) -> AppResult<Json<RoleWithPermissions>> {
    let updated = role::set_permissions(&state.pool, id, payload.permission_ids).await?;

    security_log!(
        "INFO",
        "role_grants_replaced",
        actor = current_user.email.clone(),
        role = updated.name.clone(),
        grant_count = updated.permissions.len()
    );

    Ok(Json(updated))
}

pub async fn delete_role(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    role::delete(&state.pool, id).await?;

    security_log!(
        "INFO",
        "role_deleted",
        actor = current_user.email.clone(),
        role_id = id
    );

    Ok(StatusCode::NO_CONTENT)
}
