//! User Management Handlers
//!
//! CRUD over user accounts and their role assignments. Authorization runs
//! in the router layers before any of these touch the store.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::{AppError, AppResult};
use shared::models::{UserCreate, UserResponse, UserUpdate};

pub async fn list_users(State(state): State<ServerState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user::find_all(&state.pool).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    let found = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
    Ok(Json(found))
}

pub async fn create_user(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    payload.validate()?;

    let created = user::create(&state.pool, payload).await?;

    security_log!(
        "INFO",
        "user_created",
        actor = current_user.email.clone(),
        subject = created.email.clone()
    );

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_user(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserResponse>> {
    payload.validate()?;

    let updated = user::update(&state.pool, id, payload).await?;

    security_log!(
        "INFO",
        "user_updated",
        actor = current_user.email.clone(),
        subject = updated.email.clone()
    );

    Ok(Json(updated))
}

pub async fn delete_user(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    // An administrator cannot delete their own account
    if current_user.id == id.to_string() {
        return Err(AppError::business_rule("Cannot delete your own account"));
    }

    user::delete(&state.pool, id).await?;

    security_log!(
        "INFO",
        "user_deleted",
        actor = current_user.email.clone(),
        subject_id = id
    );

    Ok(StatusCode::NO_CONTENT)
}
