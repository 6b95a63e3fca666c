//! Authentication Handlers
//!
//! Login, session introspection, explicit session refresh and logout.

use std::time::Duration;

use axum::{Extension, Json, extract::State};

use crate::auth::{CurrentUser, resolver};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::{AppError, AppResult};
use shared::client::{LoginRequest, LoginResponse, SessionInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Login handler
///
/// Authenticates credentials, resolves the effective permission set from
/// the user's role assignments, and returns a JWT carrying the session
/// payload. The resolved set is fixed for the token's lifetime.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let account = user::find_by_email(&state.pool, &req.email)
        .await
        .map_err(AppError::from)?;

    // Fixed delay before checking the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent email enumeration
    let account = match account {
        Some(account) => {
            let password_valid = crate::auth::password::verify_password(
                &req.password,
                &account.hash_pass,
            )
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

            if !password_valid {
                tracing::warn!(email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            account
        }
        None => {
            tracing::warn!(email = %req.email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    // Resolve the effective permission set across all assigned roles
    let roles = user::roles_with_permissions(&state.pool, account.id)
        .await
        .map_err(AppError::from)?;
    let permission_set = resolver::resolve(&roles);
    let role_names: Vec<String> = roles.iter().map(|r| r.name.clone()).collect();

    let jwt_service = state.get_jwt_service();
    let user_id = account.id.to_string();

    let token = jwt_service
        .generate_token(
            &user_id,
            &account.name,
            &account.email,
            &role_names,
            &permission_set,
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        user_id = %user_id,
        email = %account.email,
        roles = ?role_names,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: SessionInfo {
            id: user_id,
            name: account.name,
            email: account.email,
            roles: role_names,
            permissions: permission_set.into_iter().collect(),
        },
    }))
}

/// Get the current session payload
///
/// Returns the token's view as-is: grants changed since issuance do not
/// show up here until the session is refreshed. Takes `CurrentUser`
/// through its extractor, which falls back to validating the bearer
/// header when no middleware has run.
pub async fn me(current_user: CurrentUser) -> Json<SessionInfo> {
    Json(current_user.to_session_info())
}

/// Explicit session refresh
///
/// Re-resolves roles and permissions from the store and issues a fresh
/// token. This is the only way a session picks up grant changes before it
/// expires.
pub async fn refresh(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<LoginResponse>> {
    let user_id: i64 = current_user
        .id
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed subject"))?;

    let account = user::find_by_email(&state.pool, &current_user.email)
        .await
        .map_err(AppError::from)?
        .filter(|account| account.id == user_id)
        .ok_or_else(AppError::unauthorized)?;

    let roles = user::roles_with_permissions(&state.pool, account.id)
        .await
        .map_err(AppError::from)?;
    let permission_set = resolver::resolve(&roles);
    let role_names: Vec<String> = roles.iter().map(|r| r.name.clone()).collect();

    let token = state
        .get_jwt_service()
        .generate_token(
            &current_user.id,
            &account.name,
            &account.email,
            &role_names,
            &permission_set,
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = %current_user.id, "Session refreshed");

    Ok(Json(LoginResponse {
        token,
        user: SessionInfo {
            id: current_user.id,
            name: account.name,
            email: account.email,
            roles: role_names,
            permissions: permission_set.into_iter().collect(),
        },
    }))
}

/// Logout handler
///
/// Tokens are stateless; this only records the event.
pub async fn logout(current_user: CurrentUser) -> Json<()> {
    tracing::info!(
        user_id = %current_user.id,
        email = %current_user.email,
        "User logged out"
    );

    Json(())
}
