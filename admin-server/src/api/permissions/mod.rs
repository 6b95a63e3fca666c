//! Permissions API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{require_any_permission, require_permission};
use crate::core::ServerState;

/// Permissions the read side accepts
///
/// The role editor lists the vocabulary too, so a session with only
/// `roles:read` may still read permissions.
const READ_EITHER: &[&str] = &["permissions:read", "roles:read"];

/// Permission vocabulary router
pub fn router() -> Router<ServerState> {
    let read = Router::new()
        .route("/api/permissions", get(handler::list_permissions))
        .route("/api/permissions/{id}", get(handler::get_permission))
        .layer(middleware::from_fn(require_any_permission(READ_EITHER)));

    let create = Router::new()
        .route("/api/permissions", post(handler::create_permission))
        .layer(middleware::from_fn(require_permission("permissions:create")));

    let update = Router::new()
        .route("/api/permissions/{id}", put(handler::update_permission))
        .layer(middleware::from_fn(require_permission("permissions:update")));

    let remove = Router::new()
        .route("/api/permissions/{id}", delete(handler::delete_permission))
        .layer(middleware::from_fn(require_permission("permissions:delete")));

    read.merge(create).merge(update).merge(remove)
}
