//! Users API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

/// User management router, one permission per verb
pub fn router() -> Router<ServerState> {
    let read = Router::new()
        .route("/api/users", get(handler::list_users))
        .route("/api/users/{id}", get(handler::get_user))
        .layer(middleware::from_fn(require_permission("users:read")));

    let create = Router::new()
        .route("/api/users", post(handler::create_user))
        .layer(middleware::from_fn(require_permission("users:create")));

    let update = Router::new()
        .route("/api/users/{id}", put(handler::update_user))
        .layer(middleware::from_fn(require_permission("users:update")));

    let remove = Router::new()
        .route("/api/users/{id}", delete(handler::delete_user))
        .layer(middleware::from_fn(require_permission("users:delete")));

    read.merge(create).merge(update).merge(remove)
}
