//! Roles API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

/// Role management router, one permission per verb
///
/// Grant management (`/{id}/permissions`) counts as a role update: reading
/// grants only needs `roles:read`, replacing them needs `roles:update`.
pub fn router() -> Router<ServerState> {
    let read = Router::new()
        .route("/api/roles", get(handler::list_roles))
        .route("/api/roles/{id}", get(handler::get_role))
        .route("/api/roles/{id}/permissions", get(handler::get_role_permissions))
        .layer(middleware::from_fn(require_permission("roles:read")));

    let create = Router::new()
        .route("/api/roles", post(handler::create_role))
        .layer(middleware::from_fn(require_permission("roles:create")));

    let update = Router::new()
        .route("/api/roles/{id}", put(handler::update_role))
        .route("/api/roles/{id}/permissions", put(handler::set_role_permissions))
        .layer(middleware::from_fn(require_permission("roles:update")));

    let remove = Router::new()
        .route("/api/roles/{id}", delete(handler::delete_role))
        .layer(middleware::from_fn(require_permission("roles:delete")));

    read.merge(create).merge(update).merge(remove)
}
