//! Auth API Module

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Authentication router
/// - /api/auth/login: public (no auth required)
/// - /api/auth/me, /api/auth/refresh, /api/auth/logout: require auth
pub fn router() -> Router<ServerState> {
    Router::new()
        // Public route - exempted by the auth middleware
        .route("/api/auth/login", post(handler::login))
        // Protected routes
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/refresh", post(handler::refresh))
        .route("/api/auth/logout", post(handler::logout))
}
