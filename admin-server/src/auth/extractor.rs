//! JWT Extractor
//!
//! Lets a handler take [`CurrentUser`] as a plain argument. Reuses the
//! instance the auth middleware injected when present; otherwise it
//! authenticates the bearer header itself, so the extractor also works on
//! routers assembled without the middleware stack.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, middleware};
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = middleware::authenticate_bearer(state, &parts.headers, &parts.uri)?;
        // Cache for later extractions in the same request
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
