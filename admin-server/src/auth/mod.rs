//! Authentication and authorization module
//!
//! JWT authentication, permission resolution and middleware:
//! - [`JwtService`] - token issuance and validation
//! - [`CurrentUser`] - session context injected into handlers
//! - [`resolver`] - effective permission set resolution
//! - [`require_auth`] - authentication middleware
//! - [`require_permission`] - authorization middleware

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod resolver;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_any_permission, require_auth, require_permission};
