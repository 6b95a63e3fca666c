//! Data models
//!
//! Shared between admin-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod permission;
pub mod role;
pub mod user;

// Re-exports
pub use permission::*;
pub use role::*;
pub use user::*;
