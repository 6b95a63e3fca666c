//! User Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// User row matching the SQLite schema
///
/// `hash_pass` never leaves the server: it is skipped on serialization.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Reference to an assigned role, as returned inside user responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RoleRef {
    pub id: i64,
    pub name: String,
}

/// User as exposed by the API (no credential hash, roles attached)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub roles: Vec<RoleRef>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub image: Option<String>,
    /// Roles assigned to the new user
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

/// Update user payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub image: Option<String>,
    /// When present, replaces the user's role assignments
    pub role_ids: Option<Vec<i64>>,
}
