//! Role Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Permission;

/// Role entity (RBAC role)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
}

/// Role with its granted permissions loaded
///
/// This is the resolver's input shape: a user's assigned roles, each with
/// its grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<Permission>,
}

/// Create role payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoleCreate {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    pub description: Option<String>,
    /// Permissions granted to the new role
    #[serde(default)]
    pub permission_ids: Vec<i64>,
}

/// Update role payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RoleUpdate {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    pub description: Option<String>,
    /// When present, replaces the role's grants
    pub permission_ids: Option<Vec<i64>>,
}
