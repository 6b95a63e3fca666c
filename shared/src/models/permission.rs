//! Permission Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Permission entity
///
/// `name` is the authorization vocabulary, convention `resource:action`
/// (e.g. `"users:read"`). Names are globally unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
}

/// Create permission payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PermissionCreate {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub description: Option<String>,
}

/// Update permission payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PermissionUpdate {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    pub description: Option<String>,
}
