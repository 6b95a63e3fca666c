//! Permission Definitions
//!
//! The authorization vocabulary. Permission names are exact strings under
//! the `resource:action` convention; there is no wildcard or hierarchy
//! matching anywhere in the system.

/// Full vocabulary (13 permissions), seeded at startup
pub const ALL_PERMISSIONS: &[&str] = &[
    // === User management (4) ===
    "users:read",
    "users:create",
    "users:update",
    "users:delete",
    // === Role management (4) ===
    "roles:read",
    "roles:create",
    "roles:update",
    "roles:delete",
    // === Permission management (4) ===
    "permissions:read",
    "permissions:create",
    "permissions:update",
    "permissions:delete",
    // === Baseline authenticated access (1) ===
    "dashboard:access",
];

/// Admin role: every permission
pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = ALL_PERMISSIONS;

/// Manager role: elevated but not destructive
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = &[
    "users:read",
    "users:create",
    "users:update",
    "roles:read",
    "permissions:read",
    "dashboard:access",
];

/// Regular user role: read-only basics
pub const DEFAULT_USER_PERMISSIONS: &[&str] = &["users:read", "dashboard:access"];

/// Default grants for a built-in role name
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    match role_name {
        "admin" => DEFAULT_ADMIN_PERMISSIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        "manager" => DEFAULT_MANAGER_PERMISSIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        "user" => DEFAULT_USER_PERMISSIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_size() {
        assert_eq!(ALL_PERMISSIONS.len(), 13);
    }

    #[test]
    fn test_default_wiring() {
        assert_eq!(get_default_permissions("admin").len(), 13);
        assert!(get_default_permissions("manager").contains(&"users:create".to_string()));
        assert!(!get_default_permissions("manager").contains(&"users:delete".to_string()));
        assert_eq!(
            get_default_permissions("user"),
            vec!["users:read".to_string(), "dashboard:access".to_string()]
        );
        assert!(get_default_permissions("unknown").is_empty());
    }
}
