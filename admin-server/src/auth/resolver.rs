//! Permission Resolver
//!
//! Derives a session's authorization vocabulary and answers membership
//! queries. Stateless pure functions over data fetched per request; the
//! resolved set is attached to the session token and is only recomputed at
//! login or explicit refresh (stale-until-refresh).

use std::collections::BTreeSet;

use shared::models::RoleWithPermissions;

/// Resolve a user's effective permission set
///
/// Union of permission names across all assigned roles. Set semantics:
/// duplicate grants collapse, ordering of roles is irrelevant. A user with
/// zero roles yields the empty set, not an error.
pub fn resolve(roles: &[RoleWithPermissions]) -> BTreeSet<String> {
    roles
        .iter()
        .flat_map(|role| role.permissions.iter().map(|p| p.name.clone()))
        .collect()
}

/// Check a single required permission against a resolved set
///
/// Case-sensitive exact string membership. No wildcard or hierarchy
/// semantics: `users:*` does not imply `users:read`.
pub fn check(permission_set: &BTreeSet<String>, required: &str) -> bool {
    permission_set.contains(required)
}

/// Check the "either-of" pattern: accept if any one required permission
/// is a member of the set
pub fn check_any(permission_set: &BTreeSet<String>, required: &[&str]) -> bool {
    required.iter().any(|r| check(permission_set, r))
}
