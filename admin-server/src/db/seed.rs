//! Seed data
//!
//! Applied at every startup, idempotent: the authorization vocabulary and
//! the default role wiring are created if absent and never overwritten.
//! Initial accounts are only created into an empty user table.

use sqlx::SqlitePool;

use crate::auth::{password, permissions};
use crate::core::Config;
use crate::utils::AppError;

/// Built-in roles and their descriptions
const DEFAULT_ROLES: &[(&str, &str)] = &[
    ("admin", "Administrator with full access"),
    ("user", "Regular user with limited access"),
    ("manager", "Manager with elevated access"),
];

/// Permission descriptions for the seeded vocabulary
fn describe(permission: &str) -> String {
    match permission.split_once(':') {
        Some((resource, action)) => format!("Can {action} {resource}"),
        None => permission.to_string(),
    }
}

/// Apply all seed data
pub async fn apply(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    ensure_permissions(pool).await?;
    ensure_roles(pool).await?;
    ensure_initial_users(pool, config).await?;
    Ok(())
}

async fn ensure_permissions(pool: &SqlitePool) -> Result<(), AppError> {
    for name in permissions::ALL_PERMISSIONS {
        sqlx::query("INSERT OR IGNORE INTO permission (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(describe(name))
            .execute(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to seed permission: {e}")))?;
    }
    Ok(())
}

async fn ensure_roles(pool: &SqlitePool) -> Result<(), AppError> {
    for (name, description) in DEFAULT_ROLES {
        sqlx::query("INSERT OR IGNORE INTO role (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to seed role: {e}")))?;

        // Wire default grants by name
        for permission in permissions::get_default_permissions(name) {
            sqlx::query(
                r#"INSERT OR IGNORE INTO role_permission (role_id, permission_id)
                   SELECT r.id, p.id FROM role r, permission p
                   WHERE r.name = ? AND p.name = ?"#,
            )
            .bind(name)
            .bind(&permission)
            .execute(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to seed grant: {e}")))?;
        }
    }
    Ok(())
}

/// Initial accounts, one per built-in role
///
/// Created only when the user table is empty. Credentials come from the
/// environment where provided; the generated defaults are for development
/// only and logged loudly. Production requires an explicit ADMIN_PASSWORD.
async fn ensure_initial_users(pool: &SqlitePool, config: &Config) -> Result<(), AppError> {
    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count users: {e}")))?;

    if user_count > 0 {
        return Ok(());
    }

    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password = match std::env::var("ADMIN_PASSWORD") {
        Ok(password) => password,
        Err(_) => {
            if config.is_production() {
                return Err(AppError::internal(
                    "ADMIN_PASSWORD must be set to seed accounts in production",
                ));
            }
            tracing::warn!("ADMIN_PASSWORD not set, seeding the default development password");
            "Admin123!".to_string()
        }
    };

    let accounts: &[(&str, &str, &str, &str)] = &[
        ("Admin User", admin_email.as_str(), admin_password.as_str(), "admin"),
        ("Manager User", "manager@example.com", "Manager123!", "manager"),
        ("Regular User", "user@example.com", "User123!", "user"),
    ];

    for (name, email, plain, role) in accounts {
        let hash_pass = password::hash_password(plain)
            .map_err(|e| AppError::internal(format!("Failed to hash seed password: {e}")))?;

        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO user (name, email, hash_pass) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(email)
        .bind(&hash_pass)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to seed user: {e}")))?;

        sqlx::query(
            "INSERT OR IGNORE INTO user_role (user_id, role_id) SELECT ?, id FROM role WHERE name = ?",
        )
        .bind(user_id)
        .bind(role)
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to seed assignment: {e}")))?;

        tracing::info!(email = %email, role = %role, "Seeded initial account");
    }

    Ok(())
}
