//! Permission Repository

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use shared::models::{Permission, PermissionCreate, PermissionUpdate};

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description, created_at FROM permission ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Permission>> {
    let permission = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description, created_at FROM permission WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(permission)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Permission>> {
    let permission = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description, created_at FROM permission WHERE name = ? LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(permission)
}

pub async fn create(pool: &SqlitePool, data: PermissionCreate) -> RepoResult<Permission> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Permission '{}' already exists",
            data.name
        )));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO permission (name, description) VALUES (?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.description)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create permission".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: PermissionUpdate) -> RepoResult<Permission> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Permission {id} not found")))?;

    // Renames must keep the vocabulary unique
    if let Some(ref new_name) = data.name
        && new_name != &existing.name
        && find_by_name(pool, new_name).await?.is_some()
    {
        return Err(RepoError::Duplicate(format!(
            "Permission '{}' already exists",
            new_name
        )));
    }

    sqlx::query(
        "UPDATE permission SET name = COALESCE(?1, name), description = COALESCE(?2, description) WHERE id = ?3",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Permission {id} not found")))
}

/// Hard delete a permission
///
/// Grants referencing it disappear with it (schema cascade).
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Permission {id} not found")))?;

    sqlx::query("DELETE FROM permission WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
