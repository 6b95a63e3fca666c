//! Role Repository

use std::collections::HashMap;

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use shared::models::{Permission, Role, RoleCreate, RoleUpdate, RoleWithPermissions};

/// Flat join row used to assemble roles with their grants
#[derive(sqlx::FromRow)]
struct GrantRow {
    role_id: i64,
    id: i64,
    name: String,
    description: Option<String>,
    created_at: i64,
}

async fn grants_for_roles(pool: &SqlitePool) -> RepoResult<HashMap<i64, Vec<Permission>>> {
    let rows = sqlx::query_as::<_, GrantRow>(
        r#"SELECT rp.role_id, p.id, p.name, p.description, p.created_at
           FROM role_permission rp
           JOIN permission p ON p.id = rp.permission_id
           ORDER BY p.name"#,
    )
    .fetch_all(pool)
    .await?;

    let mut grants: HashMap<i64, Vec<Permission>> = HashMap::new();
    for row in rows {
        grants.entry(row.role_id).or_default().push(Permission {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        });
    }
    Ok(grants)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<RoleWithPermissions>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT id, name, description, created_at FROM role ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let mut grants = grants_for_roles(pool).await?;

    Ok(roles
        .into_iter()
        .map(|role| RoleWithPermissions {
            permissions: grants.remove(&role.id).unwrap_or_default(),
            id: role.id,
            name: role.name,
            description: role.description,
        })
        .collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<RoleWithPermissions>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, description, created_at FROM role WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(role) = role else {
        return Ok(None);
    };

    let permissions = sqlx::query_as::<_, Permission>(
        r#"SELECT p.id, p.name, p.description, p.created_at
           FROM role_permission rp
           JOIN permission p ON p.id = rp.permission_id
           WHERE rp.role_id = ?
           ORDER BY p.name"#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(RoleWithPermissions {
        id: role.id,
        name: role.name,
        description: role.description,
        permissions,
    }))
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, description, created_at FROM role WHERE name = ? LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

/// Validate that every referenced permission exists
async fn check_permission_ids(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    permission_ids: &[i64],
) -> RepoResult<()> {
    for pid in permission_ids {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM permission WHERE id = ?)")
            .bind(pid)
            .fetch_one(&mut **tx)
            .await?;
        if !exists {
            return Err(RepoError::Validation(format!(
                "Permission {pid} does not exist"
            )));
        }
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: RoleCreate) -> RepoResult<RoleWithPermissions> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Role '{}' already exists",
            data.name
        )));
    }

    let mut tx = pool.begin().await?;

    let id: i64 =
        sqlx::query_scalar("INSERT INTO role (name, description) VALUES (?, ?) RETURNING id")
            .bind(&data.name)
            .bind(&data.description)
            .fetch_one(&mut *tx)
            .await?;

    check_permission_ids(&mut tx, &data.permission_ids).await?;
    for pid in &data.permission_ids {
        sqlx::query("INSERT OR IGNORE INTO role_permission (role_id, permission_id) VALUES (?, ?)")
            .bind(id)
            .bind(pid)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: RoleUpdate) -> RepoResult<RoleWithPermissions> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {id} not found")))?;

    if let Some(ref new_name) = data.name
        && new_name != &existing.name
        && find_by_name(pool, new_name).await?.is_some()
    {
        return Err(RepoError::Duplicate(format!(
            "Role '{}' already exists",
            new_name
        )));
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE role SET name = COALESCE(?1, name), description = COALESCE(?2, description) WHERE id = ?3",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    // Replace grants when the payload carries them
    if let Some(ref permission_ids) = data.permission_ids {
        check_permission_ids(&mut tx, permission_ids).await?;
        sqlx::query("DELETE FROM role_permission WHERE role_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for pid in permission_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO role_permission (role_id, permission_id) VALUES (?, ?)",
            )
            .bind(id)
            .bind(pid)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {id} not found")))
}

/// Replace a role's grants with exactly the given permissions
pub async fn set_permissions(
    pool: &SqlitePool,
    id: i64,
    permission_ids: Vec<i64>,
) -> RepoResult<RoleWithPermissions> {
    update(
        pool,
        id,
        RoleUpdate {
            name: None,
            description: None,
            permission_ids: Some(permission_ids),
        },
    )
    .await
}

/// Hard delete a role
///
/// Assignments and grants referencing it disappear with it (schema cascade).
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {id} not found")))?;

    sqlx::query("DELETE FROM role WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
