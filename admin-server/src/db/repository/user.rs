//! User Repository

use std::collections::HashMap;

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::auth::password;
use shared::models::{
    Permission, RoleRef, RoleWithPermissions, User, UserCreate, UserResponse, UserUpdate,
};

/// Flat join row: one assigned role of one user
#[derive(sqlx::FromRow)]
struct AssignmentRow {
    user_id: i64,
    role_id: i64,
    role_name: String,
}

fn to_response(user: User, roles: Vec<RoleRef>) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        image: user.image,
        roles,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<UserResponse>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, name, email, hash_pass, image, created_at, updated_at FROM user ORDER BY email",
    )
    .fetch_all(pool)
    .await?;

    let rows = sqlx::query_as::<_, AssignmentRow>(
        r#"SELECT ur.user_id, r.id AS role_id, r.name AS role_name
           FROM user_role ur
           JOIN role r ON r.id = ur.role_id
           ORDER BY r.name"#,
    )
    .fetch_all(pool)
    .await?;

    let mut assignments: HashMap<i64, Vec<RoleRef>> = HashMap::new();
    for row in rows {
        assignments.entry(row.user_id).or_default().push(RoleRef {
            id: row.role_id,
            name: row.role_name,
        });
    }

    Ok(users
        .into_iter()
        .map(|user| {
            let roles = assignments.remove(&user.id).unwrap_or_default();
            to_response(user, roles)
        })
        .collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<UserResponse>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, hash_pass, image, created_at, updated_at FROM user WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(user) = user else {
        return Ok(None);
    };

    let roles = find_role_refs(pool, id).await?;
    Ok(Some(to_response(user, roles)))
}

/// Full row including the credential hash; login path only
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, hash_pass, image, created_at, updated_at FROM user WHERE email = ? LIMIT 1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Names of the roles assigned to a user
pub async fn find_role_refs(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<RoleRef>> {
    let roles = sqlx::query_as::<_, RoleRef>(
        r#"SELECT r.id, r.name
           FROM user_role ur
           JOIN role r ON r.id = ur.role_id
           WHERE ur.user_id = ?
           ORDER BY r.name"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

/// The resolver's input: every role assigned to the user, each with its
/// granted permissions loaded
pub async fn roles_with_permissions(
    pool: &SqlitePool,
    user_id: i64,
) -> RepoResult<Vec<RoleWithPermissions>> {
    let roles = sqlx::query_as::<_, shared::models::Role>(
        r#"SELECT r.id, r.name, r.description, r.created_at
           FROM user_role ur
           JOIN role r ON r.id = ur.role_id
           WHERE ur.user_id = ?
           ORDER BY r.name"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    #[derive(sqlx::FromRow)]
    struct GrantRow {
        role_id: i64,
        id: i64,
        name: String,
        description: Option<String>,
        created_at: i64,
    }

    let rows = sqlx::query_as::<_, GrantRow>(
        r#"SELECT rp.role_id, p.id, p.name, p.description, p.created_at
           FROM user_role ur
           JOIN role_permission rp ON rp.role_id = ur.role_id
           JOIN permission p ON p.id = rp.permission_id
           WHERE ur.user_id = ?"#,
    )
    .bind(user_id)
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

/// Validate that every referenced role exists
async fn check_role_ids(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    role_ids: &[i64],
) -> RepoResult<()> {
    for rid in role_ids {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM role WHERE id = ?)")
            .bind(rid)
            .fetch_one(&mut **tx)
            .await?;
        if !exists {
            return Err(RepoError::Validation(format!("Role {rid} does not exist")));
        }
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: UserCreate) -> RepoResult<UserResponse> {
    if find_by_email(pool, &data.email).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Email '{}' already exists",
            data.email
        )));
    }

    let hash_pass = password::hash_password(&data.password)
        .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;

    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO user (name, email, hash_pass, image) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&hash_pass)
    .bind(&data.image)
    .fetch_one(&mut *tx)
    .await?;

    check_role_ids(&mut tx, &data.role_ids).await?;
    for rid in &data.role_ids {
        sqlx::query("INSERT OR IGNORE INTO user_role (user_id, role_id) VALUES (?, ?)")
            .bind(id)
            .bind(rid)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: UserUpdate) -> RepoResult<UserResponse> {
    let existing = sqlx::query_as::<_, User>(
        "SELECT id, name, email, hash_pass, image, created_at, updated_at FROM user WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))?;

    if let Some(ref new_email) = data.email
        && new_email != &existing.email
        && find_by_email(pool, new_email).await?.is_some()
    {
        return Err(RepoError::Duplicate(format!(
            "Email '{}' already exists",
            new_email
        )));
    }

    let hash_pass = match data.password {
        Some(ref pw) => Some(
            password::hash_password(pw)
                .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?,
        ),
        None => None,
    };

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"UPDATE user SET
            name = COALESCE(?1, name),
            email = COALESCE(?2, email),
            hash_pass = COALESCE(?3, hash_pass),
            image = COALESCE(?4, image),
            updated_at = strftime('%s', 'now')
        WHERE id = ?5"#,
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&hash_pass)
    .bind(&data.image)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    // Replace role assignments when the payload carries them
    if let Some(ref role_ids) = data.role_ids {
        check_role_ids(&mut tx, role_ids).await?;
        sqlx::query("DELETE FROM user_role WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for rid in role_ids {
            sqlx::query("INSERT OR IGNORE INTO user_role (user_id, role_id) VALUES (?, ?)")
                .bind(id)
                .bind(rid)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Hard delete a user
///
/// Role assignments disappear with it (schema cascade).
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))?;

    sqlx::query("DELETE FROM user WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
