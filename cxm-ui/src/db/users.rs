//! Staff roster queries
//!
//! Accounts are inserted and deleted whole; there is no update path. Roster
//! mutation is an administrator capability, enforced where requests are
//! accepted (see the api module), not here.

use cxm_common::models::{User, UserRole};
use cxm_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

type UserRow = (String, String, String, String, i64, Option<String>);

/// List all staff accounts, ordered by display name
pub async fn list_users(db: &SqlitePool) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(
        "SELECT id, name, email, role, active, password FROM staff_users ORDER BY name",
    )
    .fetch_all(db)
    .await?;

    rows.into_iter().map(row_to_user).collect()
}

/// Fetch one account by id
pub async fn get_user(db: &SqlitePool, id: Uuid) -> Result<Option<User>> {
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT id, name, email, role, active, password FROM staff_users WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(db)
    .await?;

    row.map(row_to_user).transpose()
}

/// Insert a new staff account
pub async fn insert_user(db: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO staff_users (id, name, email, role, active, password)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id.to_string())
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.role.as_str())
    .bind(user.active as i64)
    .bind(&user.password)
    .execute(db)
    .await?;

    Ok(())
}

/// Delete a staff account; returns whether a row was removed
pub async fn delete_user(db: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM staff_users WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn row_to_user(row: UserRow) -> Result<User> {
    let (id, name, email, role, active, password) = row;
    let role = match role.as_str() {
        "ADMIN" => UserRole::Admin,
        "COLLABORATOR" => UserRole::Collaborator,
        other => {
            return Err(Error::Internal(format!(
                "unknown role '{}' in staff_users",
                other
            )))
        }
    };

    Ok(User {
        id: id
            .parse()
            .map_err(|e| Error::Internal(format!("invalid user id in staff_users: {}", e)))?,
        name,
        email,
        role,
        active: active != 0,
        password,
    })
}
