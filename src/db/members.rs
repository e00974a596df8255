use sqlx::{Row, SqlitePool};

use crate::db::timestamp;
use crate::error::AppError;
use crate::models::member::Member;
use crate::models::role::WorkspaceRole;

fn row_to_member(row: sqlx::sqlite::SqliteRow) -> Member {
    Member {
        workspace_id: row.get("workspace_id"),
        user_id: row.get("user_id"),
        role: row.get("role"),
        joined_at: row.get("joined_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_MEMBERS: &str =
    "SELECT workspace_id, user_id, role, joined_at, updated_at FROM workspace_members";

pub async fn get_member(
    pool: &SqlitePool,
    workspace_id: &str,
    user_id: &str,
) -> Result<Member, AppError> {
    let row = sqlx::query(&format!(
        "{SELECT_MEMBERS} WHERE workspace_id = ? AND user_id = ?"
    ))
    .bind(workspace_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("member not found".to_string()))?;

    Ok(row_to_member(row))
}

pub async fn list_members(pool: &SqlitePool, workspace_id: &str) -> Result<Vec<Member>, AppError> {
    let rows = sqlx::query(&format!(
        "{SELECT_MEMBERS} WHERE workspace_id = ? ORDER BY joined_at ASC, user_id ASC"
    ))
    .bind(workspace_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_member).collect())
}

/// Inserts a membership. Takes any executor so accept can run it inside its
/// transaction.
pub async fn add_member<'e, E>(
    executor: E,
    workspace_id: &str,
    user_id: &str,
    role: WorkspaceRole,
) -> Result<Member, AppError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let now = timestamp();
    sqlx::query(
        "INSERT INTO workspace_members (workspace_id, user_id, role, joined_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(workspace_id)
    .bind(user_id)
    .bind(role)
    .bind(&now)
    .bind(&now)
    .execute(executor)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => {
            AppError::Conflict("already a member of this workspace".to_string())
        }
        other => other,
    })?;

    Ok(Member {
        workspace_id: workspace_id.to_string(),
        user_id: user_id.to_string(),
        role,
        joined_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_member_role(
    pool: &SqlitePool,
    workspace_id: &str,
    user_id: &str,
    role: WorkspaceRole,
) -> Result<Member, AppError> {
    let result = sqlx::query(
        "UPDATE workspace_members SET role = ?, updated_at = ? WHERE workspace_id = ? AND user_id = ?",
    )
    .bind(role)
    .bind(timestamp())
    .bind(workspace_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("member not found".to_string()));
    }

    get_member(pool, workspace_id, user_id).await
}

pub async fn remove_member(
    pool: &SqlitePool,
    workspace_id: &str,
    user_id: &str,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM workspace_members WHERE workspace_id = ? AND user_id = ?")
        .bind(workspace_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("member not found".to_string()));
    }
    Ok(())
}
