use sqlx::{Row, SqlitePool};

use crate::db::{new_id, timestamp};
use crate::error::AppError;
use crate::models::workspace::{UpdateWorkspace, Workspace};

fn row_to_workspace(row: sqlx::sqlite::SqliteRow) -> Workspace {
    Workspace {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_WORKSPACES: &str =
    "SELECT id, name, description, owner_id, created_at, updated_at FROM workspaces";

pub async fn get_workspace(pool: &SqlitePool, workspace_id: &str) -> Result<Workspace, AppError> {
    let row = sqlx::query(&format!("{SELECT_WORKSPACES} WHERE id = ?"))
        .bind(workspace_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("workspace not found".to_string()))?;

    Ok(row_to_workspace(row))
}

/// Workspaces the user owns or holds a membership in, oldest first.
pub async fn list_workspaces_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<Workspace>, AppError> {
    let rows = sqlx::query(&format!(
        "{SELECT_WORKSPACES} WHERE owner_id = ? \
         OR id IN (SELECT workspace_id FROM workspace_members WHERE user_id = ?) \
         ORDER BY created_at ASC, id ASC"
    ))
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_workspace).collect())
}

pub async fn create_workspace(
    pool: &SqlitePool,
    owner_id: &str,
    name: &str,
    description: &str,
) -> Result<Workspace, AppError> {
    let id = new_id();
    let now = timestamp();

    sqlx::query(
        "INSERT INTO workspaces (id, name, description, owner_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(description)
    .bind(owner_id)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get_workspace(pool, &id).await
}

pub async fn update_workspace(
    pool: &SqlitePool,
    workspace_id: &str,
    input: &UpdateWorkspace,
) -> Result<Workspace, AppError> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<&str> = Vec::new();

    if let Some(ref name) = input.name {
        sets.push("name = ?");
        values.push(name);
    }
    if let Some(ref description) = input.description {
        sets.push("description = ?");
        values.push(description);
    }

    if sets.is_empty() {
        return get_workspace(pool, workspace_id).await;
    }

    let now = timestamp();
    sets.push("updated_at = ?");
    values.push(&now);

    let set_clause = sets.join(", ");
    let query = format!("UPDATE workspaces SET {set_clause} WHERE id = ?");
    let mut q = sqlx::query(&query);
    for v in &values {
        q = q.bind(*v);
    }
    let result = q.bind(workspace_id).execute(pool).await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("workspace not found".to_string()));
    }

    get_workspace(pool, workspace_id).await
}

/// Deletes the workspace row. Its personas and journeys go with it through
/// the foreign key; invitations and memberships are left in place.
pub async fn delete_workspace(pool: &SqlitePool, workspace_id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM workspaces WHERE id = ?")
        .bind(workspace_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("workspace not found".to_string()));
    }
    Ok(())
}
