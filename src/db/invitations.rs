use sqlx::{Row, SqlitePool};

use crate::db::{members, new_id, timestamp};
use crate::error::AppError;
use crate::models::invitation::{Invitation, InvitationStatus, NewInvitation};
use crate::models::member::Member;

fn row_to_invitation(row: sqlx::sqlite::SqliteRow) -> Invitation {
    Invitation {
        id: row.get("id"),
        workspace_id: row.get("workspace_id"),
        email: row.get("email"),
        role: row.get("role"),
        status: row.get("status"),
        invited_by: row.get("invited_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_INVITATIONS: &str = "SELECT id, workspace_id, email, role, status, invited_by, created_at, updated_at FROM workspace_invitations";

pub async fn get_invitation(pool: &SqlitePool, invitation_id: &str) -> Result<Invitation, AppError> {
    let row = sqlx::query(&format!("{SELECT_INVITATIONS} WHERE id = ?"))
        .bind(invitation_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("invitation not found".to_string()))?;

    Ok(row_to_invitation(row))
}

pub async fn list_workspace_invitations(
    pool: &SqlitePool,
    workspace_id: &str,
) -> Result<Vec<Invitation>, AppError> {
    let rows = sqlx::query(&format!(
        "{SELECT_INVITATIONS} WHERE workspace_id = ? ORDER BY created_at ASC, id ASC"
    ))
    .bind(workspace_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_invitation).collect())
}

pub async fn list_invitations_for_email(
    pool: &SqlitePool,
    email: &str,
    status: Option<InvitationStatus>,
) -> Result<Vec<Invitation>, AppError> {
    let rows = match status {
        Some(status) => {
            sqlx::query(&format!(
                "{SELECT_INVITATIONS} WHERE email = ? AND status = ? ORDER BY created_at ASC, id ASC"
            ))
            .bind(email)
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(&format!(
                "{SELECT_INVITATIONS} WHERE email = ? ORDER BY created_at ASC, id ASC"
            ))
            .bind(email)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(row_to_invitation).collect())
}

/// Inserts a pending invitation. A second pending invitation for the same
/// (workspace, email) is rejected by the existence check here and, under a
/// race, by the partial unique index.
pub async fn create_invitation(
    pool: &SqlitePool,
    input: &NewInvitation,
) -> Result<Invitation, AppError> {
    let existing: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM workspace_invitations WHERE workspace_id = ? AND email = ? AND status = 'pending' LIMIT 1",
    )
    .bind(&input.workspace_id)
    .bind(&input.email)
    .fetch_optional(pool)
    .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "a pending invitation already exists for this email".to_string(),
        ));
    }

    let id = new_id();
    let now = timestamp();

    sqlx::query(
        "INSERT INTO workspace_invitations (id, workspace_id, email, role, status, invited_by, created_at, updated_at) VALUES (?, ?, ?, ?, 'pending', ?, ?, ?)",
    )
    .bind(&id)
    .bind(&input.workspace_id)
    .bind(&input.email)
    .bind(input.role)
    .bind(&input.invited_by)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict(
            "a pending invitation already exists for this email".to_string(),
        ),
        other => other,
    })?;

    get_invitation(pool, &id).await
}

/// Moves a pending invitation to `next`. The `status = 'pending'` guard makes
/// the transition a compare-and-set, so two racing callers cannot both win.
pub async fn transition_invitation(
    pool: &SqlitePool,
    invitation_id: &str,
    next: InvitationStatus,
) -> Result<Invitation, AppError> {
    let current = get_invitation(pool, invitation_id).await?;
    if !current.status.can_transition_to(next) {
        return Err(AppError::InvalidState(format!(
            "invitation is {} and cannot become {next}",
            current.status
        )));
    }

    let result = sqlx::query(
        "UPDATE workspace_invitations SET status = ?, updated_at = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(next)
    .bind(timestamp())
    .bind(invitation_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::InvalidState(
            "invitation is no longer pending".to_string(),
        ));
    }

    get_invitation(pool, invitation_id).await
}

/// Accepts an invitation for `user_id` in one transaction: the status change
/// and the membership insert commit together or not at all.
///
/// The guarded UPDATE must stay the first statement: under WAL a deferred
/// transaction that has already read cannot take the write lock once another
/// writer commits.
pub async fn accept_invitation(
    pool: &SqlitePool,
    invitation_id: &str,
    user_id: &str,
) -> Result<(Invitation, Member), AppError> {
    let mut tx = pool.begin().await?;

    let now = timestamp();
    let result = sqlx::query(
        "UPDATE workspace_invitations SET status = 'accepted', updated_at = ? WHERE id = ? AND status = 'pending'",
    )
    .bind(&now)
    .bind(invitation_id)
    .execute(&mut *tx)
    .await?;

    let row = sqlx::query(&format!("{SELECT_INVITATIONS} WHERE id = ?"))
        .bind(invitation_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("invitation not found".to_string()))?;
    let invitation = row_to_invitation(row);

    if result.rows_affected() == 0 {
        return Err(AppError::InvalidState(format!(
            "invitation is {} and cannot be accepted",
            invitation.status
        )));
    }

    let workspace: Option<(String,)> = sqlx::query_as("SELECT id FROM workspaces WHERE id = ?")
        .bind(&invitation.workspace_id)
        .fetch_optional(&mut *tx)
        .await?;
    if workspace.is_none() {
        return Err(AppError::NotFound("workspace not found".to_string()));
    }

    let member = members::add_member(&mut *tx, &invitation.workspace_id, user_id, invitation.role)
        .await?;

    tx.commit().await?;
    Ok((invitation, member))
}

/// Hard-deletes a pending invitation.
pub async fn delete_invitation(pool: &SqlitePool, invitation_id: &str) -> Result<(), AppError> {
    let current = get_invitation(pool, invitation_id).await?;
    if current.status.is_terminal() {
        return Err(AppError::InvalidState(format!(
            "invitation is {} and can no longer be revoked",
            current.status
        )));
    }

    let result = sqlx::query("DELETE FROM workspace_invitations WHERE id = ? AND status = 'pending'")
        .bind(invitation_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::InvalidState(
            "invitation is no longer pending".to_string(),
        ));
    }
    Ok(())
}
