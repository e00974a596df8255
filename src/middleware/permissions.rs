use crate::error::AppError;
use crate::models::role::WorkspaceRole;
use crate::models::workspace::Workspace;
use crate::store::{MemberStore, WorkspaceStore};

/// Effective role of a user in a workspace.
///
/// - The owner is always `Admin` and needs no membership record.
/// - A member gets the role stored on their membership.
/// - Anyone else gets `Forbidden`.
pub async fn resolve_member_role(
    workspaces: &dyn WorkspaceStore,
    members: &dyn MemberStore,
    workspace_id: &str,
    user_id: &str,
) -> Result<(Workspace, WorkspaceRole), AppError> {
    let workspace = workspaces.get_workspace(workspace_id).await?;
    if workspace.owner_id == user_id {
        return Ok((workspace, WorkspaceRole::Admin));
    }

    let member = members
        .get_member(workspace_id, user_id)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => {
                AppError::Forbidden("you are not a member of this workspace".to_string())
            }
            other => other,
        })?;

    Ok((workspace, member.role))
}

/// Check that a user holds at least `min` in the workspace.
/// Returns the workspace and the caller's role on success.
pub async fn require_role(
    workspaces: &dyn WorkspaceStore,
    members: &dyn MemberStore,
    workspace_id: &str,
    user_id: &str,
    min: WorkspaceRole,
) -> Result<(Workspace, WorkspaceRole), AppError> {
    let (workspace, role) = resolve_member_role(workspaces, members, workspace_id, user_id).await?;
    if role < min {
        return Err(AppError::Forbidden(format!("requires the {min} role")));
    }
    Ok((workspace, role))
}

/// Only the owner may perform this action.
pub fn require_owner(workspace: &Workspace, user_id: &str) -> Result<(), AppError> {
    if workspace.owner_id != user_id {
        return Err(AppError::Forbidden(
            "only the workspace owner can do this".to_string(),
        ));
    }
    Ok(())
}
