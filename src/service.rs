//! Workspace membership operations.
//!
//! `WorkspaceService` owns the three stores and applies the access rules on
//! top of them. HTTP handlers and [`crate::context::WorkspaceContext`] both go
//! through it; neither touches a store directly.

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::middleware::permissions::{require_owner, require_role, resolve_member_role};
use crate::models::invitation::{
    normalize_email, validate_email, CreateInvitation, Invitation, InvitationStatus,
    NewInvitation,
};
use crate::models::member::Member;
use crate::models::role::WorkspaceRole;
use crate::models::workspace::{CreateWorkspace, UpdateWorkspace, Workspace};
use crate::store::{InvitationStore, MemberStore, MemoryStore, SqliteStore, WorkspaceStore};

#[derive(Clone)]
pub struct WorkspaceService {
    workspaces: Arc<dyn WorkspaceStore>,
    invitations: Arc<dyn InvitationStore>,
    members: Arc<dyn MemberStore>,
}

impl WorkspaceService {
    pub fn new(
        workspaces: Arc<dyn WorkspaceStore>,
        invitations: Arc<dyn InvitationStore>,
        members: Arc<dyn MemberStore>,
    ) -> Self {
        Self {
            workspaces,
            invitations,
            members,
        }
    }

    pub fn sqlite(pool: SqlitePool) -> Self {
        let store = Arc::new(SqliteStore::new(pool));
        Self::new(store.clone(), store.clone(), store)
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store.clone(), store)
    }

    /// Caller's effective role in the workspace; `Forbidden` for non-members.
    pub async fn role_of(
        &self,
        auth: &AuthUser,
        workspace_id: &str,
    ) -> Result<(Workspace, WorkspaceRole), AppError> {
        resolve_member_role(
            self.workspaces.as_ref(),
            self.members.as_ref(),
            workspace_id,
            &auth.user_id,
        )
        .await
    }

    /// Like [`role_of`](Self::role_of) but also requires at least `min`.
    pub async fn authorize(
        &self,
        auth: &AuthUser,
        workspace_id: &str,
        min: WorkspaceRole,
    ) -> Result<(Workspace, WorkspaceRole), AppError> {
        require_role(
            self.workspaces.as_ref(),
            self.members.as_ref(),
            workspace_id,
            &auth.user_id,
            min,
        )
        .await
    }

    // -- workspaces --

    pub async fn create_workspace(
        &self,
        auth: &AuthUser,
        input: &CreateWorkspace,
    ) -> Result<Workspace, AppError> {
        let (name, description) = input.normalized().map_err(AppError::BadRequest)?;
        let workspace = self
            .workspaces
            .create_workspace(&auth.user_id, &name, &description)
            .await?;
        tracing::info!("workspace {} created by {}", workspace.id, auth.user_id);
        Ok(workspace)
    }

    pub async fn get_workspace(
        &self,
        auth: &AuthUser,
        workspace_id: &str,
    ) -> Result<Workspace, AppError> {
        let (workspace, _) = self.role_of(auth, workspace_id).await?;
        Ok(workspace)
    }

    pub async fn list_workspaces(&self, auth: &AuthUser) -> Result<Vec<Workspace>, AppError> {
        self.workspaces.list_workspaces_for_user(&auth.user_id).await
    }

    pub async fn update_workspace(
        &self,
        auth: &AuthUser,
        workspace_id: &str,
        input: UpdateWorkspace,
    ) -> Result<Workspace, AppError> {
        self.authorize(auth, workspace_id, WorkspaceRole::Admin).await?;
        let input = input.normalized().map_err(AppError::BadRequest)?;
        let workspace = self.workspaces.update_workspace(workspace_id, &input).await?;
        tracing::debug!("workspace {workspace_id} updated by {}", auth.user_id);
        Ok(workspace)
    }

    /// Deletes the workspace record only. Invitations and memberships that
    /// reference it are left in place.
    pub async fn delete_workspace(&self, auth: &AuthUser, workspace_id: &str) -> Result<(), AppError> {
        let workspace = self.workspaces.get_workspace(workspace_id).await?;
        require_owner(&workspace, &auth.user_id)?;
        self.workspaces.delete_workspace(workspace_id).await?;
        tracing::info!("workspace {workspace_id} deleted by {}", auth.user_id);
        Ok(())
    }

    // -- invitations --

    pub async fn invite_member(
        &self,
        auth: &AuthUser,
        workspace_id: &str,
        input: &CreateInvitation,
    ) -> Result<Invitation, AppError> {
        self.authorize(auth, workspace_id, WorkspaceRole::Admin).await?;
        let email = normalize_email(&input.email);
        validate_email(&email).map_err(|e| AppError::BadRequest(e.to_string()))?;
        if email == auth.email {
            return Err(AppError::Conflict(
                "you already belong to this workspace".to_string(),
            ));
        }

        let invitation = self
            .invitations
            .create_invitation(&NewInvitation {
                workspace_id: workspace_id.to_string(),
                email,
                role: input.role,
                invited_by: auth.user_id.clone(),
            })
            .await?;
        tracing::info!(
            "invitation {} to {} as {} in workspace {workspace_id}",
            invitation.id,
            invitation.email,
            invitation.role
        );
        Ok(invitation)
    }

    /// Visible to the invitee and to admins of the inviting workspace.
    pub async fn get_invitation(
        &self,
        auth: &AuthUser,
        invitation_id: &str,
    ) -> Result<Invitation, AppError> {
        let invitation = self.invitations.get_invitation(invitation_id).await?;
        if invitation.email != auth.email {
            self.authorize(auth, &invitation.workspace_id, WorkspaceRole::Admin).await?;
        }
        Ok(invitation)
    }

    pub async fn list_workspace_invitations(
        &self,
        auth: &AuthUser,
        workspace_id: &str,
    ) -> Result<Vec<Invitation>, AppError> {
        self.authorize(auth, workspace_id, WorkspaceRole::Admin).await?;
        self.invitations.list_workspace_invitations(workspace_id).await
    }

    /// Invitations addressed to the caller's email.
    pub async fn list_invitations_for_email(
        &self,
        auth: &AuthUser,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>, AppError> {
        self.invitations
            .list_invitations_for_email(&auth.email, status)
            .await
    }

    pub async fn revoke_invitation(&self, auth: &AuthUser, invitation_id: &str) -> Result<(), AppError> {
        let invitation = self.invitations.get_invitation(invitation_id).await?;
        self.authorize(auth, &invitation.workspace_id, WorkspaceRole::Admin).await?;
        self.invitations.delete_invitation(invitation_id).await?;
        tracing::info!("invitation {invitation_id} revoked by {}", auth.user_id);
        Ok(())
    }

    pub async fn accept_invitation(
        &self,
        auth: &AuthUser,
        invitation_id: &str,
    ) -> Result<(Invitation, Member), AppError> {
        let invitation = self.invitee_invitation(auth, invitation_id).await?;
        if invitation.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "invitation is already {}",
                invitation.status
            )));
        }

        let workspace = self
            .workspaces
            .get_workspace(&invitation.workspace_id)
            .await?;
        if workspace.owner_id == auth.user_id {
            return Err(AppError::Conflict(
                "you already own this workspace".to_string(),
            ));
        }

        let (invitation, member) = self
            .invitations
            .accept_invitation(invitation_id, &auth.user_id)
            .await?;
        tracing::info!(
            "{} joined workspace {} as {}",
            auth.user_id,
            member.workspace_id,
            member.role
        );
        Ok((invitation, member))
    }

    pub async fn decline_invitation(
        &self,
        auth: &AuthUser,
        invitation_id: &str,
    ) -> Result<Invitation, AppError> {
        self.invitee_invitation(auth, invitation_id).await?;
        let invitation = self
            .invitations
            .transition_invitation(invitation_id, InvitationStatus::Declined)
            .await?;
        tracing::debug!("invitation {invitation_id} declined");
        Ok(invitation)
    }

    async fn invitee_invitation(
        &self,
        auth: &AuthUser,
        invitation_id: &str,
    ) -> Result<Invitation, AppError> {
        let invitation = self.invitations.get_invitation(invitation_id).await?;
        if invitation.email != auth.email {
            return Err(AppError::Forbidden(
                "this invitation was sent to a different email".to_string(),
            ));
        }
        Ok(invitation)
    }

    // -- members --

    pub async fn list_members(
        &self,
        auth: &AuthUser,
        workspace_id: &str,
    ) -> Result<Vec<Member>, AppError> {
        self.role_of(auth, workspace_id).await?;
        self.members.list_members(workspace_id).await
    }

    pub async fn update_member_role(
        &self,
        auth: &AuthUser,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<Member, AppError> {
        self.authorize(auth, workspace_id, WorkspaceRole::Admin).await?;
        let member = self
            .members
            .update_member_role(workspace_id, user_id, role)
            .await?;
        tracing::info!("{user_id} is now {role} in workspace {workspace_id}");
        Ok(member)
    }

    /// Admins remove anyone; any member may remove themselves.
    pub async fn remove_member(
        &self,
        auth: &AuthUser,
        workspace_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        let min = if user_id == auth.user_id {
            WorkspaceRole::Viewer
        } else {
            WorkspaceRole::Admin
        };
        self.authorize(auth, workspace_id, min).await?;
        self.members.remove_member(workspace_id, user_id).await?;
        tracing::info!("{user_id} removed from workspace {workspace_id} by {}", auth.user_id);
        Ok(())
    }
}
