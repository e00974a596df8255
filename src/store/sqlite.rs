use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::invitation::{Invitation, InvitationStatus, NewInvitation};
use crate::models::member::Member;
use crate::models::role::WorkspaceRole;
use crate::models::workspace::{UpdateWorkspace, Workspace};
use crate::store::{InvitationStore, MemberStore, WorkspaceStore};

/// Store backed by the sqlx pool; every call delegates to `crate::db`.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkspaceStore for SqliteStore {
    async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, AppError> {
        db::workspaces::get_workspace(&self.pool, workspace_id).await
    }

    async fn list_workspaces_for_user(&self, user_id: &str) -> Result<Vec<Workspace>, AppError> {
        db::workspaces::list_workspaces_for_user(&self.pool, user_id).await
    }

    async fn create_workspace(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Workspace, AppError> {
        db::workspaces::create_workspace(&self.pool, owner_id, name, description).await
    }

    async fn update_workspace(
        &self,
        workspace_id: &str,
        input: &UpdateWorkspace,
    ) -> Result<Workspace, AppError> {
        db::workspaces::update_workspace(&self.pool, workspace_id, input).await
    }

    async fn delete_workspace(&self, workspace_id: &str) -> Result<(), AppError> {
        db::workspaces::delete_workspace(&self.pool, workspace_id).await
    }
}

#[async_trait]
impl InvitationStore for SqliteStore {
    async fn get_invitation(&self, invitation_id: &str) -> Result<Invitation, AppError> {
        db::invitations::get_invitation(&self.pool, invitation_id).await
    }

    async fn list_workspace_invitations(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<Invitation>, AppError> {
        db::invitations::list_workspace_invitations(&self.pool, workspace_id).await
    }

    async fn list_invitations_for_email(
        &self,
        email: &str,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>, AppError> {
        db::invitations::list_invitations_for_email(&self.pool, email, status).await
    }

    async fn create_invitation(&self, input: &NewInvitation) -> Result<Invitation, AppError> {
        db::invitations::create_invitation(&self.pool, input).await
    }

    async fn transition_invitation(
        &self,
        invitation_id: &str,
        next: InvitationStatus,
    ) -> Result<Invitation, AppError> {
        db::invitations::transition_invitation(&self.pool, invitation_id, next).await
    }

    async fn accept_invitation(
        &self,
        invitation_id: &str,
        user_id: &str,
    ) -> Result<(Invitation, Member), AppError> {
        db::invitations::accept_invitation(&self.pool, invitation_id, user_id).await
    }

    async fn delete_invitation(&self, invitation_id: &str) -> Result<(), AppError> {
        db::invitations::delete_invitation(&self.pool, invitation_id).await
    }
}

#[async_trait]
impl MemberStore for SqliteStore {
    async fn get_member(&self, workspace_id: &str, user_id: &str) -> Result<Member, AppError> {
        db::members::get_member(&self.pool, workspace_id, user_id).await
    }

    async fn list_members(&self, workspace_id: &str) -> Result<Vec<Member>, AppError> {
        db::members::list_members(&self.pool, workspace_id).await
    }

    async fn update_member_role(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<Member, AppError> {
        db::members::update_member_role(&self.pool, workspace_id, user_id, role).await
    }

    async fn remove_member(&self, workspace_id: &str, user_id: &str) -> Result<(), AppError> {
        db::members::remove_member(&self.pool, workspace_id, user_id).await
    }
}
