//! Storage seams for the workspace membership records.
//!
//! Each entity sits behind its own trait so the service can run against
//! SQLite in production and an in-memory store in tests:
//!
//! ```text
//! WorkspaceService
//!       |
//!       +---> WorkspaceStore / InvitationStore / MemberStore (traits)
//!                   |
//!                   +---> SqliteStore  (sqlx pool)
//!                   +---> MemoryStore  (single RwLock)
//! ```
//!
//! Implementations must uphold the same invariants: one pending invitation per
//! (workspace, email), one membership per (workspace, user), invitation
//! status changes only out of `pending`, and `accept_invitation` applying the
//! status change and the membership insert atomically.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::invitation::{Invitation, InvitationStatus, NewInvitation};
use crate::models::member::Member;
use crate::models::role::WorkspaceRole;
use crate::models::workspace::{UpdateWorkspace, Workspace};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, AppError>;

    /// Workspaces owned by the user or joined through a membership.
    async fn list_workspaces_for_user(&self, user_id: &str) -> Result<Vec<Workspace>, AppError>;

    async fn create_workspace(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Workspace, AppError>;

    async fn update_workspace(
        &self,
        workspace_id: &str,
        input: &UpdateWorkspace,
    ) -> Result<Workspace, AppError>;

    async fn delete_workspace(&self, workspace_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait InvitationStore: Send + Sync {
    async fn get_invitation(&self, invitation_id: &str) -> Result<Invitation, AppError>;

    async fn list_workspace_invitations(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<Invitation>, AppError>;

    async fn list_invitations_for_email(
        &self,
        email: &str,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>, AppError>;

    /// Fails with `Conflict` if a pending invitation for the same
    /// (workspace, email) already exists.
    async fn create_invitation(&self, input: &NewInvitation) -> Result<Invitation, AppError>;

    /// Compare-and-set out of `pending`. Fails with `InvalidState` otherwise.
    async fn transition_invitation(
        &self,
        invitation_id: &str,
        next: InvitationStatus,
    ) -> Result<Invitation, AppError>;

    /// Marks the invitation accepted and creates the membership for
    /// `user_id` as one atomic step. Fails with `NotFound` if the workspace
    /// is gone and `Conflict` if the user is already a member.
    async fn accept_invitation(
        &self,
        invitation_id: &str,
        user_id: &str,
    ) -> Result<(Invitation, Member), AppError>;

    /// Deletes a pending invitation (revocation).
    async fn delete_invitation(&self, invitation_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn get_member(&self, workspace_id: &str, user_id: &str) -> Result<Member, AppError>;

    async fn list_members(&self, workspace_id: &str) -> Result<Vec<Member>, AppError>;

    async fn update_member_role(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<Member, AppError>;

    async fn remove_member(&self, workspace_id: &str, user_id: &str) -> Result<(), AppError>;
}
