use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::db::{new_id, timestamp};
use crate::error::AppError;
use crate::models::invitation::{Invitation, InvitationStatus, NewInvitation};
use crate::models::member::Member;
use crate::models::role::WorkspaceRole;
use crate::models::workspace::{UpdateWorkspace, Workspace};
use crate::store::{InvitationStore, MemberStore, WorkspaceStore};

#[derive(Default)]
struct Inner {
    workspaces: Vec<Workspace>,
    invitations: Vec<Invitation>,
    members: Vec<Member>,
}

impl Inner {
    fn member_index(&self, workspace_id: &str, user_id: &str) -> Option<usize> {
        self.members
            .iter()
            .position(|m| m.workspace_id == workspace_id && m.user_id == user_id)
    }

    fn insert_member(
        &mut self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<Member, AppError> {
        if self.member_index(workspace_id, user_id).is_some() {
            return Err(AppError::Conflict(
                "already a member of this workspace".to_string(),
            ));
        }
        let now = timestamp();
        let member = Member {
            workspace_id: workspace_id.to_string(),
            user_id: user_id.to_string(),
            role,
            joined_at: now.clone(),
            updated_at: now,
        };
        self.members.push(member.clone());
        Ok(member)
    }

    fn invitation_index(&self, invitation_id: &str) -> Result<usize, AppError> {
        self.invitations
            .iter()
            .position(|i| i.id == invitation_id)
            .ok_or_else(|| AppError::NotFound("invitation not found".to_string()))
    }
}

/// In-process store. All three collections share one lock, so every
/// operation (including accept) is atomic with respect to the others.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a membership directly, bypassing invitations.
    #[cfg(test)]
    pub(crate) async fn add_member(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<Member, AppError> {
        self.inner
            .write()
            .await
            .insert_member(workspace_id, user_id, role)
    }
}

#[async_trait]
impl WorkspaceStore for MemoryStore {
    async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace, AppError> {
        let inner = self.inner.read().await;
        inner
            .workspaces
            .iter()
            .find(|w| w.id == workspace_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("workspace not found".to_string()))
    }

    async fn list_workspaces_for_user(&self, user_id: &str) -> Result<Vec<Workspace>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .workspaces
            .iter()
            .filter(|w| {
                w.owner_id == user_id || inner.member_index(&w.id, user_id).is_some()
            })
            .cloned()
            .collect())
    }

    async fn create_workspace(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Workspace, AppError> {
        let now = timestamp();
        let workspace = Workspace {
            id: new_id(),
            name: name.to_string(),
            description: description.to_string(),
            owner_id: owner_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.inner.write().await.workspaces.push(workspace.clone());
        Ok(workspace)
    }

    async fn update_workspace(
        &self,
        workspace_id: &str,
        input: &UpdateWorkspace,
    ) -> Result<Workspace, AppError> {
        let mut inner = self.inner.write().await;
        let workspace = inner
            .workspaces
            .iter_mut()
            .find(|w| w.id == workspace_id)
            .ok_or_else(|| AppError::NotFound("workspace not found".to_string()))?;

        if input.is_empty() {
            return Ok(workspace.clone());
        }
        if let Some(ref name) = input.name {
            workspace.name = name.clone();
        }
        if let Some(ref description) = input.description {
            workspace.description = description.clone();
        }
        workspace.updated_at = timestamp();
        Ok(workspace.clone())
    }

    async fn delete_workspace(&self, workspace_id: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let before = inner.workspaces.len();
        inner.workspaces.retain(|w| w.id != workspace_id);
        if inner.workspaces.len() == before {
            return Err(AppError::NotFound("workspace not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl InvitationStore for MemoryStore {
    async fn get_invitation(&self, invitation_id: &str) -> Result<Invitation, AppError> {
        let inner = self.inner.read().await;
        let idx = inner.invitation_index(invitation_id)?;
        Ok(inner.invitations[idx].clone())
    }

    async fn list_workspace_invitations(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<Invitation>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .invitations
            .iter()
            .filter(|i| i.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn list_invitations_for_email(
        &self,
        email: &str,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .invitations
            .iter()
            .filter(|i| i.email == email && status.map_or(true, |s| i.status == s))
            .cloned()
            .collect())
    }

    async fn create_invitation(&self, input: &NewInvitation) -> Result<Invitation, AppError> {
        let mut inner = self.inner.write().await;
        let duplicate = inner.invitations.iter().any(|i| {
            i.workspace_id == input.workspace_id
                && i.email == input.email
                && i.status == InvitationStatus::Pending
        });
        if duplicate {
            return Err(AppError::Conflict(
                "a pending invitation already exists for this email".to_string(),
            ));
        }

        let now = timestamp();
        let invitation = Invitation {
            id: new_id(),
            workspace_id: input.workspace_id.clone(),
            email: input.email.clone(),
            role: input.role,
            status: InvitationStatus::Pending,
            invited_by: input.invited_by.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        inner.invitations.push(invitation.clone());
        Ok(invitation)
    }

    async fn transition_invitation(
        &self,
        invitation_id: &str,
        next: InvitationStatus,
    ) -> Result<Invitation, AppError> {
        let mut inner = self.inner.write().await;
        let idx = inner.invitation_index(invitation_id)?;
        let invitation = &mut inner.invitations[idx];
        if !invitation.status.can_transition_to(next) {
            return Err(AppError::InvalidState(format!(
                "invitation is {} and cannot become {next}",
                invitation.status
            )));
        }
        invitation.status = next;
        invitation.updated_at = timestamp();
        Ok(invitation.clone())
    }

    async fn accept_invitation(
        &self,
        invitation_id: &str,
        user_id: &str,
    ) -> Result<(Invitation, Member), AppError> {
        let mut inner = self.inner.write().await;
        let idx = inner.invitation_index(invitation_id)?;

        // Every check runs before the first mutation.
        let (workspace_id, role, status) = {
            let inv = &inner.invitations[idx];
            (inv.workspace_id.clone(), inv.role, inv.status)
        };
        if !status.can_transition_to(InvitationStatus::Accepted) {
            return Err(AppError::InvalidState(format!(
                "invitation is {status} and cannot be accepted"
            )));
        }
        if !inner.workspaces.iter().any(|w| w.id == workspace_id) {
            return Err(AppError::NotFound("workspace not found".to_string()));
        }

        let member = inner.insert_member(&workspace_id, user_id, role)?;
        let invitation = &mut inner.invitations[idx];
        invitation.status = InvitationStatus::Accepted;
        invitation.updated_at = member.joined_at.clone();
        Ok((invitation.clone(), member))
    }

    async fn delete_invitation(&self, invitation_id: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let idx = inner.invitation_index(invitation_id)?;
        let status = inner.invitations[idx].status;
        if status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "invitation is {status} and can no longer be revoked"
            )));
        }
        inner.invitations.remove(idx);
        Ok(())
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn get_member(&self, workspace_id: &str, user_id: &str) -> Result<Member, AppError> {
        let inner = self.inner.read().await;
        inner
            .member_index(workspace_id, user_id)
            .map(|idx| inner.members[idx].clone())
            .ok_or_else(|| AppError::NotFound("member not found".to_string()))
    }

    async fn list_members(&self, workspace_id: &str) -> Result<Vec<Member>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .iter()
            .filter(|m| m.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn update_member_role(
        &self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<Member, AppError> {
        let mut inner = self.inner.write().await;
        let idx = inner
            .member_index(workspace_id, user_id)
            .ok_or_else(|| AppError::NotFound("member not found".to_string()))?;
        let member = &mut inner.members[idx];
        member.role = role;
        member.updated_at = timestamp();
        Ok(member.clone())
    }

    async fn remove_member(&self, workspace_id: &str, user_id: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let idx = inner
            .member_index(workspace_id, user_id)
            .ok_or_else(|| AppError::NotFound("member not found".to_string()))?;
        inner.members.remove(idx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invite(workspace_id: &str, email: &str) -> NewInvitation {
        NewInvitation {
            workspace_id: workspace_id.to_string(),
            email: email.to_string(),
            role: WorkspaceRole::Editor,
            invited_by: "owner".to_string(),
        }
    }

    #[tokio::test]
    async fn test_second_pending_invitation_is_rejected() {
        let store = MemoryStore::new();
        store.create_invitation(&invite("w1", "a@x.com")).await.unwrap();
        let err = store
            .create_invitation(&invite("w1", "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Same email in another workspace is fine.
        store.create_invitation(&invite("w2", "a@x.com")).await.unwrap();
        let all = store.list_invitations_for_email("a@x.com", None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_accept_conflict_leaves_invitation_pending() {
        let store = MemoryStore::new();
        let ws = store.create_workspace("owner", "W", "").await.unwrap();
        store
            .add_member(&ws.id, "u1", WorkspaceRole::Viewer)
            .await
            .unwrap();
        let inv = store.create_invitation(&invite(&ws.id, "a@x.com")).await.unwrap();

        let err = store.accept_invitation(&inv.id, "u1").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let after = store.get_invitation(&inv.id).await.unwrap();
        assert_eq!(after.status, InvitationStatus::Pending);
        let member = store.get_member(&ws.id, "u1").await.unwrap();
        assert_eq!(member.role, WorkspaceRole::Viewer);
    }

    #[tokio::test]
    async fn test_accept_into_deleted_workspace_changes_nothing() {
        let store = MemoryStore::new();
        let ws = store.create_workspace("owner", "W", "").await.unwrap();
        let inv = store.create_invitation(&invite(&ws.id, "a@x.com")).await.unwrap();
        store.delete_workspace(&ws.id).await.unwrap();

        let err = store.accept_invitation(&inv.id, "u1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(
            store.get_invitation(&inv.id).await.unwrap().status,
            InvitationStatus::Pending
        );
        assert!(store.list_members(&ws.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_invitation_cannot_be_revoked() {
        let store = MemoryStore::new();
        let inv = store.create_invitation(&invite("w1", "a@x.com")).await.unwrap();
        store
            .transition_invitation(&inv.id, InvitationStatus::Declined)
            .await
            .unwrap();
        let err = store.delete_invitation(&inv.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_member_operations_on_missing_member_fail() {
        let store = MemoryStore::new();
        assert!(matches!(
            store
                .update_member_role("w1", "nobody", WorkspaceRole::Admin)
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.remove_member("w1", "nobody").await,
            Err(AppError::NotFound(_))
        ));
    }
}
