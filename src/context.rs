//! Per-session cache over [`WorkspaceService`].
//!
//! Every mutating call writes through the service first and only touches the
//! cache once the write succeeded, so a failed call leaves the cached view as
//! it was.

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::invitation::{CreateInvitation, Invitation, InvitationStatus};
use crate::models::member::Member;
use crate::models::role::WorkspaceRole;
use crate::models::workspace::{CreateWorkspace, UpdateWorkspace, Workspace};
use crate::service::WorkspaceService;

pub struct WorkspaceContext {
    service: WorkspaceService,
    user: AuthUser,
    workspaces: Vec<Workspace>,
    current: Option<Workspace>,
    /// Invitations addressed to the user, any status.
    received: Vec<Invitation>,
    /// Invitations sent from the current workspace; empty unless the user
    /// administers it.
    sent: Vec<Invitation>,
    members: Vec<Member>,
}

impl WorkspaceContext {
    /// Loads the user's workspaces and received invitations.
    pub async fn load(service: WorkspaceService, user: AuthUser) -> Result<Self, AppError> {
        let workspaces = service.list_workspaces(&user).await?;
        let received = service.list_invitations_for_email(&user, None).await?;
        Ok(Self {
            service,
            user,
            workspaces,
            current: None,
            received,
            sent: Vec::new(),
            members: Vec::new(),
        })
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn current_workspace(&self) -> Option<&Workspace> {
        self.current.as_ref()
    }

    pub fn received_invitations(&self) -> &[Invitation] {
        &self.received
    }

    pub fn pending_invitations(&self) -> impl Iterator<Item = &Invitation> {
        self.received
            .iter()
            .filter(|i| i.status == InvitationStatus::Pending)
    }

    pub fn workspace_invitations(&self) -> &[Invitation] {
        &self.sent
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Sets the selection without fetching anything.
    pub fn set_current_workspace(&mut self, workspace: Option<Workspace>) {
        if self.current.as_ref().map(|w| &w.id) != workspace.as_ref().map(|w| &w.id) {
            self.sent.clear();
            self.members.clear();
        }
        self.current = workspace;
    }

    /// Selects a workspace and loads its members, plus its invitations when
    /// the user is an admin there.
    pub async fn select_workspace(&mut self, workspace_id: &str) -> Result<(), AppError> {
        let (workspace, role) = self.service.role_of(&self.user, workspace_id).await?;
        let members = self.service.list_members(&self.user, workspace_id).await?;
        let sent = if role == WorkspaceRole::Admin {
            self.service
                .list_workspace_invitations(&self.user, workspace_id)
                .await?
        } else {
            Vec::new()
        };

        self.current = Some(workspace);
        self.members = members;
        self.sent = sent;
        Ok(())
    }

    /// Re-reads the workspace list and received invitations.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        let workspaces = self.service.list_workspaces(&self.user).await?;
        let received = self
            .service
            .list_invitations_for_email(&self.user, None)
            .await?;
        self.workspaces = workspaces;
        self.received = received;
        let stale = self
            .current
            .as_ref()
            .is_some_and(|c| !self.workspaces.iter().any(|w| w.id == c.id));
        if stale {
            self.set_current_workspace(None);
        }
        Ok(())
    }

    pub async fn create_workspace(
        &mut self,
        input: &CreateWorkspace,
    ) -> Result<Workspace, AppError> {
        let workspace = self.service.create_workspace(&self.user, input).await?;
        self.workspaces.push(workspace.clone());
        Ok(workspace)
    }

    pub async fn update_workspace(
        &mut self,
        workspace_id: &str,
        input: UpdateWorkspace,
    ) -> Result<Workspace, AppError> {
        let workspace = self
            .service
            .update_workspace(&self.user, workspace_id, input)
            .await?;
        if let Some(cached) = self.workspaces.iter_mut().find(|w| w.id == workspace.id) {
            *cached = workspace.clone();
        }
        if let Some(ref mut current) = self.current {
            if current.id == workspace.id {
                *current = workspace.clone();
            }
        }
        Ok(workspace)
    }

    pub async fn delete_workspace(&mut self, workspace_id: &str) -> Result<(), AppError> {
        self.service
            .delete_workspace(&self.user, workspace_id)
            .await?;
        self.workspaces.retain(|w| w.id != workspace_id);
        if self.current.as_ref().is_some_and(|w| w.id == workspace_id) {
            self.set_current_workspace(None);
        }
        Ok(())
    }

    pub async fn invite_member(
        &mut self,
        workspace_id: &str,
        input: &CreateInvitation,
    ) -> Result<Invitation, AppError> {
        let invitation = self
            .service
            .invite_member(&self.user, workspace_id, input)
            .await?;
        if self.is_current(workspace_id) {
            self.sent.push(invitation.clone());
        }
        Ok(invitation)
    }

    pub async fn revoke_invitation(&mut self, invitation_id: &str) -> Result<(), AppError> {
        self.service
            .revoke_invitation(&self.user, invitation_id)
            .await?;
        self.sent.retain(|i| i.id != invitation_id);
        Ok(())
    }

    /// Accepts and adds the joined workspace to the list.
    pub async fn accept_invitation(&mut self, invitation_id: &str) -> Result<Member, AppError> {
        let (invitation, member) = self
            .service
            .accept_invitation(&self.user, invitation_id)
            .await?;
        self.replace_received(invitation);

        if !self.workspaces.iter().any(|w| w.id == member.workspace_id) {
            let workspace = self
                .service
                .get_workspace(&self.user, &member.workspace_id)
                .await?;
            self.workspaces.push(workspace);
        }
        Ok(member)
    }

    pub async fn decline_invitation(&mut self, invitation_id: &str) -> Result<(), AppError> {
        let invitation = self
            .service
            .decline_invitation(&self.user, invitation_id)
            .await?;
        self.replace_received(invitation);
        Ok(())
    }

    pub async fn update_member_role(
        &mut self,
        workspace_id: &str,
        user_id: &str,
        role: WorkspaceRole,
    ) -> Result<Member, AppError> {
        let member = self
            .service
            .update_member_role(&self.user, workspace_id, user_id, role)
            .await?;
        if let Some(cached) = self
            .members
            .iter_mut()
            .find(|m| m.workspace_id == workspace_id && m.user_id == user_id)
        {
            *cached = member.clone();
        }
        Ok(member)
    }

    /// Removing yourself drops the workspace from the list.
    pub async fn remove_member(&mut self, workspace_id: &str, user_id: &str) -> Result<(), AppError> {
        self.service
            .remove_member(&self.user, workspace_id, user_id)
            .await?;
        self.members
            .retain(|m| !(m.workspace_id == workspace_id && m.user_id == user_id));
        if user_id == self.user.user_id {
            self.workspaces.retain(|w| w.id != workspace_id);
            if self.is_current(workspace_id) {
                self.set_current_workspace(None);
            }
        }
        Ok(())
    }

    fn is_current(&self, workspace_id: &str) -> bool {
        self.current.as_ref().is_some_and(|w| w.id == workspace_id)
    }

    fn replace_received(&mut self, invitation: Invitation) {
        match self.received.iter_mut().find(|i| i.id == invitation.id) {
            Some(cached) => *cached = invitation,
            None => self.received.push(invitation),
        }
    }
}
