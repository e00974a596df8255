use serde::{Deserialize, Serialize};

use super::role::WorkspaceRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub workspace_id: String,
    pub user_id: String,
    pub role: WorkspaceRole,
    pub joined_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMember {
    pub role: WorkspaceRole,
}
