use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::invitation::CreateInvitation;
use crate::models::workspace::{CreateWorkspace, UpdateWorkspace};
use crate::state::AppState;

pub async fn create_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateWorkspace>,
) -> Result<Json<serde_json::Value>, AppError> {
    let workspace = state.workspaces.create_workspace(&auth, &input).await?;
    Ok(Json(serde_json::json!({ "data": workspace })))
}

pub async fn get_workspace(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let (workspace, role) = state.workspaces.role_of(&auth, &workspace_id).await?;
    Ok(Json(serde_json::json!({
        "data": {
            "workspace": workspace,
            "role": role
        }
    })))
}

pub async fn update_workspace(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    auth: AuthUser,
    Json(input): Json<UpdateWorkspace>,
) -> Result<Json<serde_json::Value>, AppError> {
    let workspace = state
        .workspaces
        .update_workspace(&auth, &workspace_id, input)
        .await?;
    Ok(Json(serde_json::json!({ "data": workspace })))
}

pub async fn delete_workspace(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    state.workspaces.delete_workspace(&auth, &workspace_id).await?;
    Ok(Json(serde_json::json!({ "data": null })))
}

pub async fn list_invitations(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let invitations = state
        .workspaces
        .list_workspace_invitations(&auth, &workspace_id)
        .await?;
    Ok(Json(serde_json::json!({ "data": invitations })))
}

pub async fn create_invitation(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    auth: AuthUser,
    Json(input): Json<CreateInvitation>,
) -> Result<Json<serde_json::Value>, AppError> {
    let invitation = state
        .workspaces
        .invite_member(&auth, &workspace_id, &input)
        .await?;
    Ok(Json(serde_json::json!({ "data": invitation })))
}
