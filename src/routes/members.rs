use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::member::UpdateMember;
use crate::state::AppState;

pub async fn list_members(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let members = state.workspaces.list_members(&auth, &workspace_id).await?;
    Ok(Json(serde_json::json!({ "data": members })))
}

pub async fn update_member(
    State(state): State<AppState>,
    Path((workspace_id, user_id)): Path<(String, String)>,
    auth: AuthUser,
    Json(input): Json<UpdateMember>,
) -> Result<Json<serde_json::Value>, AppError> {
    let member = state
        .workspaces
        .update_member_role(&auth, &workspace_id, &user_id, input.role)
        .await?;
    Ok(Json(serde_json::json!({ "data": member })))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Path((workspace_id, user_id)): Path<(String, String)>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .workspaces
        .remove_member(&auth, &workspace_id, &user_id)
        .await?;
    Ok(Json(serde_json::json!({ "data": null })))
}
