use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub async fn get_invitation(
    State(state): State<AppState>,
    Path(invitation_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let invitation = state.workspaces.get_invitation(&auth, &invitation_id).await?;
    Ok(Json(serde_json::json!({ "data": invitation })))
}

pub async fn revoke_invitation(
    State(state): State<AppState>,
    Path(invitation_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .workspaces
        .revoke_invitation(&auth, &invitation_id)
        .await?;
    Ok(Json(serde_json::json!({ "data": null })))
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    Path(invitation_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let (invitation, member) = state
        .workspaces
        .accept_invitation(&auth, &invitation_id)
        .await?;
    Ok(Json(serde_json::json!({
        "data": {
            "invitation": invitation,
            "member": member
        }
    })))
}

pub async fn decline_invitation(
    State(state): State<AppState>,
    Path(invitation_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let invitation = state
        .workspaces
        .decline_invitation(&auth, &invitation_id)
        .await?;
    Ok(Json(serde_json::json!({ "data": invitation })))
}
