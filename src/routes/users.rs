use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db;
use crate::error::AppError;
use crate::middleware::auth::{hash_password, verify_password, AuthUser};
use crate::models::invitation::InvitationStatus;
use crate::models::user::UpdateUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InvitationsQuery {
    pub status: Option<InvitationStatus>,
}

pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = db::users::get_user(&state.db, &auth.user_id).await?;
    Ok(Json(serde_json::json!({ "data": user })))
}

/// Profile update. Changing email or password needs `current_password`
/// unless the account has no password yet.
pub async fn update_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let input = input.normalized().map_err(AppError::BadRequest)?;

    if input.changes_credentials() {
        if let Some(stored) = db::users::get_password_hash(&state.db, &auth.user_id).await? {
            let current = input.current_password.as_deref().ok_or_else(|| {
                AppError::BadRequest(
                    "current_password is required to change email or password".to_string(),
                )
            })?;
            if !verify_password(current, &stored)? {
                return Err(AppError::Forbidden(
                    "current password is incorrect".to_string(),
                ));
            }
        }
    }

    let password_hash = input.password.as_deref().map(hash_password).transpose()?;
    let user =
        db::users::update_user(&state.db, &auth.user_id, &input, password_hash.as_deref()).await?;
    tracing::info!("user {} updated their profile", auth.user_id);

    Ok(Json(serde_json::json!({ "data": user })))
}

pub async fn get_current_user_workspaces(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let workspaces = state.workspaces.list_workspaces(&auth).await?;
    Ok(Json(serde_json::json!({ "data": workspaces })))
}

pub async fn get_current_user_invitations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<InvitationsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let invitations = state
        .workspaces
        .list_invitations_for_email(&auth, params.status)
        .await?;
    Ok(Json(serde_json::json!({ "data": invitations })))
}
