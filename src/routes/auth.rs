use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db;
use crate::error::AppError;
use crate::middleware::auth::{bearer_token, hash_password, verify_password, AuthUser};
use crate::models::invitation::{normalize_email, validate_email};
use crate::models::user::{validate_password, CreateUser, MAX_DISPLAY_NAME_LEN};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let email = normalize_email(&input.email);
    validate_email(&email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    validate_password(&input.password).map_err(AppError::BadRequest)?;

    let display_name = input
        .display_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    if display_name
        .as_ref()
        .is_some_and(|name| name.chars().count() > MAX_DISPLAY_NAME_LEN)
    {
        return Err(AppError::BadRequest(format!(
            "display_name must be at most {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }

    let password_hash = hash_password(&input.password)?;
    let user = db::users::create_user(
        &state.db,
        &CreateUser {
            email,
            display_name,
        },
        Some(&password_hash),
    )
    .await?;

    let token = db::tokens::issue_token(&state.db, &user.id, state.token_ttl_days).await?;
    tracing::info!("registered user {}", user.id);

    Ok(Json(serde_json::json!({
        "data": {
            "user": user,
            "token": token
        }
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (user_id, stored_hash) = db::users::get_credentials(&state.db, &input.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))?;

    if !verify_password(&input.password, &stored_hash)? {
        return Err(AppError::Unauthorized("invalid credentials".to_string()));
    }

    let user = db::users::get_user(&state.db, &user_id).await?;
    let token = db::tokens::issue_token(&state.db, &user_id, state.token_ttl_days).await?;

    Ok(Json(serde_json::json!({
        "data": {
            "user": user,
            "token": token
        }
    })))
}

/// Revokes only the token used for this request.
pub async fn logout(
    State(state): State<AppState>,
    _auth: AuthUser,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    if let Some(token) = bearer_token(&headers) {
        db::tokens::revoke_token(&state.db, &token).await?;
    }

    Ok(Json(serde_json::json!({
        "data": { "ok": true }
    })))
}
