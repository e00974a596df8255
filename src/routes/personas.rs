use axum::extract::{Path, State};
use axum::Json;

use crate::db;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::persona::{Persona, PersonaInput};
use crate::models::role::WorkspaceRole;
use crate::state::AppState;

/// Loads the persona and checks the caller's role in its workspace.
async fn load_persona(
    state: &AppState,
    auth: &AuthUser,
    persona_id: &str,
    min: WorkspaceRole,
) -> Result<Persona, AppError> {
    let persona = db::personas::get_persona(&state.db, persona_id).await?;
    state
        .workspaces
        .authorize(auth, &persona.workspace_id, min)
        .await?;
    Ok(persona)
}

pub async fn list_personas(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    state.workspaces.role_of(&auth, &workspace_id).await?;
    let personas = db::personas::list_personas(&state.db, &workspace_id).await?;
    Ok(Json(serde_json::json!({ "data": personas })))
}

pub async fn create_persona(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    auth: AuthUser,
    Json(input): Json<PersonaInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .workspaces
        .authorize(&auth, &workspace_id, WorkspaceRole::Editor)
        .await?;
    let input = input.normalized().map_err(AppError::BadRequest)?;
    let persona =
        db::personas::create_persona(&state.db, &workspace_id, &auth.user_id, &input).await?;
    tracing::debug!("persona {} created in workspace {workspace_id}", persona.id);
    Ok(Json(serde_json::json!({ "data": persona })))
}

pub async fn get_persona(
    State(state): State<AppState>,
    Path(persona_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let persona = load_persona(&state, &auth, &persona_id, WorkspaceRole::Viewer).await?;
    Ok(Json(serde_json::json!({ "data": persona })))
}

pub async fn update_persona(
    State(state): State<AppState>,
    Path(persona_id): Path<String>,
    auth: AuthUser,
    Json(input): Json<PersonaInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    load_persona(&state, &auth, &persona_id, WorkspaceRole::Editor).await?;
    let input = input.normalized().map_err(AppError::BadRequest)?;
    let persona = db::personas::replace_persona(&state.db, &persona_id, &input).await?;
    Ok(Json(serde_json::json!({ "data": persona })))
}

/// Deleting a persona also unlinks it from the workspace's journeys.
pub async fn delete_persona(
    State(state): State<AppState>,
    Path(persona_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let persona = load_persona(&state, &auth, &persona_id, WorkspaceRole::Editor).await?;
    let unlinked =
        db::personas::delete_persona(&state.db, &persona.workspace_id, &persona_id).await?;
    if unlinked > 0 {
        tracing::debug!("persona {persona_id} unlinked from {unlinked} journey(s)");
    }
    Ok(Json(serde_json::json!({ "data": null })))
}

pub async fn duplicate_persona(
    State(state): State<AppState>,
    Path(persona_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let source = load_persona(&state, &auth, &persona_id, WorkspaceRole::Editor).await?;
    let input = source.duplicate_input();
    let persona =
        db::personas::create_persona(&state.db, &source.workspace_id, &auth.user_id, &input)
            .await?;
    Ok(Json(serde_json::json!({ "data": persona })))
}
