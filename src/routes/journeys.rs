use axum::extract::{Path, Query, State};
use axum::Json;

use crate::db;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::journey::{Journey, JourneyFilter, JourneyInput};
use crate::models::role::WorkspaceRole;
use crate::state::AppState;

async fn load_journey(
    state: &AppState,
    auth: &AuthUser,
    journey_id: &str,
    min: WorkspaceRole,
) -> Result<Journey, AppError> {
    let journey = db::journeys::get_journey(&state.db, journey_id).await?;
    state
        .workspaces
        .authorize(auth, &journey.workspace_id, min)
        .await?;
    Ok(journey)
}

/// Normalizes the body and checks that every linked persona lives in
/// `workspace_id`.
async fn prepare_input(
    state: &AppState,
    workspace_id: &str,
    input: JourneyInput,
) -> Result<JourneyInput, AppError> {
    let input = input.normalized().map_err(AppError::BadRequest)?;
    let found =
        db::personas::count_in_workspace(&state.db, workspace_id, &input.persona_ids).await?;
    if found != input.persona_ids.len() {
        return Err(AppError::BadRequest(
            "persona_ids must reference personas of this workspace".to_string(),
        ));
    }
    Ok(input)
}

pub async fn list_journeys(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    auth: AuthUser,
    Query(filter): Query<JourneyFilter>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.workspaces.role_of(&auth, &workspace_id).await?;
    let journeys = db::journeys::list_journeys(&state.db, &workspace_id, &filter).await?;
    Ok(Json(serde_json::json!({ "data": journeys })))
}

pub async fn create_journey(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    auth: AuthUser,
    Json(input): Json<JourneyInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .workspaces
        .authorize(&auth, &workspace_id, WorkspaceRole::Editor)
        .await?;
    let input = prepare_input(&state, &workspace_id, input).await?;
    let journey =
        db::journeys::create_journey(&state.db, &workspace_id, &auth.user_id, &input).await?;
    tracing::debug!("journey {} created in workspace {workspace_id}", journey.id);
    Ok(Json(serde_json::json!({ "data": journey })))
}

pub async fn get_journey(
    State(state): State<AppState>,
    Path(journey_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let journey = load_journey(&state, &auth, &journey_id, WorkspaceRole::Viewer).await?;
    Ok(Json(serde_json::json!({ "data": journey })))
}

pub async fn update_journey(
    State(state): State<AppState>,
    Path(journey_id): Path<String>,
    auth: AuthUser,
    Json(input): Json<JourneyInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    let existing = load_journey(&state, &auth, &journey_id, WorkspaceRole::Editor).await?;
    let input = prepare_input(&state, &existing.workspace_id, input).await?;
    let journey = db::journeys::replace_journey(&state.db, &journey_id, &input).await?;
    Ok(Json(serde_json::json!({ "data": journey })))
}

pub async fn delete_journey(
    State(state): State<AppState>,
    Path(journey_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    load_journey(&state, &auth, &journey_id, WorkspaceRole::Editor).await?;
    db::journeys::delete_journey(&state.db, &journey_id).await?;
    Ok(Json(serde_json::json!({ "data": null })))
}

pub async fn duplicate_journey(
    State(state): State<AppState>,
    Path(journey_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, AppError> {
    let source = load_journey(&state, &auth, &journey_id, WorkspaceRole::Editor).await?;
    let input = source
        .duplicate_input()
        .normalized()
        .map_err(AppError::Internal)?;
    let journey =
        db::journeys::create_journey(&state.db, &source.workspace_id, &auth.user_id, &input)
            .await?;
    Ok(Json(serde_json::json!({ "data": journey })))
}
