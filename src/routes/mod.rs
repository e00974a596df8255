mod auth;
mod health;
mod invitations;
mod journeys;
mod members;
mod personas;
mod users;
mod workspaces;

use axum::http::HeaderValue;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.cors_origin.as_deref());

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Permissive unless a single origin is configured.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::permissive();
    };
    match HeaderValue::from_str(origin) {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!("ignoring invalid CORS origin {origin:?}");
            CorsLayer::permissive()
        }
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/version", get(health::version))
        // Auth (register/login are public, logout requires auth)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Users
        .route(
            "/users/@me",
            get(users::get_current_user).patch(users::update_current_user),
        )
        .route(
            "/users/@me/workspaces",
            get(users::get_current_user_workspaces),
        )
        .route(
            "/users/@me/invitations",
            get(users::get_current_user_invitations),
        )
        // Workspaces
        .route("/workspaces", post(workspaces::create_workspace))
        .route(
            "/workspaces/{workspace_id}",
            get(workspaces::get_workspace)
                .patch(workspaces::update_workspace)
                .delete(workspaces::delete_workspace),
        )
        .route(
            "/workspaces/{workspace_id}/invitations",
            get(workspaces::list_invitations).post(workspaces::create_invitation),
        )
        // Invitations
        .route(
            "/invitations/{invitation_id}",
            get(invitations::get_invitation).delete(invitations::revoke_invitation),
        )
        .route(
            "/invitations/{invitation_id}/accept",
            post(invitations::accept_invitation),
        )
        .route(
            "/invitations/{invitation_id}/decline",
            post(invitations::decline_invitation),
        )
        // Members
        .route(
            "/workspaces/{workspace_id}/members",
            get(members::list_members),
        )
        .route(
            "/workspaces/{workspace_id}/members/{user_id}",
            patch(members::update_member).delete(members::remove_member),
        )
        // Personas
        .route(
            "/workspaces/{workspace_id}/personas",
            get(personas::list_personas).post(personas::create_persona),
        )
        .route(
            "/personas/{persona_id}",
            get(personas::get_persona)
                .put(personas::update_persona)
                .delete(personas::delete_persona),
        )
        .route(
            "/personas/{persona_id}/duplicate",
            post(personas::duplicate_persona),
        )
        // Journeys
        .route(
            "/workspaces/{workspace_id}/journeys",
            get(journeys::list_journeys).post(journeys::create_journey),
        )
        .route(
            "/journeys/{journey_id}",
            get(journeys::get_journey)
                .put(journeys::update_journey)
                .delete(journeys::delete_journey),
        )
        .route(
            "/journeys/{journey_id}/duplicate",
            post(journeys::duplicate_journey),
        )
}
