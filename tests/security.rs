mod common;

use axum::body::Body;
use http::{Method, Request, StatusCode};
use personaserver::models::role::WorkspaceRole;
use serde_json::json;

use common::{authenticated_request, TestServer};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let server = TestServer::new().await;
    let (status, body) = server
        .send(
            Request::builder()
                .uri("/api/v1/users/@me/workspaces")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_unknown_and_malformed_tokens_are_rejected() {
    let server = TestServer::new().await;
    for header in ["Bearer not-a-real-token", "Basic abc", "Bearer ", "Bot abc"] {
        let (status, _) = server
            .send(authenticated_request(Method::GET, "/api/v1/users/@me", header))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
    }
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let server = TestServer::new().await;
    let user = server.create_user_with_token("a@x.com").await;
    let expired = server.create_expired_token(&user).await;

    let (status, _) = server
        .send(authenticated_request(
            Method::GET,
            "/api/v1/users/@me",
            &format!("Bearer {expired}"),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Workspace access
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_non_member_is_forbidden() {
    let server = TestServer::new().await;
    let owner = server.create_user_with_token("owner@x.com").await;
    let stranger = server.create_user_with_token("s@x.com").await;
    let ws = server.create_workspace(&owner, "W").await;

    for uri in [
        format!("/api/v1/workspaces/{ws}"),
        format!("/api/v1/workspaces/{ws}/members"),
        format!("/api/v1/workspaces/{ws}/invitations"),
        format!("/api/v1/workspaces/{ws}/personas"),
        format!("/api/v1/workspaces/{ws}/journeys"),
    ] {
        let (status, body) = server.get(&stranger, &uri).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"]["code"], "forbidden");
    }

    let (status, _) = server
        .post(
            &stranger,
            &format!("/api/v1/workspaces/{ws}/invitations"),
            &json!({ "email": "s@x.com", "role": "admin" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_viewer_can_read_but_not_write() {
    let server = TestServer::new().await;
    let owner = server.create_user_with_token("owner@x.com").await;
    let viewer = server.create_user_with_token("v@x.com").await;
    let ws = server.create_workspace(&owner, "W").await;
    server.add_member(&ws, &viewer, WorkspaceRole::Viewer).await;

    let (_, body) = server
        .post(
            &owner,
            &format!("/api/v1/workspaces/{ws}/personas"),
            &json!({ "name": "Dana" }),
        )
        .await;
    let persona = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = server.get(&viewer, &format!("/api/v1/personas/{persona}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = server.get(&viewer, &format!("/api/v1/workspaces/{ws}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "viewer");

    let (status, _) = server
        .post(
            &viewer,
            &format!("/api/v1/workspaces/{ws}/personas"),
            &json!({ "name": "Eve" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server
        .put(&viewer, &format!("/api/v1/personas/{persona}"), &json!({ "name": "Eve" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.delete(&viewer, &format!("/api/v1/personas/{persona}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server
        .post(
            &viewer,
            &format!("/api/v1/workspaces/{ws}/journeys"),
            &json!({ "name": "Onboarding" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_editor_cannot_administer() {
    let server = TestServer::new().await;
    let owner = server.create_user_with_token("owner@x.com").await;
    let editor = server.create_user_with_token("e@x.com").await;
    let viewer = server.create_user_with_token("v@x.com").await;
    let ws = server.create_workspace(&owner, "W").await;
    server.add_member(&ws, &editor, WorkspaceRole::Editor).await;
    server.add_member(&ws, &viewer, WorkspaceRole::Viewer).await;

    let (status, _) = server
        .patch(&editor, &format!("/api/v1/workspaces/{ws}"), &json!({ "name": "Mine" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .patch(
            &editor,
            &format!("/api/v1/workspaces/{ws}/members/{}", viewer.id()),
            &json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .delete(&editor, &format!("/api/v1/workspaces/{ws}/members/{}", viewer.id()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server
        .post(
            &editor,
            &format!("/api/v1/workspaces/{ws}/invitations"),
            &json!({ "email": "z@x.com", "role": "viewer" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Editors still write content.
    let (status, _) = server
        .post(
            &editor,
            &format!("/api/v1/workspaces/{ws}/personas"),
            &json!({ "name": "Dana" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_only_owner_deletes_workspace() {
    let server = TestServer::new().await;
    let owner = server.create_user_with_token("owner@x.com").await;
    let admin = server.create_user_with_token("admin@x.com").await;
    let ws = server.create_workspace(&owner, "W").await;
    server.add_member(&ws, &admin, WorkspaceRole::Admin).await;

    let (status, _) = server.delete(&admin, &format!("/api/v1/workspaces/{ws}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins can still do admin things.
    let (status, _) = server
        .patch(&admin, &format!("/api/v1/workspaces/{ws}"), &json!({ "description": "ok" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_only_invitee_can_respond() {
    let server = TestServer::new().await;
    let owner = server.create_user_with_token("owner@x.com").await;
    let intruder = server.create_user_with_token("b@x.com").await;
    let ws = server.create_workspace(&owner, "W").await;

    let (_, body) = server
        .post(
            &owner,
            &format!("/api/v1/workspaces/{ws}/invitations"),
            &json!({ "email": "a@x.com", "role": "admin" }),
        )
        .await;
    let inv = body["data"]["id"].as_str().unwrap().to_string();

    for action in ["accept", "decline"] {
        let (status, _) = server
            .post(&intruder, &format!("/api/v1/invitations/{inv}/{action}"), &json!({}))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
    let (status, _) = server.get(&intruder, &format!("/api/v1/invitations/{inv}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server.delete(&intruder, &format!("/api/v1/invitations/{inv}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner cannot accept on the invitee's behalf either.
    let (status, _) = server
        .post(&owner, &format!("/api/v1/invitations/{inv}/accept"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = server.get(&owner, &format!("/api/v1/invitations/{inv}")).await;
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn test_owner_cannot_invite_themselves() {
    let server = TestServer::new().await;
    let owner = server.create_user_with_token("owner@x.com").await;
    let ws = server.create_workspace(&owner, "W").await;

    let (status, _) = server
        .post(
            &owner,
            &format!("/api/v1/workspaces/{ws}/invitations"),
            &json!({ "email": "OWNER@x.com", "role": "viewer" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_authorization_runs_before_validation() {
    let server = TestServer::new().await;
    let owner = server.create_user_with_token("owner@x.com").await;
    let stranger = server.create_user_with_token("s@x.com").await;
    let viewer = server.create_user_with_token("v@x.com").await;
    let ws = server.create_workspace(&owner, "W").await;
    server.add_member(&ws, &viewer, WorkspaceRole::Viewer).await;

    let (_, body) = server
        .post(&owner, &format!("/api/v1/workspaces/{ws}/personas"), &json!({ "name": "Dana" }))
        .await;
    let persona = body["data"]["id"].as_str().unwrap().to_string();

    // Every body below is invalid; callers without the role still get 403.
    for user in [&stranger, &viewer] {
        let (status, _) = server
            .patch(user, &format!("/api/v1/workspaces/{ws}"), &json!({ "name": "" }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = server
            .post(
                user,
                &format!("/api/v1/workspaces/{ws}/invitations"),
                &json!({ "email": "not-an-email", "role": "viewer" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = server
            .post(user, &format!("/api/v1/workspaces/{ws}/personas"), &json!({ "name": "" }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = server
            .put(user, &format!("/api/v1/personas/{persona}"), &json!({ "name": "" }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    // The owner sees the validation error.
    let (status, _) = server
        .patch(&owner, &format!("/api/v1/workspaces/{ws}"), &json!({ "name": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
