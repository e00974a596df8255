#![allow(dead_code)]

use axum::body::Body;
use http::{Method, Request};
use personaserver::db;
use personaserver::middleware::auth::{create_token_hash, generate_token};
use personaserver::models::role::WorkspaceRole;
use personaserver::models::user::{CreateUser, User};
use personaserver::routes;
use personaserver::state::AppState;
use sqlx::SqlitePool;
use tower::ServiceExt;

/// A user created for testing, bundling the User record with its raw token.
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    /// Returns the Authorization header value (`"Bearer xxx"`).
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn id(&self) -> &str {
        &self.user.id
    }
}

/// Test server that owns an in-memory SQLite pool and full AppState.
/// Each instance is isolated, so tests can run in parallel.
pub struct TestServer {
    pub state: AppState,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_cors(None).await
    }

    pub async fn with_cors(cors_origin: Option<&str>) -> Self {
        Self::build("sqlite::memory:", cors_origin).await
    }

    /// A server on a file-backed database, for tests that need several
    /// connections writing at once.
    pub async fn with_database(database_url: &str) -> Self {
        Self::build(database_url, None).await
    }

    async fn build(database_url: &str, cors_origin: Option<&str>) -> Self {
        let pool = db::create_pool(database_url)
            .await
            .expect("failed to create test pool");
        let state = AppState::new(pool, 30, cors_origin.map(str::to_string));
        Self { state }
    }

    /// Returns an Axum Router wired to this server's state for `oneshot()` calls.
    pub fn router(&self) -> axum::Router {
        routes::router(self.state.clone())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.state.db
    }

    /// Create a password-less user and a bearer token with far-future expiry.
    pub async fn create_user_with_token(&self, email: &str) -> TestUser {
        let user = db::users::create_user(
            self.pool(),
            &CreateUser {
                email: email.to_string(),
                display_name: None,
            },
            None,
        )
        .await
        .expect("failed to create test user");

        let token = generate_token();
        sqlx::query(
            "INSERT INTO user_tokens (token_hash, user_id, expires_at) VALUES (?, ?, '2099-12-31T23:59:59')",
        )
        .bind(create_token_hash(&token))
        .bind(&user.id)
        .execute(self.pool())
        .await
        .expect("failed to insert test token");

        TestUser { user, token }
    }

    /// Insert a token that expired yesterday.
    pub async fn create_expired_token(&self, user: &TestUser) -> String {
        let token = generate_token();
        let expires_at = (chrono::Utc::now() - chrono::Duration::days(1))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        sqlx::query("INSERT INTO user_tokens (token_hash, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(create_token_hash(&token))
            .bind(&user.user.id)
            .bind(&expires_at)
            .execute(self.pool())
            .await
            .expect("failed to insert expired token");
        token
    }

    /// Create a workspace owned by `owner` directly in the database.
    pub async fn create_workspace(&self, owner: &TestUser, name: &str) -> String {
        db::workspaces::create_workspace(self.pool(), owner.id(), name, "")
            .await
            .expect("failed to create test workspace")
            .id
    }

    pub async fn add_member(&self, workspace_id: &str, user: &TestUser, role: WorkspaceRole) {
        db::members::add_member(self.pool(), workspace_id, user.id(), role)
            .await
            .expect("failed to add test member");
    }

    /// Send a request through a fresh router and return `(status, json body)`.
    /// The body is `Value::Null` when it is not JSON.
    pub async fn send(&self, request: Request<Body>) -> (http::StatusCode, serde_json::Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    pub async fn get(&self, user: &TestUser, uri: &str) -> (http::StatusCode, serde_json::Value) {
        self.send(authenticated_request(Method::GET, uri, &user.auth_header()))
            .await
    }

    pub async fn post(
        &self,
        user: &TestUser,
        uri: &str,
        body: &serde_json::Value,
    ) -> (http::StatusCode, serde_json::Value) {
        self.send(authenticated_json_request(
            Method::POST,
            uri,
            &user.auth_header(),
            body,
        ))
        .await
    }

    pub async fn put(
        &self,
        user: &TestUser,
        uri: &str,
        body: &serde_json::Value,
    ) -> (http::StatusCode, serde_json::Value) {
        self.send(authenticated_json_request(
            Method::PUT,
            uri,
            &user.auth_header(),
            body,
        ))
        .await
    }

    pub async fn patch(
        &self,
        user: &TestUser,
        uri: &str,
        body: &serde_json::Value,
    ) -> (http::StatusCode, serde_json::Value) {
        self.send(authenticated_json_request(
            Method::PATCH,
            uri,
            &user.auth_header(),
            body,
        ))
        .await
    }

    pub async fn delete(&self, user: &TestUser, uri: &str) -> (http::StatusCode, serde_json::Value) {
        self.send(authenticated_request(Method::DELETE, uri, &user.auth_header()))
            .await
    }
}

// ---------------------------------------------------------------------------
// Request builder helpers
// ---------------------------------------------------------------------------

/// Build an authenticated request with no body.
pub fn authenticated_request(method: Method, uri: &str, auth_header: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", auth_header)
        .body(Body::empty())
        .unwrap()
}

/// Build an authenticated request with a JSON body.
pub fn authenticated_json_request(
    method: Method,
    uri: &str,
    auth_header: &str,
    body: &serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", auth_header)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Build an unauthenticated request with a JSON body.
pub fn json_request(method: Method, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Parse a response body into a `serde_json::Value`.
pub async fn parse_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn test_app() -> axum::Router {
    TestServer::new().await.router()
}
