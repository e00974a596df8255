use axum::Json;

/// Liveness probe; does not touch the database.
pub async fn health() -> &'static str {
    "ok"
}

pub async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "data": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "git_sha": env!("GIT_SHA"),
        }
    }))
}
