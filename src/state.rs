use sqlx::SqlitePool;

use crate::service::WorkspaceService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub workspaces: WorkspaceService,
    /// Lifetime of tokens issued by register/login.
    pub token_ttl_days: i64,
    pub cors_origin: Option<String>,
}

impl AppState {
    /// State backed by `db` for every store.
    pub fn new(db: SqlitePool, token_ttl_days: i64, cors_origin: Option<String>) -> Self {
        Self {
            workspaces: WorkspaceService::sqlite(db.clone()),
            db,
            token_ttl_days,
            cors_origin,
        }
    }
}
