use sqlx::SqlitePool;

use crate::error::AppError;
use crate::middleware::auth::{create_token_hash, generate_token};

/// Issues a bearer token for `user_id` valid for `ttl_days`. Only the hash is
/// stored; the raw token is returned once.
pub async fn issue_token(pool: &SqlitePool, user_id: &str, ttl_days: i64) -> Result<String, AppError> {
    let token = generate_token();
    let token_hash = create_token_hash(&token);
    let expires_at = (chrono::Utc::now() + chrono::Duration::days(ttl_days))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();

    sqlx::query("INSERT INTO user_tokens (token_hash, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&token_hash)
        .bind(user_id)
        .bind(&expires_at)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Resolves a raw token to `(user_id, email)` if it exists and has not expired.
pub async fn resolve_token(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<(String, String)>, AppError> {
    let token_hash = create_token_hash(token);
    let row = sqlx::query_as::<_, (String, String, String)>(
        "SELECT ut.user_id, u.email, ut.expires_at FROM user_tokens ut JOIN users u ON ut.user_id = u.id WHERE ut.token_hash = ?",
    )
    .bind(&token_hash)
    .fetch_optional(pool)
    .await?;

    let Some((user_id, email, expires_at)) = row else {
        return Ok(None);
    };

    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
    if expires_at < now {
        return Ok(None);
    }

    Ok(Some((user_id, email)))
}

pub async fn revoke_token(pool: &SqlitePool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM user_tokens WHERE token_hash = ?")
        .bind(create_token_hash(token))
        .execute(pool)
        .await?;
    Ok(())
}
