use sqlx::{Row, SqlitePool};

use crate::db::{new_id, timestamp};
use crate::error::AppError;
use crate::models::invitation::normalize_email;
use crate::models::user::{CreateUser, UpdateUser, User};

fn row_to_user(row: sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        avatar: row.get("avatar"),
        created_at: row.get("created_at"),
    }
}

const SELECT_USERS: &str = "SELECT id, email, display_name, avatar, created_at FROM users";

pub async fn get_user(pool: &SqlitePool, user_id: &str) -> Result<User, AppError> {
    let row = sqlx::query(&format!("{SELECT_USERS} WHERE id = ?"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(row_to_user(row))
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let row = sqlx::query(&format!("{SELECT_USERS} WHERE email = ?"))
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

    Ok(row.map(row_to_user))
}

/// Creates a user. `password_hash` is `None` for accounts that can only be
/// reached through issued tokens (seeded or test users).
pub async fn create_user(
    pool: &SqlitePool,
    input: &CreateUser,
    password_hash: Option<&str>,
) -> Result<User, AppError> {
    let id = new_id();
    let now = timestamp();
    let email = normalize_email(&input.email);

    sqlx::query(
        "INSERT INTO users (id, email, display_name, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&email)
    .bind(&input.display_name)
    .bind(password_hash)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict("email already registered".to_string()),
        other => other,
    })?;

    get_user(pool, &id).await
}

/// Returns `(user_id, password_hash)` for a password-enabled account.
pub async fn get_credentials(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<(String, String)>, AppError> {
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT id, password_hash FROM users WHERE email = ? AND password_hash IS NOT NULL",
    )
    .bind(normalize_email(email))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Applies a profile update. `password_hash` replaces the stored hash when
/// given; the plain `password` on `input` is never written.
pub async fn update_user(
    pool: &SqlitePool,
    user_id: &str,
    input: &UpdateUser,
    password_hash: Option<&str>,
) -> Result<User, AppError> {
    let mut sets = Vec::new();
    let mut values: Vec<&str> = Vec::new();

    if let Some(ref display_name) = input.display_name {
        if display_name.is_empty() {
            sets.push("display_name = NULL");
        } else {
            sets.push("display_name = ?");
            values.push(display_name);
        }
    }
    if let Some(ref avatar) = input.avatar {
        if avatar.is_empty() {
            sets.push("avatar = NULL");
        } else {
            sets.push("avatar = ?");
            values.push(avatar);
        }
    }
    if let Some(ref email) = input.email {
        sets.push("email = ?");
        values.push(email);
    }
    if let Some(hash) = password_hash {
        sets.push("password_hash = ?");
        values.push(hash);
    }

    if sets.is_empty() {
        return get_user(pool, user_id).await;
    }

    let now = timestamp();
    sets.push("updated_at = ?");
    values.push(&now);

    let query = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
    let mut q = sqlx::query(&query);
    for v in &values {
        q = q.bind(*v);
    }
    let result = q
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("email already registered".to_string()),
            other => other,
        })?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("user not found".to_string()));
    }

    get_user(pool, user_id).await
}

/// The stored hash, or `None` for a password-less account.
pub async fn get_password_hash(pool: &SqlitePool, user_id: &str) -> Result<Option<String>, AppError> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT password_hash FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    row.map(|(hash,)| hash)
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))
}
