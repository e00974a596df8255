use sqlx::types::Json;
use sqlx::{Row, SqlitePool};

use crate::db::{journeys, new_id, timestamp};
use crate::error::AppError;
use crate::models::persona::{CustomSection, Persona, PersonaInput};

fn row_to_persona(row: sqlx::sqlite::SqliteRow) -> Persona {
    Persona {
        id: row.get("id"),
        workspace_id: row.get("workspace_id"),
        name: row.get("name"),
        age: row.get("age"),
        occupation: row.get("occupation"),
        goals: row.get::<Json<Vec<String>>, _>("goals").0,
        pain_points: row.get::<Json<Vec<String>>, _>("pain_points").0,
        custom_sections: row
            .get::<Json<Vec<CustomSection>>, _>("custom_sections")
            .0,
        avatar: row.get("avatar"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_PERSONAS: &str = "SELECT id, workspace_id, name, age, occupation, goals, pain_points, custom_sections, avatar, created_by, created_at, updated_at FROM personas";

pub async fn get_persona(pool: &SqlitePool, persona_id: &str) -> Result<Persona, AppError> {
    let row = sqlx::query(&format!("{SELECT_PERSONAS} WHERE id = ?"))
        .bind(persona_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("persona not found".to_string()))?;

    Ok(row_to_persona(row))
}

pub async fn list_personas(pool: &SqlitePool, workspace_id: &str) -> Result<Vec<Persona>, AppError> {
    let rows = sqlx::query(&format!(
        "{SELECT_PERSONAS} WHERE workspace_id = ? ORDER BY created_at ASC, id ASC"
    ))
    .bind(workspace_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_persona).collect())
}

/// Number of the given ids that are personas of `workspace_id`.
pub async fn count_in_workspace(
    pool: &SqlitePool,
    workspace_id: &str,
    persona_ids: &[String],
) -> Result<usize, AppError> {
    let mut count = 0;
    for id in persona_ids {
        let found: Option<(String,)> =
            sqlx::query_as("SELECT id FROM personas WHERE id = ? AND workspace_id = ?")
                .bind(id)
                .bind(workspace_id)
                .fetch_optional(pool)
                .await?;
        if found.is_some() {
            count += 1;
        }
    }
    Ok(count)
}

pub async fn create_persona(
    pool: &SqlitePool,
    workspace_id: &str,
    created_by: &str,
    input: &PersonaInput,
) -> Result<Persona, AppError> {
    let id = new_id();
    let now = timestamp();

    sqlx::query(
        "INSERT INTO personas (id, workspace_id, name, age, occupation, goals, pain_points, custom_sections, avatar, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(workspace_id)
    .bind(&input.name)
    .bind(&input.age)
    .bind(&input.occupation)
    .bind(Json(&input.goals))
    .bind(Json(&input.pain_points))
    .bind(Json(&input.custom_sections))
    .bind(&input.avatar)
    .bind(created_by)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get_persona(pool, &id).await
}

pub async fn replace_persona(
    pool: &SqlitePool,
    persona_id: &str,
    input: &PersonaInput,
) -> Result<Persona, AppError> {
    let result = sqlx::query(
        "UPDATE personas SET name = ?, age = ?, occupation = ?, goals = ?, pain_points = ?, custom_sections = ?, avatar = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&input.name)
    .bind(&input.age)
    .bind(&input.occupation)
    .bind(Json(&input.goals))
    .bind(Json(&input.pain_points))
    .bind(Json(&input.custom_sections))
    .bind(&input.avatar)
    .bind(timestamp())
    .bind(persona_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("persona not found".to_string()));
    }

    get_persona(pool, persona_id).await
}

/// Deletes the persona and unlinks it from the workspace's journeys in one
/// transaction. Returns how many journeys were unlinked.
pub async fn delete_persona(
    pool: &SqlitePool,
    workspace_id: &str,
    persona_id: &str,
) -> Result<u64, AppError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM personas WHERE id = ? AND workspace_id = ?")
        .bind(persona_id)
        .bind(workspace_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("persona not found".to_string()));
    }

    let unlinked = journeys::remove_persona_references(&mut *tx, workspace_id, persona_id).await?;

    tx.commit().await?;
    Ok(unlinked)
}
