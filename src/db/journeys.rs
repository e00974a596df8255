use sqlx::types::Json;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::db::{new_id, timestamp};
use crate::error::AppError;
use crate::models::journey::{Journey, JourneyFilter, JourneyInput, Stage};

fn row_to_journey(row: sqlx::sqlite::SqliteRow) -> Journey {
    Journey {
        id: row.get("id"),
        workspace_id: row.get("workspace_id"),
        name: row.get("name"),
        description: row.get("description"),
        cover_image: row.get("cover_image"),
        persona_ids: row.get::<Json<Vec<String>>, _>("persona_ids").0,
        state: row.get("state"),
        status: row.get("status"),
        stages: row.get::<Json<Vec<Stage>>, _>("stages").0,
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_JOURNEYS: &str = "SELECT id, workspace_id, name, description, cover_image, persona_ids, state, status, stages, created_by, created_at, updated_at FROM journeys";

pub async fn get_journey(pool: &SqlitePool, journey_id: &str) -> Result<Journey, AppError> {
    let row = sqlx::query(&format!("{SELECT_JOURNEYS} WHERE id = ?"))
        .bind(journey_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("journey not found".to_string()))?;

    Ok(row_to_journey(row))
}

/// Journeys of a workspace in the filter's sort order. The status filter
/// runs in SQL; the free-text search is applied to the decoded rows.
pub async fn list_journeys(
    pool: &SqlitePool,
    workspace_id: &str,
    filter: &JourneyFilter,
) -> Result<Vec<Journey>, AppError> {
    let order_by = filter.sort.order_by();
    let rows = match filter.status {
        Some(status) => {
            sqlx::query(&format!(
                "{SELECT_JOURNEYS} WHERE workspace_id = ? AND status = ? ORDER BY {order_by}"
            ))
            .bind(workspace_id)
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(&format!(
                "{SELECT_JOURNEYS} WHERE workspace_id = ? ORDER BY {order_by}"
            ))
            .bind(workspace_id)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows
        .into_iter()
        .map(row_to_journey)
        .filter(|j| j.matches(filter))
        .collect())
}

pub async fn create_journey(
    pool: &SqlitePool,
    workspace_id: &str,
    created_by: &str,
    input: &JourneyInput,
) -> Result<Journey, AppError> {
    let id = new_id();
    let now = timestamp();

    sqlx::query(
        "INSERT INTO journeys (id, workspace_id, name, description, cover_image, persona_ids, state, status, stages, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(workspace_id)
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.cover_image)
    .bind(Json(&input.persona_ids))
    .bind(input.state)
    .bind(input.status)
    .bind(Json(&input.stages))
    .bind(created_by)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get_journey(pool, &id).await
}

pub async fn replace_journey(
    pool: &SqlitePool,
    journey_id: &str,
    input: &JourneyInput,
) -> Result<Journey, AppError> {
    let result = sqlx::query(
        "UPDATE journeys SET name = ?, description = ?, cover_image = ?, persona_ids = ?, state = ?, status = ?, stages = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.cover_image)
    .bind(Json(&input.persona_ids))
    .bind(input.state)
    .bind(input.status)
    .bind(Json(&input.stages))
    .bind(timestamp())
    .bind(journey_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("journey not found".to_string()));
    }

    get_journey(pool, journey_id).await
}

pub async fn delete_journey(pool: &SqlitePool, journey_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM journeys WHERE id = ?")
        .bind(journey_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Drops `persona_id` from every journey of the workspace that references it.
pub async fn remove_persona_references(
    conn: &mut SqliteConnection,
    workspace_id: &str,
    persona_id: &str,
) -> Result<u64, AppError> {
    let rows = sqlx::query_as::<_, (String, Json<Vec<String>>)>(
        "SELECT id, persona_ids FROM journeys WHERE workspace_id = ?",
    )
    .bind(workspace_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut updated = 0;
    for (journey_id, Json(mut ids)) in rows {
        let before = ids.len();
        ids.retain(|id| id != persona_id);
        if ids.len() == before {
            continue;
        }
        sqlx::query("UPDATE journeys SET persona_ids = ? WHERE id = ?")
            .bind(Json(&ids))
            .bind(&journey_id)
            .execute(&mut *conn)
            .await?;
        updated += 1;
    }
    Ok(updated)
}
