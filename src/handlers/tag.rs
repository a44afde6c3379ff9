// src/handlers/tag.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{error::AppError, services::tags};

/// Lists every tag by name, including tags no question uses anymore.
pub async fn list_tags(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let tags = tags::list_tags(&pool).await.map_err(|e| {
        tracing::error!("Failed to list tags: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(tags))
}
