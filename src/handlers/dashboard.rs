// src/handlers/dashboard.rs

use axum::{Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{error::AppError, services::queries};

/// Course, question and solved/unsolved counters.
pub async fn get_stats(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let stats = queries::stats(&pool).await.map_err(|e| {
        tracing::error!("Failed to compute stats: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(stats))
}

/// The five most recently created questions.
pub async fn recent_questions(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let questions = queries::recent_questions(&pool).await.map_err(|e| {
        tracing::error!("Failed to fetch recent questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

/// The five most recent questions that have no solution yet.
pub async fn unsolved_questions(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let questions = queries::unsolved_questions(&pool).await.map_err(|e| {
        tracing::error!("Failed to fetch unsolved questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}
