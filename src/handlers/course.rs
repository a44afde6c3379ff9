// src/handlers/course.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    db,
    error::AppError,
    models::course::{
        COURSE_COLUMNS, Course, CreateCourseRequest, ReorderCoursesRequest, UpdateCourseRequest,
    },
    services::{lifecycle, queries},
    utils::uploads::UploadStore,
};

/// Lists all courses in sidebar order.
pub async fn list_courses(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let courses = queries::list_courses(&pool).await.map_err(|e| {
        tracing::error!("Failed to list courses: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(courses))
}

/// Creates a new course. Code and title are required.
pub async fn create_course(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        tracing::warn!("Rejected course without valid code or title: {}", validation_errors);
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let course = sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (code, title, description) VALUES (?, ?, ?) RETURNING {}",
        COURSE_COLUMNS
    ))
    .bind(payload.code.as_deref().map(str::trim))
    .bind(payload.title.as_deref().map(str::trim))
    .bind(payload.description.unwrap_or_default())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create course: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!("Course created: {} - {} (id {})", course.code, course.title, course.id);
    Ok((StatusCode::CREATED, Json(course)))
}

/// Updates a course by ID. Fields are optional.
pub async fn update_course(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.is_empty() {
        sqlx::query_scalar::<_, i64>("SELECT id FROM courses WHERE id = ?")
            .bind(id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("Course not found".to_string()))?;
        return Ok(Json(serde_json::json!({ "success": true })));
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE courses SET ");
    let mut separated = builder.separated(", ");

    if let Some(code) = payload.code {
        separated.push("code = ");
        separated.push_bind_unseparated(code.trim().to_string());
    }

    if let Some(title) = payload.title {
        separated.push("title = ");
        separated.push_bind_unseparated(title.trim().to_string());
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(description);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update course {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    tracing::info!("Course updated: {}", id);
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Deletes a course, its questions (by cascade) and every image they owned.
pub async fn delete_course(
    State(pool): State<SqlitePool>,
    State(uploads): State<UploadStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = db::begin_write(&pool).await?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM courses WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    // Cascade does not report the removed rows; collect their files first.
    let files = lifecycle::course_files(&mut *tx, id).await?;

    sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete course {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?;

    tx.commit().await?;

    uploads.remove_all(&files).await;
    tracing::info!("Course deleted: {} ({} files removed)", id, files.len());

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Applies a new sidebar order atomically. Unknown ids are ignored.
pub async fn reorder_courses(
    State(pool): State<SqlitePool>,
    Json(payload): Json<ReorderCoursesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = db::begin_write(&pool).await?;

    for item in &payload.orders {
        sqlx::query("UPDATE courses SET sort_order = ? WHERE id = ?")
            .bind(item.sort_order)
            .bind(item.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to reorder course {}: {:?}", item.id, e);
                AppError::InternalServerError(e.to_string())
            })?;
    }

    tx.commit().await?;

    tracing::info!("Courses reordered ({} entries)", payload.orders.len());
    Ok(Json(serde_json::json!({ "success": true })))
}
