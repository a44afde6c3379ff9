// src/handlers/question.rs

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Datelike;
use sqlx::SqlitePool;

use crate::{
    db,
    error::AppError,
    models::question::QuestionForm,
    services::{
        content, lifecycle,
        queries::{self, ListParams},
        tags,
    },
    utils::{form::FormData, uploads::UploadStore},
};

/// Lists a course's questions with search and sort.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
    Path(course_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let questions = queries::list_course_questions(&pool, course_id, &params)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list questions for course {}: {:?}", course_id, e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(Json(questions))
}

/// Retrieves a question with its tags, pages and grouped solutions.
pub async fn get_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = queries::question_detail(&pool, id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch question {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(detail))
}

/// Creates a question with its pages and tags.
///
/// Uploaded images become pages in submission order; the first page carries the
/// notes. Without images, non-empty notes become a single text page.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    State(uploads): State<UploadStore>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = FormData::from_multipart(multipart).await?;
    let input = QuestionForm::from_form(&form)?;

    let Some(course_id) = input.course_id else {
        tracing::warn!("Attempt to create question without course_id");
        return Err(AppError::BadRequest("Course ID is required".to_string()));
    };

    sqlx::query_scalar::<_, i64>("SELECT id FROM courses WHERE id = ?")
        .bind(course_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let images = uploads.save_all(&form.images()).await?;

    match insert_question(&pool, course_id, &input, &images).await {
        Ok(id) => {
            tracing::info!("Question created: {} in course {} ({} pages)", id, course_id, images.len());
            Ok((
                StatusCode::CREATED,
                Json(serde_json::json!({ "id": id, "success": true })),
            ))
        }
        Err(e) => {
            tracing::error!("Failed to create question in course {}: {:?}", course_id, e);
            uploads.remove_all(&images).await;
            Err(AppError::InternalServerError(e.to_string()))
        }
    }
}

async fn insert_question(
    pool: &SqlitePool,
    course_id: i64,
    input: &QuestionForm,
    images: &[String],
) -> Result<i64, sqlx::Error> {
    let mut tx = db::begin_write(&pool).await?;

    let year = input
        .year
        .unwrap_or_else(|| i64::from(chrono::Local::now().year()));

    let question_id = sqlx::query(
        r#"
        INSERT INTO questions
        (course_id, title, image_path, notes, references_text, difficulty, year, type, question_number)
        VALUES (?, ?, NULL, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(course_id)
    .bind(input.title.as_deref().unwrap_or("Untitled"))
    .bind(input.notes.as_deref())
    .bind(input.references_text.as_deref())
    .bind(input.difficulty_code())
    .bind(year)
    .bind(input.question_type.as_deref())
    .bind(input.question_number)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    let notes = input.notes.as_deref().unwrap_or_default();
    if !images.is_empty() || !notes.is_empty() {
        content::insert_pages(&mut *tx, question_id, notes, images).await?;
    }

    if let Some(tag_input) = &input.tags {
        tags::link_tags(&mut *tx, question_id, &tag_input.names()).await?;
    }

    tx.commit().await?;
    Ok(question_id)
}

/// Updates a question's fields. Tags are fully replaced when a `tags` field is sent.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = FormData::from_multipart(multipart).await?;
    let input = QuestionForm::from_form(&form)?;

    let mut tx = db::begin_write(&pool).await?;

    let result = sqlx::query(
        r#"
        UPDATE questions
        SET title = ?, notes = ?, references_text = ?, difficulty = ?, year = ?, type = ?, question_number = ?
        WHERE id = ?
        "#,
    )
    .bind(input.title.as_deref())
    .bind(input.notes.as_deref())
    .bind(input.references_text.as_deref())
    .bind(input.difficulty_code())
    .bind(input.year)
    .bind(input.question_type.as_deref())
    .bind(input.question_number)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update question {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    if let Some(tag_input) = &input.tags {
        tags::replace_tags(&mut *tx, id, &tag_input.names())
            .await
            .map_err(|e| {
                tracing::error!("Failed to replace tags of question {}: {:?}", id, e);
                AppError::InternalServerError(e.to_string())
            })?;
    }

    tx.commit().await?;

    tracing::info!("Question updated: {}", id);
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Deletes a question, its pages, solutions and tag links, and their images.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    State(uploads): State<UploadStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = db::begin_write(&pool).await?;

    let files = lifecycle::question_files(&mut *tx, id).await?;

    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    tx.commit().await?;

    uploads.remove_all(&files).await;
    tracing::info!("Question deleted: {} ({} files removed)", id, files.len());

    Ok(Json(serde_json::json!({ "success": true })))
}
