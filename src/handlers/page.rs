// src/handlers/page.rs

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    db,
    error::AppError,
    services::{content, lifecycle},
    utils::{form::FormData, uploads::UploadStore},
};

/// Appends pages to a question.
///
/// Each uploaded image becomes a page after the existing ones; the first carries
/// `content`. Without images a single text page is added.
pub async fn add_pages(
    State(pool): State<SqlitePool>,
    State(uploads): State<UploadStore>,
    Path(question_id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = FormData::from_multipart(multipart).await?;
    let content_text = form.text("content").unwrap_or_default().to_string();
    let files = form.images();

    if files.is_empty() && content_text.trim().is_empty() {
        return Err(AppError::BadRequest(
            "A page needs an image or some content".to_string(),
        ));
    }

    sqlx::query_scalar::<_, i64>("SELECT id FROM questions WHERE id = ?")
        .bind(question_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let images = uploads.save_all(&files).await?;

    let inserted = async {
        let mut tx = db::begin_write(&pool).await?;
        let ids = content::insert_pages(&mut *tx, question_id, &content_text, &images).await?;
        tx.commit().await?;
        Ok::<_, sqlx::Error>(ids)
    }
    .await;

    match inserted {
        Ok(ids) => {
            tracing::info!("{} page(s) added to question {}", ids.len(), question_id);
            Ok((
                StatusCode::CREATED,
                Json(serde_json::json!({ "ids": ids, "success": true })),
            ))
        }
        Err(e) => {
            tracing::error!("Failed to add page to question {}: {:?}", question_id, e);
            uploads.remove_all(&images).await;
            Err(AppError::InternalServerError(e.to_string()))
        }
    }
}

/// Updates a page's text (when sent) and optionally replaces its image.
/// The previous image is deleted once the new one is committed.
pub async fn update_page(
    State(pool): State<SqlitePool>,
    State(uploads): State<UploadStore>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = FormData::from_multipart(multipart).await?;
    let content_text = form.text("content").map(str::to_string);

    let new_image = match form.images().first() {
        Some(file) => Some(uploads.save(file).await?),
        None => None,
    };

    // Lookup and update share the write lock so a concurrent replacement cannot
    // swap the image between them.
    let updated = async {
        let mut tx = db::begin_write(&pool).await?;

        let Some(previous_image) = lifecycle::page_file(&mut *tx, id).await? else {
            return Ok::<_, sqlx::Error>(None);
        };

        sqlx::query(
            "UPDATE question_pages SET content = COALESCE(?, content), image_path = COALESCE(?, image_path) WHERE id = ?",
        )
        .bind(content_text)
        .bind(new_image.as_deref())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok::<_, sqlx::Error>(Some(previous_image))
    }
    .await;

    let previous_image = match updated {
        Ok(Some(previous_image)) => previous_image,
        Ok(None) => {
            if let Some(path) = &new_image {
                uploads.remove(path).await;
            }
            return Err(AppError::NotFound("Page not found".to_string()));
        }
        Err(e) => {
            tracing::error!("Failed to update page {}: {:?}", id, e);
            if let Some(path) = &new_image {
                uploads.remove(path).await;
            }
            return Err(AppError::InternalServerError(e.to_string()));
        }
    };

    if let (Some(_), Some(old)) = (&new_image, previous_image.filter(|p| !p.is_empty())) {
        uploads.remove(&old).await;
    }

    tracing::info!("Page updated: {}", id);
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Deletes a page and its image. Remaining pages keep their order values.
pub async fn delete_page(
    State(pool): State<SqlitePool>,
    State(uploads): State<UploadStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = db::begin_write(&pool).await?;

    let image = lifecycle::page_file(&mut *tx, id)
        .await?
        .ok_or(AppError::NotFound("Page not found".to_string()))?;

    sqlx::query("DELETE FROM question_pages WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete page {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?;

    tx.commit().await?;

    if let Some(path) = image.filter(|p| !p.is_empty()) {
        uploads.remove(&path).await;
    }

    tracing::info!("Page deleted: {}", id);
    Ok(Json(serde_json::json!({ "success": true })))
}
