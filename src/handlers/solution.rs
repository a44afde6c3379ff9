// src/handlers/solution.rs

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

/// Adds a solution to a question.
///
/// All uploaded images form one group under a fresh `group_id`; the first part
/// carries `content`. Without images a single text part is stored.
pub async fn add_solution(
    State(pool): State<SqlitePool>,
    State(uploads): State<UploadStore>,
    Path(question_id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = FormData::from_multipart(multipart).await?;
    let content_text = form.text("content").unwrap_or_default().to_string();
    let title = form.non_empty("title").map(str::to_string);
    let files = form.images();

    sqlx::query_scalar::<_, i64>("SELECT id FROM questions WHERE id = ?")
        .bind(question_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let images = uploads.save_all(&files).await?;

    let inserted = async {
        let mut tx = db::begin_write(&pool).await?;
        let group = content::insert_solution_group(
            &mut *tx,
            question_id,
            title.as_deref(),
            &content_text,
            &images,
        )
        .await?;
        tx.commit().await?;
        Ok::<_, sqlx::Error>(group)
    }
    .await;

    match inserted {
        Ok(group) => {
            tracing::info!(
                "Solution group {} added to question {} ({} parts)",
                group.group_id,
                question_id,
                group.ids.len()
            );
            Ok((
                StatusCode::CREATED,
                Json(serde_json::json!({
                    "group_id": group.group_id,
                    "ids": group.ids,
                    "success": true
                })),
            ))
        }
        Err(e) => {
            tracing::error!("Failed to add solution to question {}: {:?}", question_id, e);
            uploads.remove_all(&images).await;
            Err(AppError::InternalServerError(e.to_string()))
        }
    }
}

/// Updates one solution part. Content and title change only when sent, and a blank
/// title clears it. A new image replaces the old one, which is deleted after the
/// update commits.
pub async fn update_solution(
    State(pool): State<SqlitePool>,
    State(uploads): State<UploadStore>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = FormData::from_multipart(multipart).await?;
    let content_text = form.text("content").map(str::to_string);
    let title_sent = form.text("title").is_some();
    let title = form.non_empty("title").map(str::to_string);

    let new_image = match form.images().first() {
        Some(file) => Some(uploads.save(file).await?),
        None => None,
    };

    let updated = async {
        let mut tx = db::begin_write(&pool).await?;

        let Some(previous_image) = lifecycle::solution_file(&mut *tx, id).await? else {
            return Ok::<_, sqlx::Error>(None);
        };

        sqlx::query(
            r#"
            UPDATE solutions
            SET content = COALESCE(?, content),
                title = CASE WHEN ? THEN ? ELSE title END,
                image_path = COALESCE(?, image_path)
            WHERE id = ?
            "#,
        )
        .bind(content_text)
        .bind(title_sent)
        .bind(title)
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
            return Err(AppError::NotFound("Solution not found".to_string()));
        }
        Err(e) => {
            tracing::error!("Failed to update solution {}: {:?}", id, e);
            if let Some(path) = &new_image {
                uploads.remove(path).await;
            }
            return Err(AppError::InternalServerError(e.to_string()));
        }
    };

    if let (Some(_), Some(old)) = (&new_image, previous_image.filter(|p| !p.is_empty())) {
        uploads.remove(&old).await;
    }

    tracing::info!("Solution updated: {}", id);
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Deletes one solution part and its image. Other parts of the group remain.
pub async fn delete_solution(
    State(pool): State<SqlitePool>,
    State(uploads): State<UploadStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = db::begin_write(&pool).await?;

    let image = lifecycle::solution_file(&mut *tx, id)
        .await?
        .ok_or(AppError::NotFound("Solution not found".to_string()))?;

    sqlx::query("DELETE FROM solutions WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete solution {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?;

    tx.commit().await?;

    if let Some(path) = image.filter(|p| !p.is_empty()) {
        uploads.remove(&path).await;
    }

    tracing::info!("Solution deleted: {}", id);
    Ok(Json(serde_json::json!({ "success": true })))
}
