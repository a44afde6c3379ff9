// src/services/content.rs

//! Multi-part inserts for question pages and solution groups.
//!
//! Both read the question's current row count inside the caller's transaction and
//! append after it. The transaction must come from [`crate::db::begin_write`] so the
//! count and the inserts happen under one write lock.

use sqlx::SqliteConnection;

use crate::services::grouping::{PartPlan, new_group_id, plan_parts};

/// Rows written for one solution group.
#[derive(Debug, Clone)]
pub struct InsertedGroup {
    pub group_id: String,
    pub ids: Vec<i64>,
}

async fn count_rows(
    conn: &mut SqliteConnection,
    table: &str,
    question_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE question_id = ?",
        table
    ))
    .bind(question_id)
    .fetch_one(&mut *conn)
    .await
}

/// Appends pages built from `image_paths` (or one text page when there are none).
pub async fn insert_pages(
    conn: &mut SqliteConnection,
    question_id: i64,
    content: &str,
    image_paths: &[String],
) -> Result<Vec<i64>, sqlx::Error> {
    let next_order = count_rows(conn, "question_pages", question_id).await?;
    let plan = plan_parts(next_order, content, image_paths);

    let mut ids = Vec::with_capacity(plan.len());
    for PartPlan {
        page_order,
        image_path,
        content,
    } in plan
    {
        let id = sqlx::query(
            "INSERT INTO question_pages (question_id, image_path, content, page_order) VALUES (?, ?, ?, ?)",
        )
        .bind(question_id)
        .bind(image_path)
        .bind(content)
        .bind(page_order)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
        ids.push(id);
    }

    Ok(ids)
}

/// Appends a new solution group under a fresh group id.
pub async fn insert_solution_group(
    conn: &mut SqliteConnection,
    question_id: i64,
    title: Option<&str>,
    content: &str,
    image_paths: &[String],
) -> Result<InsertedGroup, sqlx::Error> {
    let next_order = count_rows(conn, "solutions", question_id).await?;
    let group_id = new_group_id();
    let plan = plan_parts(next_order, content, image_paths);

    let mut ids = Vec::with_capacity(plan.len());
    for part in plan {
        let id = sqlx::query(
            r#"
            INSERT INTO solutions (question_id, image_path, content, title, group_id, page_order)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(question_id)
        .bind(part.image_path)
        .bind(part.content)
        .bind(title)
        .bind(&group_id)
        .bind(part.page_order)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
        ids.push(id);
    }

    Ok(InsertedGroup { group_id, ids })
}
