// src/services/lifecycle.rs

//! Resolves which uploaded files belong to rows about to be deleted.
//!
//! Cascading deletes do not report the rows they remove, so callers collect the
//! file paths first, delete the rows, and only then remove the files.

use sqlx::SqliteConnection;

/// Image paths owned by a question: its legacy image, its pages and its solutions.
pub async fn question_files(
    conn: &mut SqliteConnection,
    question_id: i64,
) -> Result<Vec<String>, sqlx::Error> {
    let paths: Vec<Option<String>> = sqlx::query_scalar(
        r#"
        SELECT image_path FROM questions WHERE id = ?1
        UNION ALL
        SELECT image_path FROM question_pages WHERE question_id = ?1
        UNION ALL
        SELECT image_path FROM solutions WHERE question_id = ?1
        "#,
    )
    .bind(question_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(non_empty(paths))
}

/// Image paths owned by every question of a course.
pub async fn course_files(
    conn: &mut SqliteConnection,
    course_id: i64,
) -> Result<Vec<String>, sqlx::Error> {
    let question_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM questions WHERE course_id = ?")
        .bind(course_id)
        .fetch_all(&mut *conn)
        .await?;

    let mut files = Vec::new();
    for question_id in question_ids {
        files.extend(question_files(conn, question_id).await?);
    }
    Ok(files)
}

pub async fn page_file(
    conn: &mut SqliteConnection,
    page_id: i64,
) -> Result<Option<Option<String>>, sqlx::Error> {
    sqlx::query_scalar("SELECT image_path FROM question_pages WHERE id = ?")
        .bind(page_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn solution_file(
    conn: &mut SqliteConnection,
    solution_id: i64,
) -> Result<Option<Option<String>>, sqlx::Error> {
    sqlx::query_scalar("SELECT image_path FROM solutions WHERE id = ?")
        .bind(solution_id)
        .fetch_optional(&mut *conn)
        .await
}

fn non_empty(paths: Vec<Option<String>>) -> Vec<String> {
    paths
        .into_iter()
        .flatten()
        .filter(|p| !p.trim().is_empty())
        .collect()
}
