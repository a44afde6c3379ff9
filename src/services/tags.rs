// src/services/tags.rs

use sqlx::{SqliteConnection, SqlitePool};

use crate::models::tag::Tag;

/// Tag list as submitted by the client.
///
/// The UI sends a JSON array string; older clients and hand-written requests send
/// a comma-separated string. The shape is decided once, here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagInput {
    JsonArray(Vec<String>),
    CommaSeparated(String),
}

impl TagInput {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Array(items)) => TagInput::JsonArray(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::String(name) => Some(name),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => TagInput::CommaSeparated(raw.to_string()),
        }
    }

    /// A blank `tags` field counts as not submitted.
    pub fn from_field(raw: Option<&str>) -> Option<Self> {
        raw.filter(|r| !r.trim().is_empty()).map(TagInput::parse)
    }

    /// Trimmed, non-empty, de-duplicated names in submission order.
    pub fn names(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            TagInput::JsonArray(items) => items.iter().map(String::as_str).collect(),
            TagInput::CommaSeparated(s) => s.split(',').collect(),
        };

        let mut names: Vec<String> = Vec::new();
        for name in raw.into_iter().map(str::trim) {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

/// Creates missing tags (exact, case-sensitive match) and links them to the question.
pub async fn link_tags(
    conn: &mut SqliteConnection,
    question_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    for name in names {
        sqlx::query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(&mut *conn)
            .await?;

        let tag_id: i64 = sqlx::query_scalar("SELECT id FROM tags WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;

        sqlx::query("INSERT OR IGNORE INTO question_tags (question_id, tag_id) VALUES (?, ?)")
            .bind(question_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Replaces the question's links with exactly `names`. Unlinked tags stay in `tags`.
pub async fn replace_tags(
    conn: &mut SqliteConnection,
    question_id: i64,
    names: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM question_tags WHERE question_id = ?")
        .bind(question_id)
        .execute(&mut *conn)
        .await?;

    link_tags(conn, question_id, names).await
}

pub async fn tags_for_question(pool: &SqlitePool, question_id: i64) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.color
        FROM tags t
        JOIN question_tags qt ON qt.tag_id = t.id
        WHERE qt.question_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(question_id)
    .fetch_all(pool)
    .await
}

pub async fn list_tags(pool: &SqlitePool) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>("SELECT id, name, color FROM tags ORDER BY name")
        .fetch_all(pool)
        .await
}
