// src/models/solution.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'solutions' table in the database.
/// Each row is one part of a solution group.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Solution {
    pub id: i64,
    pub question_id: i64,
    pub image_path: Option<String>,
    pub content: Option<String>,
    /// Group label (e.g., "Method 1"). Only the first part's title is displayed.
    pub title: Option<String>,
    /// Correlates the parts of one logical solution. NULL on legacy rows.
    pub group_id: Option<String>,
    /// Order within the question, continuing across groups.
    pub page_order: i64,
    pub created_at: Option<chrono::NaiveDateTime>,
}

pub const SOLUTION_COLUMNS: &str = "id, question_id, image_path, content, title, group_id, \
     COALESCE(page_order, 0) AS page_order, created_at";
