// src/models/page.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'question_pages' table in the database.
/// One ordered part (image and/or text) of a question's body.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestionPage {
    pub id: i64,
    pub question_id: i64,
    pub image_path: Option<String>,
    /// Markdown text.
    pub content: Option<String>,
    pub page_order: i64,
    pub created_at: Option<chrono::NaiveDateTime>,
}

pub const PAGE_COLUMNS: &str =
    "id, question_id, image_path, content, COALESCE(page_order, 0) AS page_order, created_at";

/// Page identifier as seen by clients: a row id, or the virtual id of the
/// legacy fallback page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageId {
    Stored(i64),
    Virtual(&'static str),
}

pub const LEGACY_PAGE_ID: &str = "legacy";

/// A page as presented to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub id: PageId,
    pub question_id: i64,
    pub image_path: Option<String>,
    pub content: Option<String>,
    pub page_order: i64,
    pub created_at: Option<chrono::NaiveDateTime>,
}

impl From<QuestionPage> for PageView {
    fn from(page: QuestionPage) -> Self {
        PageView {
            id: PageId::Stored(page.id),
            question_id: page.question_id,
            image_path: page.image_path,
            content: page.content,
            page_order: page.page_order,
            created_at: page.created_at,
        }
    }
}

impl PageView {
    pub fn is_legacy(&self) -> bool {
        self.id == PageId::Virtual(LEGACY_PAGE_ID)
    }
}
