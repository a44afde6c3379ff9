// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::{
    error::AppError,
    models::{page::PageView, solution::Solution, tag::Tag},
    services::{grouping::SolutionGroup, tags::TagInput},
    utils::form::FormData,
};

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub course_id: i64,

    pub title: Option<String>,

    /// Single image from before questions had pages.
    /// Never set for new questions; still rendered through the legacy page fallback.
    pub image_path: Option<String>,

    pub notes: Option<String>,

    pub references_text: Option<String>,

    /// See [`Difficulty`] for the stored codes.
    pub difficulty: Option<i64>,

    pub year: Option<i64>,

    /// Free-text category (e.g., "Midterm", "Final").
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub question_type: Option<String>,

    pub question_number: Option<i64>,

    pub created_at: Option<chrono::NaiveDateTime>,
}

/// Column list shared by every query that loads a `Question` from alias `q`.
pub const QUESTION_COLUMNS: &str = "q.id, q.course_id, q.title, q.image_path, q.notes, \
     q.references_text, q.difficulty, q.year, q.type, q.question_number, q.created_at";

/// Stored difficulty codes. The gaps between codes are intentional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Undefined = 0,
    Easy = 1,
    Medium = 3,
    Hard = 5,
}

impl Difficulty {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Difficulty::Undefined),
            1 => Some(Difficulty::Easy),
            3 => Some(Difficulty::Medium),
            5 => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }
}

/// Row in a course's question list.
#[derive(Debug, Serialize, FromRow)]
pub struct QuestionListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub question: Question,

    pub solution_count: i64,

    /// Image of the first page that has one; used as the list thumbnail.
    pub thumbnail_path: Option<String>,

    #[sqlx(skip)]
    pub tags: Vec<Tag>,
}

/// Question joined with its course code (dashboard lists).
#[derive(Debug, Serialize, FromRow)]
pub struct QuestionWithCourse {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub question: Question,

    pub course_code: String,
}

/// Full question view returned by `GET /questions/{id}`.
#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,

    pub tags: Vec<Tag>,

    pub pages: Vec<PageView>,

    /// Flat rows ordered by `(page_order, created_at, id)`.
    pub solutions: Vec<Solution>,

    pub solution_groups: Vec<SolutionGroup>,
}

/// Fields submitted when creating or editing a question (multipart form).
#[derive(Debug, Default, Validate)]
pub struct QuestionForm {
    pub course_id: Option<i64>,
    #[validate(length(max = 500))]
    pub title: Option<String>,
    #[validate(length(max = 20000))]
    pub notes: Option<String>,
    #[validate(length(max = 20000))]
    pub references_text: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[validate(range(min = 1900, max = 2200))]
    pub year: Option<i64>,
    #[validate(length(max = 100))]
    pub question_type: Option<String>,
    pub question_number: Option<i64>,
    /// `None` when the form carried no `tags` field (tags are left untouched on update).
    pub tags: Option<TagInput>,
}

impl QuestionForm {
    /// Extracts and validates the question fields from a parsed multipart form.
    pub fn from_form(form: &FormData) -> Result<Self, AppError> {
        let difficulty = match form.parse_i64("difficulty")? {
            Some(code) => Some(Difficulty::from_code(code).ok_or_else(|| {
                AppError::BadRequest(format!("Invalid difficulty: {}", code))
            })?),
            None => None,
        };

        let question = QuestionForm {
            course_id: form.parse_i64("course_id")?,
            title: form.non_empty("title").map(str::to_string),
            notes: form.text_non_blank("notes").map(str::to_string),
            references_text: form.text_non_blank("references_text").map(str::to_string),
            difficulty,
            year: form.parse_i64("year")?,
            question_type: form.non_empty("type").map(str::to_string),
            question_number: form.parse_i64("question_number")?,
            tags: TagInput::from_field(form.text("tags")),
        };

        question.validate()?;
        Ok(question)
    }

    pub fn difficulty_code(&self) -> i64 {
        self.difficulty.unwrap_or(Difficulty::Undefined).code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_codes_round_trip() {
        for code in [0, 1, 3, 5] {
            assert_eq!(Difficulty::from_code(code).map(Difficulty::code), Some(code));
        }
        assert_eq!(Difficulty::from_code(2), None);
        assert_eq!(Difficulty::from_code(-1), None);
    }

    #[test]
    fn form_rejects_unknown_difficulty() {
        let form = FormData::from_fields([("course_id", "1"), ("difficulty", "4")]);
        assert!(matches!(QuestionForm::from_form(&form), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn form_treats_blank_numbers_as_absent() {
        let form = FormData::from_fields([
            ("course_id", "7"),
            ("year", ""),
            ("question_number", " "),
            ("title", "Integral of x"),
        ]);
        let parsed = QuestionForm::from_form(&form).unwrap();
        assert_eq!(parsed.course_id, Some(7));
        assert_eq!(parsed.year, None);
        assert_eq!(parsed.question_number, None);
        assert_eq!(parsed.title.as_deref(), Some("Integral of x"));
        assert!(parsed.tags.is_none());
        assert_eq!(parsed.difficulty_code(), 0);
    }

    #[test]
    fn form_keeps_markdown_whitespace() {
        let form = FormData::from_fields([
            ("course_id", "1"),
            ("notes", "    let x = 1;\n\nSolve for x.\n"),
            ("references_text", "  \n  "),
        ]);
        let parsed = QuestionForm::from_form(&form).unwrap();
        assert_eq!(parsed.notes.as_deref(), Some("    let x = 1;\n\nSolve for x.\n"));
        assert_eq!(parsed.references_text, None);
    }

    #[test]
    fn form_rejects_non_numeric_year() {
        let form = FormData::from_fields([("course_id", "1"), ("year", "twenty")]);
        assert!(matches!(QuestionForm::from_form(&form), Err(AppError::BadRequest(_))));
    }
}
