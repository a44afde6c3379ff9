// src/services/queries.rs

//! Read-side queries shared by the HTTP handlers and the static exporter.

use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    models::{
        course::{COURSE_COLUMNS, Course},
        page::{PAGE_COLUMNS, QuestionPage},
        question::{QUESTION_COLUMNS, Question, QuestionDetail, QuestionListItem, QuestionWithCourse},
        solution::{SOLUTION_COLUMNS, Solution},
        stats::Stats,
    },
    services::{
        grouping::{group_solutions, pages_with_legacy_fallback, sort_solutions},
        tags::tags_for_question,
    },
};

/// Number of entries in the dashboard's recent/unsolved lists.
const DASHBOARD_LIMIT: i64 = 5;

/// Sortable columns of the question list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Year,
    Difficulty,
    CreatedAt,
    Title,
    QuestionNumber,
}

impl SortColumn {
    /// Unknown names fall back to `created_at`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("year") => SortColumn::Year,
            Some("difficulty") => SortColumn::Difficulty,
            Some("title") => SortColumn::Title,
            Some("question_number") => SortColumn::QuestionNumber,
            _ => SortColumn::CreatedAt,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortColumn::Year => "q.year",
            SortColumn::Difficulty => "q.difficulty",
            SortColumn::CreatedAt => "q.created_at",
            SortColumn::Title => "q.title",
            SortColumn::QuestionNumber => "q.question_number",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `asc` (any case) sorts ascending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query parameters for listing a course's questions.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ListParams {
    pub fn sort_column(&self) -> SortColumn {
        SortColumn::parse(self.sort_by.as_deref())
    }

    pub fn sort_order(&self) -> SortOrder {
        SortOrder::parse(self.order.as_deref())
    }
}

/// Escapes LIKE wildcards so the term matches literally, wrapped for substring search.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {} FROM courses ORDER BY sort_order, title",
        COURSE_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_question(pool: &SqlitePool, id: i64) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {} FROM questions q WHERE q.id = ?",
        QUESTION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Questions of a course, filtered by `search` over title, notes and references,
/// sorted by an allow-listed column. Each row carries its solution count,
/// thumbnail and tags.
pub async fn list_course_questions(
    pool: &SqlitePool,
    course_id: i64,
    params: &ListParams,
) -> Result<Vec<QuestionListItem>, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    builder.push(QUESTION_COLUMNS);
    builder.push(
        r#",
            (SELECT COUNT(*) FROM solutions s WHERE s.question_id = q.id) AS solution_count,
            (SELECT qp.image_path FROM question_pages qp
              WHERE qp.question_id = q.id AND qp.image_path IS NOT NULL AND qp.image_path != ''
              ORDER BY qp.page_order ASC, qp.id ASC LIMIT 1) AS thumbnail_path
        FROM questions q
        WHERE q.course_id = "#,
    );
    builder.push_bind(course_id);

    if let Some(term) = params.search.as_deref().filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        builder.push(" AND (q.title LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(r" ESCAPE '\' OR q.notes LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(r" ESCAPE '\' OR q.references_text LIKE ");
        builder.push_bind(pattern);
        builder.push(r" ESCAPE '\')");
    }

    let column = params.sort_column().column();
    let order = params.sort_order().keyword();
    builder.push(format!(" ORDER BY {} {}, q.id {}", column, order, order));

    let mut questions: Vec<QuestionListItem> = builder.build_query_as().fetch_all(pool).await?;

    for item in &mut questions {
        item.tags = tags_for_question(pool, item.question.id).await?;
    }

    Ok(questions)
}

/// Same as [`list_course_questions`] with the static export ordering:
/// `question_number ASC`, then newest first.
pub async fn list_course_questions_for_export(
    pool: &SqlitePool,
    course_id: i64,
) -> Result<Vec<QuestionListItem>, sqlx::Error> {
    let mut questions = list_course_questions(
        pool,
        course_id,
        &ListParams {
            sort_by: Some("created_at".to_string()),
            order: Some("desc".to_string()),
            ..ListParams::default()
        },
    )
    .await?;

    // Stable sort keeps the created_at DESC order among equal numbers.
    questions.sort_by(|a, b| a.question.question_number.cmp(&b.question.question_number));
    Ok(questions)
}

pub async fn question_pages(pool: &SqlitePool, question_id: i64) -> Result<Vec<QuestionPage>, sqlx::Error> {
    sqlx::query_as::<_, QuestionPage>(&format!(
        "SELECT {} FROM question_pages WHERE question_id = ? ORDER BY page_order, id",
        PAGE_COLUMNS
    ))
    .bind(question_id)
    .fetch_all(pool)
    .await
}

pub async fn question_solutions(pool: &SqlitePool, question_id: i64) -> Result<Vec<Solution>, sqlx::Error> {
    let mut solutions = sqlx::query_as::<_, Solution>(&format!(
        "SELECT {} FROM solutions WHERE question_id = ?",
        SOLUTION_COLUMNS
    ))
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    sort_solutions(&mut solutions);
    Ok(solutions)
}

/// Question with tags, pages (legacy fallback applied) and grouped solutions.
pub async fn question_detail(pool: &SqlitePool, id: i64) -> Result<Option<QuestionDetail>, sqlx::Error> {
    let Some(question) = find_question(pool, id).await? else {
        return Ok(None);
    };

    let tags = tags_for_question(pool, id).await?;
    let pages = pages_with_legacy_fallback(&question, question_pages(pool, id).await?);
    let solutions = question_solutions(pool, id).await?;
    let solution_groups = group_solutions(solutions.clone());

    Ok(Some(QuestionDetail {
        question,
        tags,
        pages,
        solutions,
        solution_groups,
    }))
}

pub async fn stats(pool: &SqlitePool) -> Result<Stats, sqlx::Error> {
    let courses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
        .fetch_one(pool)
        .await?;
    let questions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await?;
    let solved: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT question_id) FROM solutions")
        .fetch_one(pool)
        .await?;

    Ok(Stats::new(courses, questions, solved))
}

pub async fn recent_questions(pool: &SqlitePool) -> Result<Vec<QuestionWithCourse>, sqlx::Error> {
    sqlx::query_as::<_, QuestionWithCourse>(&format!(
        r#"
        SELECT {}, c.code AS course_code
        FROM questions q
        JOIN courses c ON q.course_id = c.id
        ORDER BY q.created_at DESC, q.id DESC
        LIMIT ?
        "#,
        QUESTION_COLUMNS
    ))
    .bind(DASHBOARD_LIMIT)
    .fetch_all(pool)
    .await
}

pub async fn unsolved_questions(pool: &SqlitePool) -> Result<Vec<QuestionWithCourse>, sqlx::Error> {
    sqlx::query_as::<_, QuestionWithCourse>(&format!(
        r#"
        SELECT {}, c.code AS course_code
        FROM questions q
        JOIN courses c ON q.course_id = c.id
        WHERE NOT EXISTS (SELECT 1 FROM solutions s WHERE s.question_id = q.id)
        ORDER BY q.created_at DESC, q.id DESC
        LIMIT ?
        "#,
        QUESTION_COLUMNS
    ))
    .bind(DASHBOARD_LIMIT)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_column_allow_list() {
        assert_eq!(SortColumn::parse(Some("year")), SortColumn::Year);
        assert_eq!(SortColumn::parse(Some("difficulty")), SortColumn::Difficulty);
        assert_eq!(SortColumn::parse(Some("title")), SortColumn::Title);
        assert_eq!(SortColumn::parse(Some("question_number")), SortColumn::QuestionNumber);
        assert_eq!(SortColumn::parse(Some("created_at")), SortColumn::CreatedAt);
        assert_eq!(SortColumn::parse(Some("\"; DROP TABLE")), SortColumn::CreatedAt);
        assert_eq!(SortColumn::parse(Some("q.id")), SortColumn::CreatedAt);
        assert_eq!(SortColumn::parse(None), SortColumn::CreatedAt);
    }

    #[test]
    fn sort_order_defaults_to_desc() {
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("descending")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("asc; --")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("integral"), "%integral%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }
}
