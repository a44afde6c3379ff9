// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,

    /// Short course code (e.g., "MATH101").
    pub code: String,

    pub title: String,

    pub description: Option<String>,

    /// Position in the sidebar. Lower values come first.
    pub sort_order: i64,

    pub created_at: Option<chrono::NaiveDateTime>,
}

/// Column list shared by every query that loads a `Course`.
pub const COURSE_COLUMNS: &str =
    "id, code, title, description, COALESCE(sort_order, 0) AS sort_order, created_at";

/// DTO for creating a new course.
/// Fields are optional so that a missing value surfaces as a validation error
/// instead of a deserialization rejection.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(
        required(message = "Code and Title are required"),
        length(max = 50),
        custom(function = validate_not_blank)
    )]
    pub code: Option<String>,
    #[validate(
        required(message = "Code and Title are required"),
        length(max = 200),
        custom(function = validate_not_blank)
    )]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

/// DTO for updating a course. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(max = 50), custom(function = validate_not_blank))]
    pub code: Option<String>,
    #[validate(length(max = 200), custom(function = validate_not_blank))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

impl UpdateCourseRequest {
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.title.is_none() && self.description.is_none()
    }
}

/// One entry of a reorder request.
#[derive(Debug, Deserialize)]
pub struct CourseOrder {
    pub id: i64,
    pub sort_order: i64,
}

/// DTO for `POST /courses/reorder`.
#[derive(Debug, Deserialize)]
pub struct ReorderCoursesRequest {
    pub orders: Vec<CourseOrder>,
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("must_not_be_blank"));
    }
    Ok(())
}
