// src/models/tag.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'tags' table in the database.
/// Tags are global and survive when no question links to them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
}
