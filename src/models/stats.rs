// src/models/stats.rs

use serde::{Deserialize, Serialize};

/// Dashboard counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub courses: i64,
    pub questions: i64,
    /// Questions with at least one solution row.
    pub solved: i64,
    pub unsolved: i64,
}

impl Stats {
    pub fn new(courses: i64, questions: i64, solved: i64) -> Self {
        Stats {
            courses,
            questions,
            solved,
            unsolved: (questions - solved).max(0),
        }
    }
}
