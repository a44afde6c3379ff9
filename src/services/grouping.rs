// src/services/grouping.rs

//! Solution grouping and part ordering.
//!
//! Solutions are stored as flat rows. Rows sharing a `group_id` form one logical
//! solution whose parts are ordered by `page_order`. `page_order` is assigned from
//! the question's row count at insert time, so it increases across groups and is
//! never re-packed after deletion.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{
    page::{LEGACY_PAGE_ID, PageId, PageView, QuestionPage},
    question::Question,
    solution::Solution,
};

/// One logical solution: ordered parts sharing a group key.
#[derive(Debug, Clone, Serialize)]
pub struct SolutionGroup {
    /// `group_id`, or `legacy-<row id>` for rows without one.
    pub id: String,
    /// Title of the group's first part.
    pub title: Option<String>,
    pub parts: Vec<Solution>,
}

/// Effective group key of a solution row.
pub fn group_key(row: &Solution) -> String {
    match row.group_id.as_deref() {
        Some(group_id) if !group_id.is_empty() => group_id.to_string(),
        _ => format!("legacy-{}", row.id),
    }
}

/// Sorts rows by `(page_order, created_at, id)`.
pub fn sort_solutions(rows: &mut [Solution]) {
    rows.sort_by(|a, b| {
        a.page_order
            .cmp(&b.page_order)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Groups a question's solution rows.
///
/// Groups are emitted in the order their earliest row sorts; each row lands in
/// exactly one group.
pub fn group_solutions(mut rows: Vec<Solution>) -> Vec<SolutionGroup> {
    sort_solutions(&mut rows);

    let mut groups: Vec<SolutionGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = group_key(&row);
        let slot = match positions.get(&key) {
            Some(&slot) => slot,
            None => {
                groups.push(SolutionGroup {
                    id: key.clone(),
                    title: row.title.clone(),
                    parts: Vec::new(),
                });
                positions.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].parts.push(row);
    }

    groups
}

/// Pages to present for a question.
///
/// Stored pages are returned in `page_order`. A question with no stored pages but
/// a legacy image or notes gets one virtual page with id `"legacy"`.
pub fn pages_with_legacy_fallback(question: &Question, mut pages: Vec<QuestionPage>) -> Vec<PageView> {
    if pages.is_empty() {
        let image_path = non_blank(question.image_path.as_deref());
        let notes = non_blank(question.notes.as_deref());
        if image_path.is_none() && notes.is_none() {
            return Vec::new();
        }
        return vec![PageView {
            id: PageId::Virtual(LEGACY_PAGE_ID),
            question_id: question.id,
            image_path,
            content: notes,
            page_order: 0,
            created_at: question.created_at,
        }];
    }

    pages.sort_by(|a, b| a.page_order.cmp(&b.page_order).then_with(|| a.id.cmp(&b.id)));
    pages.into_iter().map(PageView::from).collect()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

/// A row to insert for one part of a page or solution group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartPlan {
    pub page_order: i64,
    pub image_path: Option<String>,
    pub content: String,
}

/// Lays out the rows for a multi-part insert.
///
/// With N images, N parts are planned at `next_order..next_order + N`; only the
/// first carries `content`. With no images, a single text-only part is planned
/// at `next_order`.
pub fn plan_parts(next_order: i64, content: &str, image_paths: &[String]) -> Vec<PartPlan> {
    if image_paths.is_empty() {
        return vec![PartPlan {
            page_order: next_order,
            image_path: None,
            content: content.to_string(),
        }];
    }

    image_paths
        .iter()
        .enumerate()
        .map(|(index, path)| PartPlan {
            page_order: next_order + index as i64,
            image_path: Some(path.clone()),
            content: if index == 0 {
                content.to_string()
            } else {
                String::new()
            },
        })
        .collect()
}

/// Fresh identifier for a new solution group.
pub fn new_group_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
