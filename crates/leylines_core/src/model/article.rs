//! Article (board) model.
//!
//! # Responsibility
//! - Define the canonical article record and its create/update inputs.
//! - Own tag-name normalization shared by create, update and membership edits.
//!
//! # Invariants
//! - `title` is never blank; a blank title is replaced by the id string.
//! - `version` starts at 1 and grows by exactly 1 per `updateById`.
//! - `tags` holds trimmed, non-blank names, unique ignoring ASCII case.

use crate::model::id::ArticleId;
use crate::model::tag::name_key;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Summary given to boards created through the quick-create path.
pub const QUICK_BOARD_SUMMARY: &str = "New post-it board";

/// Canonical article record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    pub summary: String,
    /// Tag names, sorted case-insensitively. Soft references to `Tag::name`.
    pub tags: Vec<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Strictly increases on every mutation.
    pub updated_at: i64,
    pub version: i64,
    pub is_published: bool,
}

/// Input for creating an article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewArticle {
    /// Blank means "use the generated id".
    pub title: String,
    pub content: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub is_published: bool,
}

impl NewArticle {
    /// Empty, unpublished board with the quick-create summary.
    pub fn quick() -> Self {
        Self {
            summary: QUICK_BOARD_SUMMARY.to_string(),
            ..Self::default()
        }
    }
}

/// Partial update for an article; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    /// Replaces the whole tag set when present.
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

impl ArticlePatch {
    /// Trims text fields, drops a blank title and normalizes tags.
    pub fn normalized(self) -> Self {
        Self {
            title: self
                .title
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            content: self.content.map(|value| value.trim().to_string()),
            summary: self.summary.map(|value| value.trim().to_string()),
            tags: self.tags.map(|tags| normalize_tags(&tags)),
            is_published: self.is_published,
        }
    }
}

/// Normalizes one tag name: trimmed, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims, drops blanks and removes case-insensitive duplicates.
///
/// The first spelling of a name wins; input order is otherwise kept.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for tag in tags {
        if let Some(value) = normalize_tag(tag) {
            if seen.insert(name_key(&value)) {
                unique.push(value);
            }
        }
    }
    unique
}
