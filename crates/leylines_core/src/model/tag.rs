//! Tag model.
//!
//! # Invariants
//! - `name` is unique under [`name_key`], a Unicode lowercase mapping.
//! - Articles reference tags by name only; a tag is never owned by an article.

use crate::model::id::TagId;
use serde::{Deserialize, Serialize};

/// Default tag color (blue).
pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

/// Lookup key for a tag name: the Unicode lowercase form.
///
/// Matches the SQL `fold_case` function, so keys written from Rust and keys
/// backfilled by migrations agree.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Canonical tag record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub description: String,
    pub color: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// Tag plus the number of articles currently referencing its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    pub article_count: u64,
}

/// Tag name ranked by article usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularTag {
    pub name: String,
    pub count: u64,
    /// `None` when articles still use a name whose tag record is gone.
    pub tag_info: Option<Tag>,
}

/// Input for creating a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Partial update for a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl TagPatch {
    /// Trims text fields; a blank name or color leaves the stored value.
    pub fn normalized(self) -> Self {
        Self {
            name: self
                .name
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            description: self.description.map(|value| value.trim().to_string()),
            color: self
                .color
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        }
    }
}

/// Sort key for tag listings (always ascending).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagSortField {
    #[default]
    Name,
    Description,
    Color,
    CreatedAt,
    UpdatedAt,
}

impl TagSortField {
    /// Parses the API spelling (`createdAt`) or the column spelling (`created_at`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "color" => Some(Self::Color),
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    /// `ORDER BY` expression for this key.
    pub fn order_by(self) -> &'static str {
        match self {
            Self::Name => "name_key ASC",
            Self::Description => "fold_case(description) ASC, name_key ASC",
            Self::Color => "color ASC, name_key ASC",
            Self::CreatedAt => "created_at ASC, rowid ASC",
            Self::UpdatedAt => "updated_at ASC, rowid ASC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{name_key, TagPatch, TagSortField};

    #[test]
    fn name_key_lowercases_beyond_ascii() {
        assert_eq!(name_key("Été"), name_key("été"));
        assert_eq!(name_key("ΣΟΦΙΑ"), "σοφια");
        assert_ne!(name_key("Research"), name_key("Researcher"));
    }

    #[test]
    fn sort_field_accepts_api_and_column_spellings() {
        assert_eq!(TagSortField::parse("createdAt"), Some(TagSortField::CreatedAt));
        assert_eq!(TagSortField::parse("updated_at"), Some(TagSortField::UpdatedAt));
        assert_eq!(TagSortField::parse("popularity"), None);
    }

    #[test]
    fn patch_normalization_keeps_empty_description() {
        let patch = TagPatch {
            name: Some(" ".to_string()),
            description: Some("  ".to_string()),
            color: None,
        }
        .normalized();
        assert_eq!(patch.name, None);
        assert_eq!(patch.description.as_deref(), Some(""));
    }
}
