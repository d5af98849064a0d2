//! Post-it note model.
//!
//! # Responsibility
//! - Define the note record, its board position and its inputs.
//! - Own the default layout applied when callers omit position fields.
//!
//! # Invariants
//! - A note always belongs to exactly one article.
//! - A stored position is always complete; optional fields only exist on inputs.

use crate::model::id::{ArticleId, PostItId};
use serde::{Deserialize, Serialize};

/// Default note color (yellow).
pub const DEFAULT_POSTIT_COLOR: &str = "#FBBF24";
pub const DEFAULT_POSTIT_WIDTH: f64 = 200.0;
pub const DEFAULT_POSTIT_HEIGHT: f64 = 150.0;
pub const DEFAULT_Z_INDEX: i64 = 1;

/// Layout of a note on its board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Stacking order among the notes of one board; higher is in front.
    pub z_index: i64,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: DEFAULT_POSTIT_WIDTH,
            height: DEFAULT_POSTIT_HEIGHT,
            z_index: DEFAULT_Z_INDEX,
        }
    }
}

/// Position as supplied by callers, any field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInput {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub z_index: Option<i64>,
}

impl PositionInput {
    /// Fills missing fields from the default layout.
    pub fn resolve(&self) -> Position {
        self.merge_onto(Position::default())
    }

    /// Fills missing fields from `base`.
    pub fn merge_onto(&self, base: Position) -> Position {
        Position {
            x: self.x.unwrap_or(base.x),
            y: self.y.unwrap_or(base.y),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            z_index: self.z_index.unwrap_or(base.z_index),
        }
    }
}

impl From<Position> for PositionInput {
    fn from(value: Position) -> Self {
        Self {
            x: Some(value.x),
            y: Some(value.y),
            width: Some(value.width),
            height: Some(value.height),
            z_index: Some(value.z_index),
        }
    }
}

/// Canonical post-it record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIt {
    pub id: PostItId,
    pub article_id: ArticleId,
    pub content: String,
    pub position: Position,
    pub color: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Strictly increases on every mutation.
    pub updated_at: i64,
}

/// Input for creating a post-it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPostIt {
    pub article_id: ArticleId,
    pub content: String,
    pub position: PositionInput,
    /// `None` or blank falls back to [`DEFAULT_POSTIT_COLOR`].
    pub color: Option<String>,
}

/// Partial update for a post-it.
///
/// `position` is merged field by field onto the stored position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostItPatch {
    pub content: Option<String>,
    pub position: Option<PositionInput>,
    pub color: Option<String>,
}

impl PostItPatch {
    /// Trims text fields; blank content or color leaves the stored value.
    pub fn normalized(self) -> Self {
        Self {
            content: non_blank(self.content),
            position: self.position,
            color: non_blank(self.color),
        }
    }
}

/// One entry of a bulk position update. The id stays raw so a malformed
/// entry can be skipped instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: String,
    #[serde(default)]
    pub position: PositionInput,
}

/// Result of a bulk position update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPositionOutcome {
    pub modified_count: u64,
    /// Ids that were malformed or matched no post-it, in request order.
    pub skipped_ids: Vec<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
