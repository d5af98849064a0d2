//! Record identifiers and identifier parsing.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identifier of an article (board).
pub type ArticleId = Uuid;
/// Identifier of a post-it note.
pub type PostItId = Uuid;
/// Identifier of a tag.
pub type TagId = Uuid;

/// The three record kinds kept by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Article,
    PostIt,
    Tag,
}

impl EntityKind {
    /// Capitalized label used at the start of user-facing messages.
    pub fn title(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::PostIt => "Post-it",
            Self::Tag => "Tag",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Article => "article",
            Self::PostIt => "post-it",
            Self::Tag => "tag",
        };
        f.write_str(label)
    }
}

/// Raised when a caller-supplied id is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedId {
    pub kind: EntityKind,
    pub value: String,
}

impl Display for MalformedId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} id format: `{}`", self.kind, self.value)
    }
}

impl Error for MalformedId {}

/// Parses a caller-supplied identifier for the given record kind.
pub fn parse_id(kind: EntityKind, raw: &str) -> Result<Uuid, MalformedId> {
    Uuid::parse_str(raw.trim()).map_err(|_| MalformedId {
        kind,
        value: raw.to_string(),
    })
}
