//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Translate repository failures into the error kinds callers act on.
//!
//! # Invariants
//! - Services never bypass repository persistence contracts.
//! - Every failure surfaces on the same call; nothing is retried.

use crate::db::DbError;
use crate::model::id::{EntityKind, MalformedId};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod article_service;
pub mod postit_service;
pub mod tag_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error kinds shared by the article, post-it and tag services.
#[derive(Debug)]
pub enum ServiceError {
    /// Referenced record does not exist.
    NotFound { kind: EntityKind, id: String },
    /// Write would break a uniqueness rule (tag names).
    Conflict(String),
    /// Required input is missing or unusable.
    Validation(String),
    /// Caller-supplied id is not in the store's id syntax.
    MalformedId(MalformedId),
    /// Write succeeded but read-back disagrees with it.
    InconsistentState(&'static str),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.title()),
            Self::Conflict(message) => write!(f, "{message}"),
            Self::Validation(message) => write!(f, "{message}"),
            Self::MalformedId(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedId(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::not_found(kind, id),
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

impl From<MalformedId> for ServiceError {
    fn from(value: MalformedId) -> Self {
        Self::MalformedId(value)
    }
}
