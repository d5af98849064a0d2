//! Core domain logic for the leylines post-it board backend.
//! This crate is the single source of truth for board, note and tag invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, Store, StoreLocation};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::article::{Article, ArticlePatch, NewArticle};
pub use model::id::{parse_id, ArticleId, EntityKind, MalformedId, PostItId, TagId};
pub use model::page::{Page, Pagination};
pub use model::postit::{
    BulkPositionOutcome, NewPostIt, Position, PositionInput, PositionUpdate, PostIt, PostItPatch,
};
pub use model::tag::{NewTag, PopularTag, Tag, TagPatch, TagWithCount};
pub use repo::article_repo::SqliteArticleRepository;
pub use repo::postit_repo::SqlitePostItRepository;
pub use repo::tag_repo::SqliteTagRepository;
pub use repo::{RepoError, RepoResult};
pub use service::article_service::ArticleService;
pub use service::postit_service::PostItService;
pub use service::tag_service::TagService;
pub use service::{ServiceError, ServiceResult};
