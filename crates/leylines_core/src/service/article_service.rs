//! Article use-case service.
//!
//! # Responsibility
//! - Provide article create/list/get/update/delete APIs.
//! - Own the blank-title rule and tag membership edits.
//!
//! # Invariants
//! - A created article with a blank title is titled after its own id.
//! - `update_by_id` bumps `version` by exactly 1 whatever fields change.
//! - List results are sorted by `updated_at DESC`.

use crate::model::article::{normalize_tags, Article, ArticlePatch, NewArticle};
use crate::model::id::{ArticleId, EntityKind};
use crate::model::page::{Page, PageRequest, Pagination};
use crate::repo::article_repo::{ArticleListQuery, ArticleRepository};
use crate::repo::now_epoch_ms;
use crate::service::{ServiceError, ServiceResult};
use log::info;
use uuid::Uuid;

pub const ARTICLES_DEFAULT_LIMIT: u32 = 10;
pub const ARTICLES_LIMIT_MAX: u32 = 100;

/// Article service facade over repository implementations.
pub struct ArticleService<R: ArticleRepository> {
    repo: R,
}

impl<R: ArticleRepository> ArticleService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one article and returns the stored record.
    pub fn create(&self, input: NewArticle) -> ServiceResult<Article> {
        let id = Uuid::new_v4();
        let now = now_epoch_ms();
        let title = match input.title.trim() {
            "" => id.to_string(),
            trimmed => trimmed.to_string(),
        };
        let article = Article {
            id,
            title,
            content: input.content.trim().to_string(),
            summary: input.summary.trim().to_string(),
            tags: normalize_tags(&input.tags),
            created_at: now,
            updated_at: now,
            version: 1,
            is_published: input.is_published,
        };

        self.repo.insert_article(&article)?;
        info!("event=article_create module=service status=ok article_id={id}");
        self.read_back(id, "created article not found in read-back")
    }

    /// Creates an empty, unpublished board titled after its id.
    pub fn quick_create(&self) -> ServiceResult<Article> {
        self.create(NewArticle::quick())
    }

    /// Lists one page of articles, newest update first.
    ///
    /// `tags` keeps articles carrying any of the names; `search` matches
    /// title or content as a case-insensitive substring.
    pub fn find_all(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
        tags: Vec<String>,
        search: Option<String>,
    ) -> ServiceResult<Page<Article>> {
        let request = PageRequest::normalize(page, limit, ARTICLES_DEFAULT_LIMIT, ARTICLES_LIMIT_MAX);
        let query = ArticleListQuery {
            tags: normalize_tags(&tags),
            search: search
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            limit: request.limit,
            offset: request.offset(),
        };
        let (items, total) = self.repo.list_articles(&query)?;
        Ok(Page {
            items,
            pagination: Pagination::new(request, total),
        })
    }

    /// Gets one article by id.
    pub fn find_by_id(&self, id: ArticleId) -> ServiceResult<Option<Article>> {
        Ok(self.repo.get_article(id)?)
    }

    /// Merges the patch, refreshes `updated_at` and bumps `version`.
    pub fn update_by_id(&self, id: ArticleId, patch: ArticlePatch) -> ServiceResult<Article> {
        self.repo.update_article(id, &patch.normalized())?;
        self.read_back(id, "updated article not found in read-back")
    }

    /// Deletes the article together with all of its post-its.
    pub fn delete_by_id(&self, id: ArticleId) -> ServiceResult<()> {
        self.repo.delete_article(id)?;
        info!("event=article_delete module=service status=ok article_id={id}");
        Ok(())
    }

    /// Adds tag names to the article (set union).
    pub fn add_tags(&self, id: ArticleId, tags: Vec<String>) -> ServiceResult<Article> {
        self.repo.add_tags(id, &normalize_tags(&tags))?;
        self.read_back(id, "article missing after tag union")
    }

    /// Removes tag names from the article (set difference).
    pub fn remove_tags(&self, id: ArticleId, tags: Vec<String>) -> ServiceResult<Article> {
        self.repo.remove_tags(id, &normalize_tags(&tags))?;
        self.read_back(id, "article missing after tag removal")
    }

    /// Gets one article or fails with `NotFound`.
    pub fn require(&self, id: ArticleId) -> ServiceResult<Article> {
        self.repo
            .get_article(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Article, id))
    }

    fn read_back(&self, id: ArticleId, details: &'static str) -> ServiceResult<Article> {
        self.repo
            .get_article(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
