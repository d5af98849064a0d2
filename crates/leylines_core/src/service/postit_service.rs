//! Post-it use-case service.
//!
//! # Responsibility
//! - Provide note create/list/get/update/delete APIs scoped to boards.
//! - Apply default layout and color, and manage stacking order.
//!
//! # Invariants
//! - A note is only created under an existing article.
//! - `bring_to_front` leaves the note strictly above every sibling.
//! - Bulk position updates are independent per entry and report skipped ids.

use crate::model::id::{parse_id, ArticleId, EntityKind, PostItId};
use crate::model::page::{Page, PageRequest, Pagination};
use crate::model::postit::{
    BulkPositionOutcome, NewPostIt, PositionInput, PositionUpdate, PostIt, PostItPatch,
    DEFAULT_POSTIT_COLOR,
};
use crate::repo::now_epoch_ms;
use crate::repo::postit_repo::{PostItListQuery, PostItRepository};
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};
use uuid::Uuid;

pub const POSTITS_DEFAULT_LIMIT: u32 = 50;
pub const POSTITS_LIMIT_MAX: u32 = 200;

/// Post-it service facade over repository implementations.
pub struct PostItService<R: PostItRepository> {
    repo: R,
}

impl<R: PostItRepository> PostItService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one note on an existing board.
    ///
    /// # Errors
    /// - `Validation` when content is blank.
    /// - `NotFound` when the article does not exist; nothing is written.
    pub fn create(&self, input: NewPostIt) -> ServiceResult<PostIt> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(ServiceError::Validation(
                "post-it content must not be blank".to_string(),
            ));
        }
        if !self.repo.article_exists(input.article_id)? {
            return Err(ServiceError::not_found(
                EntityKind::Article,
                input.article_id,
            ));
        }

        let now = now_epoch_ms();
        let postit = PostIt {
            id: Uuid::new_v4(),
            article_id: input.article_id,
            content: content.to_string(),
            position: input.position.resolve(),
            color: input
                .color
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_POSTIT_COLOR.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.repo.insert_postit(&postit)?;
        info!(
            "event=postit_create module=service status=ok postit_id={} article_id={}",
            postit.id, postit.article_id
        );
        self.read_back(postit.id, "created post-it not found in read-back")
    }

    /// Lists one page of notes in stacking order, optionally for one board.
    pub fn find_all(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
        article_id: Option<ArticleId>,
    ) -> ServiceResult<Page<PostIt>> {
        let request = PageRequest::normalize(page, limit, POSTITS_DEFAULT_LIMIT, POSTITS_LIMIT_MAX);
        let query = PostItListQuery {
            article_id,
            limit: request.limit,
            offset: request.offset(),
        };
        let (items, total) = self.repo.list_postits(&query)?;
        Ok(Page {
            items,
            pagination: Pagination::new(request, total),
        })
    }

    /// Lists every note of one board in stacking order.
    pub fn find_by_article_id(&self, article_id: ArticleId) -> ServiceResult<Vec<PostIt>> {
        Ok(self.repo.list_by_article(article_id)?)
    }

    pub fn count_by_article_id(&self, article_id: ArticleId) -> ServiceResult<u64> {
        Ok(self.repo.count_by_article(article_id)?)
    }

    pub fn find_by_id(&self, id: PostItId) -> ServiceResult<Option<PostIt>> {
        Ok(self.repo.get_postit(id)?)
    }

    /// Gets one note or fails with `NotFound`.
    pub fn require(&self, id: PostItId) -> ServiceResult<PostIt> {
        self.repo
            .get_postit(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::PostIt, id))
    }

    /// Merges content, color and position fields onto the stored note.
    pub fn update_by_id(&self, id: PostItId, patch: PostItPatch) -> ServiceResult<PostIt> {
        self.repo.update_postit(id, &patch.normalized())?;
        self.read_back(id, "updated post-it not found in read-back")
    }

    /// Replaces the note position; missing fields take the default layout.
    pub fn update_position(&self, id: PostItId, position: PositionInput) -> ServiceResult<PostIt> {
        self.repo.set_position(id, &position.resolve())?;
        self.read_back(id, "moved post-it not found in read-back")
    }

    /// Raises the note to `max(sibling z_index) + 1`.
    pub fn bring_to_front(&self, id: PostItId) -> ServiceResult<PostIt> {
        self.repo.bring_to_front(id)?;
        self.read_back(id, "raised post-it not found in read-back")
    }

    /// Applies each position update independently.
    ///
    /// Entries with a malformed id or an id matching no note are skipped and
    /// listed in the outcome; the remaining entries are still applied.
    pub fn bulk_update_positions(
        &self,
        updates: Vec<PositionUpdate>,
    ) -> ServiceResult<BulkPositionOutcome> {
        let mut skipped_ids = Vec::new();
        let mut resolved = Vec::with_capacity(updates.len());
        for update in updates {
            match parse_id(EntityKind::PostIt, &update.id) {
                Ok(id) => resolved.push((id, update.position.resolve())),
                Err(_) => skipped_ids.push(update.id),
            }
        }

        let missing = self.repo.set_positions(&resolved)?;
        let modified_count = (resolved.len() - missing.len()) as u64;
        skipped_ids.extend(missing.iter().map(Uuid::to_string));

        if !skipped_ids.is_empty() {
            warn!(
                "event=postit_bulk_position module=service status=partial modified={} skipped={}",
                modified_count,
                skipped_ids.len()
            );
        }
        Ok(BulkPositionOutcome {
            modified_count,
            skipped_ids,
        })
    }

    pub fn delete_by_id(&self, id: PostItId) -> ServiceResult<()> {
        self.repo.delete_postit(id)?;
        Ok(())
    }

    /// Deletes every note of one board and returns how many were removed.
    pub fn delete_by_article_id(&self, article_id: ArticleId) -> ServiceResult<u64> {
        Ok(self.repo.delete_by_article(article_id)?)
    }

    fn read_back(&self, id: PostItId, details: &'static str) -> ServiceResult<PostIt> {
        self.repo
            .get_postit(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
