//! Tag use-case service.
//!
//! # Responsibility
//! - Provide tag create/list/get/update/delete APIs.
//! - Enforce case-insensitive name uniqueness with readable conflicts.
//! - Report tag usage across articles.
//!
//! # Invariants
//! - Two tags never share a name ignoring ASCII case.
//! - Deleting a tag removes its name from every article's tag list.

use crate::model::id::{EntityKind, TagId};
use crate::model::tag::{
    NewTag, PopularTag, Tag, TagPatch, TagSortField, TagWithCount, DEFAULT_TAG_COLOR,
};
use crate::repo::now_epoch_ms;
use crate::repo::tag_repo::{TagListQuery, TagRepository};
use crate::service::{ServiceError, ServiceResult};
use log::info;
use uuid::Uuid;

pub const POPULAR_TAGS_DEFAULT_LIMIT: u32 = 10;

/// Tag service facade over repository implementations.
pub struct TagService<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one tag.
    ///
    /// # Errors
    /// - `Validation` when the name is blank.
    /// - `Conflict` when the name exists in any letter case.
    pub fn create(&self, input: NewTag) -> ServiceResult<Tag> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("Tag name is required".to_string()));
        }
        if self.repo.find_by_name(name)?.is_some() {
            return Err(ServiceError::Conflict("Tag already exists".to_string()));
        }

        let now = now_epoch_ms();
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: input
                .description
                .map(|value| value.trim().to_string())
                .unwrap_or_default(),
            color: input
                .color
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.repo.insert_tag(&tag)?;
        info!(
            "event=tag_create module=service status=ok tag_id={}",
            tag.id
        );
        self.read_back(tag.id, "created tag not found in read-back")
    }

    /// Lists tags, optionally filtered by a name/description substring.
    pub fn find_all(
        &self,
        search: Option<String>,
        sort_by: Option<&str>,
    ) -> ServiceResult<Vec<Tag>> {
        let sort_by = match sort_by.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => TagSortField::parse(raw).ok_or_else(|| {
                ServiceError::Validation(format!("unsupported tag sort field `{raw}`"))
            })?,
            None => TagSortField::default(),
        };
        let query = TagListQuery {
            search: search
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            sort_by,
        };
        Ok(self.repo.list_tags(&query)?)
    }

    pub fn find_by_id(&self, id: TagId) -> ServiceResult<Option<Tag>> {
        Ok(self.repo.get_tag(id)?)
    }

    /// Gets one tag or fails with `NotFound`.
    pub fn require(&self, id: TagId) -> ServiceResult<Tag> {
        self.repo
            .get_tag(id)?
            .ok_or_else(|| ServiceError::not_found(EntityKind::Tag, id))
    }

    /// Looks a tag up by name, ignoring case.
    pub fn find_by_name(&self, name: &str) -> ServiceResult<Option<Tag>> {
        Ok(self.repo.find_by_name(name)?)
    }

    /// Applies the patch; a rename must not collide with another tag.
    pub fn update_by_id(&self, id: TagId, patch: TagPatch) -> ServiceResult<Tag> {
        let patch = patch.normalized();
        if self.repo.get_tag(id)?.is_none() {
            return Err(ServiceError::not_found(EntityKind::Tag, id));
        }
        if let Some(name) = patch.name.as_deref() {
            if let Some(existing) = self.repo.find_by_name(name)? {
                if existing.id != id {
                    return Err(ServiceError::Conflict(
                        "Tag name already exists".to_string(),
                    ));
                }
            }
        }

        self.repo.update_tag(id, &patch)?;
        self.read_back(id, "updated tag not found in read-back")
    }

    /// Removes the tag name from every article, then deletes the tag.
    pub fn delete_by_id(&self, id: TagId) -> ServiceResult<()> {
        let deleted = self.repo.delete_tag(id)?;
        info!(
            "event=tag_delete module=service status=ok tag_id={} name={}",
            id, deleted.name
        );
        Ok(())
    }

    /// Every tag with the number of articles referencing its name.
    pub fn tags_with_article_count(&self) -> ServiceResult<Vec<TagWithCount>> {
        Ok(self.repo.list_with_article_count()?)
    }

    /// Top `limit` tag names by article usage, most used first.
    pub fn popular_tags(&self, limit: Option<u32>) -> ServiceResult<Vec<PopularTag>> {
        let limit = match limit {
            Some(0) | None => POPULAR_TAGS_DEFAULT_LIMIT,
            Some(value) => value,
        };
        Ok(self.repo.popular_tags(limit)?)
    }

    fn read_back(&self, id: TagId, details: &'static str) -> ServiceResult<Tag> {
        self.repo
            .get_tag(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
