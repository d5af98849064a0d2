//! Tag repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the tag catalog.
//! - Maintain the soft reference between `tags.name` and `article_tags.name`.
//! - Aggregate tag usage across articles.
//!
//! # Invariants
//! - Every name comparison goes through the `name_key` columns, so names
//!   match ignoring case beyond ASCII.
//! - Deleting a tag prunes its name from every article in the same
//!   transaction, without bumping those articles' `version` or `updated_at`.

use crate::model::id::{EntityKind, TagId};
use crate::model::tag::{name_key, PopularTag, Tag, TagPatch, TagSortField, TagWithCount};
use crate::repo::{
    count_to_u64, is_unique_violation, like_substring_pattern, now_epoch_ms, parse_uuid_column,
    RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const TAG_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    color,
    created_at,
    updated_at
FROM tags";

/// Query options for listing tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagListQuery {
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    pub sort_by: TagSortField,
}

/// Repository interface for tag persistence.
pub trait TagRepository {
    /// Fails with `Conflict` when the name is already taken.
    fn insert_tag(&self, tag: &Tag) -> RepoResult<()>;
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>>;
    fn list_tags(&self, query: &TagListQuery) -> RepoResult<Vec<Tag>>;
    /// Fails with `Conflict` when a rename collides with another tag.
    fn update_tag(&self, id: TagId, patch: &TagPatch) -> RepoResult<()>;
    /// Removes the tag and its name from every article; returns the deleted tag.
    fn delete_tag(&self, id: TagId) -> RepoResult<Tag>;
    fn list_with_article_count(&self) -> RepoResult<Vec<TagWithCount>>;
    fn popular_tags(&self, limit: u32) -> RepoResult<Vec<PopularTag>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn insert_tag(&self, tag: &Tag) -> RepoResult<()> {
        let result = self.conn.execute(
            "INSERT INTO tags (
                id,
                name,
                name_key,
                description,
                color,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                tag.id.to_string(),
                tag.name.as_str(),
                name_key(&tag.name),
                tag.description.as_str(),
                tag.color.as_str(),
                tag.created_at,
                tag.updated_at,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Conflict(format!(
                "tag name `{}` already exists",
                tag.name
            ))),
            Err(err) => Err(err.into()),
        }
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        query_one_tag(self.conn, "id = ?1", id.to_string())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        query_one_tag(self.conn, "name_key = ?1", name_key(name.trim()))
    }

    fn list_tags(&self, query: &TagListQuery) -> RepoResult<Vec<Tag>> {
        let mut sql = String::from(TAG_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(search) = query.search.as_deref() {
            sql.push_str(
                " WHERE name_key LIKE ? ESCAPE '\\' OR fold_case(description) LIKE ? ESCAPE '\\'",
            );
            let pattern = like_substring_pattern(&search.to_lowercase());
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(query.sort_by.order_by());
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn update_tag(&self, id: TagId, patch: &TagPatch) -> RepoResult<()> {
        let result = self.conn.execute(
            "UPDATE tags
             SET
                name = COALESCE(?2, name),
                name_key = COALESCE(?6, name_key),
                description = COALESCE(?3, description),
                color = COALESCE(?4, color),
                updated_at = MAX(?5, updated_at + 1)
             WHERE id = ?1;",
            params![
                id.to_string(),
                patch.name.as_deref(),
                patch.description.as_deref(),
                patch.color.as_deref(),
                now_epoch_ms(),
                patch.name.as_deref().map(name_key),
            ],
        );
        match result {
            Ok(0) => Err(RepoError::NotFound {
                kind: EntityKind::Tag,
                id,
            }),
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(RepoError::Conflict(format!(
                "tag name `{}` already exists",
                patch.name.as_deref().unwrap_or_default()
            ))),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<Tag> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let Some(tag) = query_one_tag(&tx, "id = ?1", id.to_string())? else {
            return Err(RepoError::NotFound {
                kind: EntityKind::Tag,
                id,
            });
        };

        tx.execute(
            "DELETE FROM article_tags WHERE name_key = ?1;",
            [name_key(&tag.name)],
        )?;
        tx.execute("DELETE FROM tags WHERE id = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(tag)
    }

    fn list_with_article_count(&self) -> RepoResult<Vec<TagWithCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                t.id AS id,
                t.name AS name,
                t.description AS description,
                t.color AS color,
                t.created_at AS created_at,
                t.updated_at AS updated_at,
                (
                    SELECT COUNT(DISTINCT at.article_id)
                    FROM article_tags at
                    WHERE at.name_key = t.name_key
                ) AS article_count
             FROM tags t
             ORDER BY t.name_key ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            let article_count: i64 = row.get("article_count")?;
            tags.push(TagWithCount {
                tag: parse_tag_row(row)?,
                article_count: count_to_u64(article_count),
            });
        }
        Ok(tags)
    }

    fn popular_tags(&self, limit: u32) -> RepoResult<Vec<PopularTag>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                MIN(name) AS name,
                name_key,
                COUNT(DISTINCT article_id) AS usage_count
             FROM article_tags
             GROUP BY name_key
             ORDER BY usage_count DESC, name_key ASC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut ranked = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get("name")?;
            let key: String = row.get("name_key")?;
            let count: i64 = row.get("usage_count")?;
            ranked.push((name, key, count_to_u64(count)));
        }

        ranked
            .into_iter()
            .map(|(name, key, count)| {
                let tag_info = query_one_tag(self.conn, "name_key = ?1", key)?;
                Ok(PopularTag {
                    name,
                    count,
                    tag_info,
                })
            })
            .collect()
    }
}

fn query_one_tag(conn: &Connection, predicate: &str, value: String) -> RepoResult<Option<Tag>> {
    let mut stmt = conn.prepare(&format!("{TAG_SELECT_SQL} WHERE {predicate};"))?;
    let mut rows = stmt.query([value])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_tag_row(row)?));
    }
    Ok(None)
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let id_text: String = row.get("id")?;
    Ok(Tag {
        id: parse_uuid_column(&id_text, "tags.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
