//! Post-it repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes and their flattened position columns.
//! - Own stacking-order (`z_index`) reads and writes.
//!
//! # Invariants
//! - Listings are ordered by `z_index ASC, created_at ASC`, then insertion order.
//! - `bring_to_front` reads the sibling maximum and writes in one transaction.
//!   When the maximum is already `i64::MAX` it fails with `Conflict` and
//!   writes nothing.
//! - Bulk position writes share one transaction; a missing id is skipped,
//!   never rolled back together with the other entries.

use crate::model::id::{ArticleId, EntityKind, PostItId};
use crate::model::postit::{Position, PostIt, PostItPatch};
use crate::repo::{
    count_to_u64, now_epoch_ms, offset_to_i64, parse_uuid_column, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const POSTIT_SELECT_SQL: &str = "SELECT
    id,
    article_id,
    content,
    pos_x,
    pos_y,
    width,
    height,
    z_index,
    color,
    created_at,
    updated_at
FROM postits";

const POSTIT_ORDER_SQL: &str = " ORDER BY z_index ASC, created_at ASC, rowid ASC";

/// Query options for listing post-its.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostItListQuery {
    pub article_id: Option<ArticleId>,
    pub limit: u32,
    pub offset: u64,
}

/// Repository interface for post-it persistence.
pub trait PostItRepository {
    fn article_exists(&self, article_id: ArticleId) -> RepoResult<bool>;
    fn insert_postit(&self, postit: &PostIt) -> RepoResult<()>;
    fn get_postit(&self, id: PostItId) -> RepoResult<Option<PostIt>>;
    /// Returns one page of matches plus the total match count.
    fn list_postits(&self, query: &PostItListQuery) -> RepoResult<(Vec<PostIt>, u64)>;
    fn list_by_article(&self, article_id: ArticleId) -> RepoResult<Vec<PostIt>>;
    fn count_by_article(&self, article_id: ArticleId) -> RepoResult<u64>;
    /// Merges the patch onto the stored row.
    fn update_postit(&self, id: PostItId, patch: &PostItPatch) -> RepoResult<()>;
    /// Replaces the stored position wholesale.
    fn set_position(&self, id: PostItId, position: &Position) -> RepoResult<()>;
    /// Raises the note above every sibling on its board.
    ///
    /// Fails with `Conflict` when no higher `z_index` exists.
    fn bring_to_front(&self, id: PostItId) -> RepoResult<()>;
    /// Applies every entry and returns the ids that matched no row.
    fn set_positions(&self, updates: &[(PostItId, Position)]) -> RepoResult<Vec<PostItId>>;
    fn delete_postit(&self, id: PostItId) -> RepoResult<()>;
    fn delete_by_article(&self, article_id: ArticleId) -> RepoResult<u64>;
}

/// SQLite-backed post-it repository.
pub struct SqlitePostItRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostItRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl PostItRepository for SqlitePostItRepository<'_> {
    fn article_exists(&self, article_id: ArticleId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM articles WHERE id = ?1);",
            [article_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn insert_postit(&self, postit: &PostIt) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO postits (
                id,
                article_id,
                content,
                pos_x,
                pos_y,
                width,
                height,
                z_index,
                color,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                postit.id.to_string(),
                postit.article_id.to_string(),
                postit.content.as_str(),
                postit.position.x,
                postit.position.y,
                postit.position.width,
                postit.position.height,
                postit.position.z_index,
                postit.color.as_str(),
                postit.created_at,
                postit.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_postit(&self, id: PostItId) -> RepoResult<Option<PostIt>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POSTIT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_postit_row(row)?));
        }
        Ok(None)
    }

    fn list_postits(&self, query: &PostItListQuery) -> RepoResult<(Vec<PostIt>, u64)> {
        let mut filter = String::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(article_id) = query.article_id {
            filter.push_str(" WHERE article_id = ?");
            bind_values.push(Value::Text(article_id.to_string()));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM postits{filter};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let sql = format!("{POSTIT_SELECT_SQL}{filter}{POSTIT_ORDER_SQL} LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(query.limit)));
        bind_values.push(Value::Integer(offset_to_i64(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values.iter()))?;
        let mut postits = Vec::new();
        while let Some(row) = rows.next()? {
            postits.push(parse_postit_row(row)?);
        }
        Ok((postits, count_to_u64(total)))
    }

    fn list_by_article(&self, article_id: ArticleId) -> RepoResult<Vec<PostIt>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POSTIT_SELECT_SQL} WHERE article_id = ?1{POSTIT_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([article_id.to_string()])?;
        let mut postits = Vec::new();
        while let Some(row) = rows.next()? {
            postits.push(parse_postit_row(row)?);
        }
        Ok(postits)
    }

    fn count_by_article(&self, article_id: ArticleId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM postits WHERE article_id = ?1;",
            [article_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count_to_u64(count))
    }

    fn update_postit(&self, id: PostItId, patch: &PostItPatch) -> RepoResult<()> {
        let position = patch.position.unwrap_or_default();
        let changed = self.conn.execute(
            "UPDATE postits
             SET
                content = COALESCE(?2, content),
                color = COALESCE(?3, color),
                pos_x = COALESCE(?4, pos_x),
                pos_y = COALESCE(?5, pos_y),
                width = COALESCE(?6, width),
                height = COALESCE(?7, height),
                z_index = COALESCE(?8, z_index),
                updated_at = MAX(?9, updated_at + 1)
             WHERE id = ?1;",
            params![
                id.to_string(),
                patch.content.as_deref(),
                patch.color.as_deref(),
                position.x,
                position.y,
                position.width,
                position.height,
                position.z_index,
                now_epoch_ms(),
            ],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn set_position(&self, id: PostItId, position: &Position) -> RepoResult<()> {
        if write_position(self.conn, id, position)? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    fn bring_to_front(&self, id: PostItId) -> RepoResult<()> {
        let tx = self.begin()?;
        let article_id: Option<String> = {
            let mut stmt = tx.prepare("SELECT article_id FROM postits WHERE id = ?1;")?;
            let mut rows = stmt.query([id.to_string()])?;
            match rows.next()? {
                Some(row) => Some(row.get(0)?),
                None => None,
            }
        };
        let Some(article_id) = article_id else {
            return Err(not_found(id));
        };

        let max_z_index: i64 = tx.query_row(
            "SELECT COALESCE(MAX(z_index), 0) FROM postits WHERE article_id = ?1;",
            [article_id.as_str()],
            |row| row.get(0),
        )?;
        let Some(next_z_index) = max_z_index.checked_add(1) else {
            return Err(RepoError::Conflict(
                "stacking order is exhausted on this board; lower a zIndex first".to_string(),
            ));
        };
        tx.execute(
            "UPDATE postits
             SET
                z_index = ?2,
                updated_at = MAX(?3, updated_at + 1)
             WHERE id = ?1;",
            params![id.to_string(), next_z_index, now_epoch_ms()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn set_positions(&self, updates: &[(PostItId, Position)]) -> RepoResult<Vec<PostItId>> {
        let tx = self.begin()?;
        let mut missing = Vec::new();
        for (id, position) in updates {
            if !write_position(&tx, *id, position)? {
                missing.push(*id);
            }
        }
        tx.commit()?;
        Ok(missing)
    }

    fn delete_postit(&self, id: PostItId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM postits WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn delete_by_article(&self, article_id: ArticleId) -> RepoResult<u64> {
        let changed = self.conn.execute(
            "DELETE FROM postits WHERE article_id = ?1;",
            [article_id.to_string()],
        )?;
        Ok(changed as u64)
    }
}

fn not_found(id: PostItId) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::PostIt,
        id,
    }
}

/// Returns `false` when no row matched `id`.
fn write_position(conn: &Connection, id: PostItId, position: &Position) -> RepoResult<bool> {
    let changed = conn.execute(
        "UPDATE postits
         SET
            pos_x = ?2,
            pos_y = ?3,
            width = ?4,
            height = ?5,
            z_index = ?6,
            updated_at = MAX(?7, updated_at + 1)
         WHERE id = ?1;",
        params![
            id.to_string(),
            position.x,
            position.y,
            position.width,
            position.height,
            position.z_index,
            now_epoch_ms(),
        ],
    )?;
    Ok(changed > 0)
}

fn parse_postit_row(row: &Row<'_>) -> RepoResult<PostIt> {
    let id_text: String = row.get("id")?;
    let article_id_text: String = row.get("article_id")?;

    Ok(PostIt {
        id: parse_uuid_column(&id_text, "postits.id")?,
        article_id: parse_uuid_column(&article_id_text, "postits.article_id")?,
        content: row.get("content")?,
        position: Position {
            x: row.get("pos_x")?,
            y: row.get("pos_y")?,
            width: row.get("width")?,
            height: row.get("height")?,
            z_index: row.get("z_index")?,
        },
        color: row.get("color")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
