//! Article repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist article rows and their tag membership (`article_tags`).
//! - Provide filtered, paginated article listing.
//!
//! # Invariants
//! - Multi-statement writes run in one immediate transaction.
//! - `update_article` bumps `version` by exactly 1.
//! - Tag membership edits refresh `updated_at` but never touch `version`.
//! - Deleting an article cascades to its post-its and tag rows via foreign keys.
//! - Tag membership is keyed by `name_key`; the first spelling added is kept.

use crate::model::article::{Article, ArticlePatch};
use crate::model::id::{ArticleId, EntityKind};
use crate::model::tag::name_key;
use crate::repo::{
    bool_to_int, count_to_u64, like_substring_pattern, now_epoch_ms, offset_to_i64,
    parse_bool_column, parse_uuid_column, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const ARTICLE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    summary,
    created_at,
    updated_at,
    version,
    is_published
FROM articles";

/// Query options for listing articles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleListQuery {
    /// Keep articles carrying at least one of these tag names.
    pub tags: Vec<String>,
    /// Case-insensitive substring over title and content.
    pub search: Option<String>,
    pub limit: u32,
    pub offset: u64,
}

/// Repository interface for article persistence.
pub trait ArticleRepository {
    fn insert_article(&self, article: &Article) -> RepoResult<()>;
    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>>;
    /// Returns one page of matches plus the total match count.
    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<(Vec<Article>, u64)>;
    fn update_article(&self, id: ArticleId, patch: &ArticlePatch) -> RepoResult<()>;
    fn delete_article(&self, id: ArticleId) -> RepoResult<()>;
    fn add_tags(&self, id: ArticleId, tags: &[String]) -> RepoResult<()>;
    fn remove_tags(&self, id: ArticleId, tags: &[String]) -> RepoResult<()>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
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

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn insert_article(&self, article: &Article) -> RepoResult<()> {
        let tx = self.begin()?;
        tx.execute(
            "INSERT INTO articles (
                id,
                title,
                content,
                summary,
                created_at,
                updated_at,
                version,
                is_published
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                article.id.to_string(),
                article.title.as_str(),
                article.content.as_str(),
                article.summary.as_str(),
                article.created_at,
                article.updated_at,
                article.version,
                bool_to_int(article.is_published),
            ],
        )?;
        insert_tag_rows(&tx, article.id, &article.tags)?;
        tx.commit()?;
        Ok(())
    }

    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ARTICLE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_article_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<(Vec<Article>, u64)> {
        let mut filter = String::from(" WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.tags.is_empty() {
            let placeholders = vec!["?"; query.tags.len()].join(", ");
            filter.push_str(&format!(
                " AND EXISTS (
                    SELECT 1
                    FROM article_tags at
                    WHERE at.article_id = articles.id
                      AND at.name_key IN ({placeholders})
                )"
            ));
            bind_values.extend(query.tags.iter().map(|tag| Value::Text(name_key(tag))));
        }

        if let Some(search) = query.search.as_deref() {
            filter.push_str(
                " AND (fold_case(title) LIKE ? ESCAPE '\\' OR fold_case(content) LIKE ? ESCAPE '\\')",
            );
            let pattern = like_substring_pattern(&search.to_lowercase());
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM articles{filter};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let sql =
            format!("{ARTICLE_SELECT_SQL}{filter} ORDER BY updated_at DESC, rowid DESC LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(query.limit)));
        bind_values.push(Value::Integer(offset_to_i64(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values.iter()))?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(self.conn, row)?);
        }

        Ok((articles, count_to_u64(total)))
    }

    fn update_article(&self, id: ArticleId, patch: &ArticlePatch) -> RepoResult<()> {
        let tx = self.begin()?;
        let changed = tx.execute(
            "UPDATE articles
             SET
                title = COALESCE(?2, title),
                content = COALESCE(?3, content),
                summary = COALESCE(?4, summary),
                is_published = COALESCE(?5, is_published),
                version = version + 1,
                updated_at = MAX(?6, updated_at + 1)
             WHERE id = ?1;",
            params![
                id.to_string(),
                patch.title.as_deref(),
                patch.content.as_deref(),
                patch.summary.as_deref(),
                patch.is_published.map(bool_to_int),
                now_epoch_ms(),
            ],
        )?;
        if changed == 0 {
            return Err(not_found(id));
        }

        if let Some(tags) = patch.tags.as_ref() {
            tx.execute(
                "DELETE FROM article_tags WHERE article_id = ?1;",
                [id.to_string()],
            )?;
            insert_tag_rows(&tx, id, tags)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_article(&self, id: ArticleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM articles WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn add_tags(&self, id: ArticleId, tags: &[String]) -> RepoResult<()> {
        let tx = self.begin()?;
        touch_article(&tx, id)?;
        insert_tag_rows(&tx, id, tags)?;
        tx.commit()?;
        Ok(())
    }

    fn remove_tags(&self, id: ArticleId, tags: &[String]) -> RepoResult<()> {
        let tx = self.begin()?;
        touch_article(&tx, id)?;
        let id_text = id.to_string();
        for tag in tags {
            tx.execute(
                "DELETE FROM article_tags WHERE article_id = ?1 AND name_key = ?2;",
                params![id_text.as_str(), name_key(tag)],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn not_found(id: ArticleId) -> RepoError {
    RepoError::NotFound {
        kind: EntityKind::Article,
        id,
    }
}

fn touch_article(tx: &Transaction<'_>, id: ArticleId) -> RepoResult<()> {
    let changed = tx.execute(
        "UPDATE articles SET updated_at = MAX(?2, updated_at + 1) WHERE id = ?1;",
        params![id.to_string(), now_epoch_ms()],
    )?;
    if changed == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

// Re-adding a name in another case hits the `(article_id, name_key)` key and is a no-op.
fn insert_tag_rows(tx: &Transaction<'_>, id: ArticleId, tags: &[String]) -> RepoResult<()> {
    let id_text = id.to_string();
    for tag in tags {
        tx.execute(
            "INSERT OR IGNORE INTO article_tags (article_id, name, name_key) VALUES (?1, ?2, ?3);",
            params![id_text.as_str(), tag.as_str(), name_key(tag)],
        )?;
    }
    Ok(())
}

fn load_article_tags(conn: &Connection, article_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM article_tags
         WHERE article_id = ?1
         ORDER BY name_key ASC;",
    )?;
    let mut rows = stmt.query([article_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn parse_article_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Article> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid_column(&id_text, "articles.id")?;
    let is_published = parse_bool_column(row.get("is_published")?, "articles.is_published")?;
    let tags = load_article_tags(conn, &id_text)?;

    Ok(Article {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        summary: row.get("summary")?,
        tags,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        version: row.get("version")?,
        is_published,
    })
}
