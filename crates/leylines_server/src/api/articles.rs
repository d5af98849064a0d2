//! `/api/articles` handlers.

use super::{json_body, lenient_u32, non_blank, MessageBody};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use leylines_core::{
    parse_id, Article, ArticlePatch, ArticleService, EntityKind, NewArticle, Pagination, PostIt,
    PostItService, SqliteArticleRepository, SqlitePostItRepository,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ListArticlesParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Comma-separated tag names.
    pub tags: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArticleList {
    pub articles: Vec<Article>,
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

impl From<CreateArticleBody> for NewArticle {
    fn from(body: CreateArticleBody) -> Self {
        Self {
            title: body.title.unwrap_or_default(),
            content: body.content.unwrap_or_default(),
            summary: body.summary.unwrap_or_default(),
            tags: body.tags.unwrap_or_default(),
            is_published: body.is_published.unwrap_or(false),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

impl From<UpdateArticleBody> for ArticlePatch {
    fn from(body: UpdateArticleBody) -> Self {
        Self {
            title: body.title,
            content: body.content,
            summary: body.summary,
            tags: body.tags,
            is_published: body.is_published,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TagsBody {
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePostIts {
    pub article_id: String,
    pub article_title: String,
    pub postits: Vec<PostIt>,
    pub count: u64,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListArticlesParams>,
) -> Result<Json<ArticleList>, ApiError> {
    let page = lenient_u32(params.page.as_deref());
    let limit = lenient_u32(params.limit.as_deref());
    let tags = params
        .tags
        .map(|raw| raw.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    let search = non_blank(params.search);

    let listed = state
        .run(move |conn| {
            ArticleService::new(SqliteArticleRepository::new(conn))
                .find_all(page, limit, tags, search)
        })
        .await?;
    Ok(Json(ArticleList {
        articles: listed.items,
        pagination: listed.pagination,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    let article = state
        .run(move |conn| {
            let id = parse_id(EntityKind::Article, &id)?;
            ArticleService::new(SqliteArticleRepository::new(conn)).require(id)
        })
        .await?;
    Ok(Json(article))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateArticleBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let body = json_body(payload)?;
    let article = state
        .run(move |conn| {
            ArticleService::new(SqliteArticleRepository::new(conn)).create(body.into())
        })
        .await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn quick_create(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    let article = state
        .run(|conn| ArticleService::new(SqliteArticleRepository::new(conn)).quick_create())
        .await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateArticleBody>, JsonRejection>,
) -> Result<Json<Article>, ApiError> {
    let body = json_body(payload)?;
    let article = state
        .run(move |conn| {
            let id = parse_id(EntityKind::Article, &id)?;
            ArticleService::new(SqliteArticleRepository::new(conn)).update_by_id(id, body.into())
        })
        .await?;
    Ok(Json(article))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    state
        .run(move |conn| {
            let id = parse_id(EntityKind::Article, &id)?;
            ArticleService::new(SqliteArticleRepository::new(conn)).delete_by_id(id)
        })
        .await?;
    Ok(MessageBody::new(
        "Article and associated post-its deleted successfully",
    ))
}

pub async fn add_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TagsBody>, JsonRejection>,
) -> Result<Json<Article>, ApiError> {
    let tags = required_tags(json_body(payload)?)?;
    let article = state
        .run(move |conn| {
            let id = parse_id(EntityKind::Article, &id)?;
            ArticleService::new(SqliteArticleRepository::new(conn)).add_tags(id, tags)
        })
        .await?;
    Ok(Json(article))
}

pub async fn remove_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TagsBody>, JsonRejection>,
) -> Result<Json<Article>, ApiError> {
    let tags = required_tags(json_body(payload)?)?;
    let article = state
        .run(move |conn| {
            let id = parse_id(EntityKind::Article, &id)?;
            ArticleService::new(SqliteArticleRepository::new(conn)).remove_tags(id, tags)
        })
        .await?;
    Ok(Json(article))
}

pub async fn list_postits(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArticlePostIts>, ApiError> {
    let listing = state
        .run(move |conn| {
            let id = parse_id(EntityKind::Article, &id)?;
            let article = ArticleService::new(SqliteArticleRepository::new(conn)).require(id)?;
            let postit_service = PostItService::new(SqlitePostItRepository::new(conn));
            let postits = postit_service.find_by_article_id(id)?;
            let count = postit_service.count_by_article_id(id)?;
            Ok(ArticlePostIts {
                article_id: article.id.to_string(),
                article_title: article.title,
                postits,
                count,
            })
        })
        .await?;
    Ok(Json(listing))
}

fn required_tags(body: TagsBody) -> Result<Vec<String>, ApiError> {
    body.tags
        .ok_or_else(|| ApiError::bad_request("Tags must be provided as an array"))
}
