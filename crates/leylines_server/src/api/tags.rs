//! `/api/tags` handlers.

use super::{json_body, lenient_u32, non_blank, MessageBody};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use leylines_core::{
    parse_id, EntityKind, NewTag, PopularTag, ServiceError, SqliteTagRepository, Tag, TagPatch,
    TagService,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTagsParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    /// `true` switches the listing to tags with their article counts.
    pub with_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PopularParams {
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TagBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl From<TagBody> for NewTag {
    fn from(body: TagBody) -> Self {
        Self {
            name: body.name.unwrap_or_default(),
            description: body.description,
            color: body.color,
        }
    }
}

impl From<TagBody> for TagPatch {
    fn from(body: TagBody) -> Self {
        Self {
            name: body.name,
            description: body.description,
            color: body.color,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListTagsParams>,
) -> Result<Response, ApiError> {
    if params.with_count.as_deref() == Some("true") {
        let counted = state
            .run(|conn| TagService::new(SqliteTagRepository::new(conn)).tags_with_article_count())
            .await?;
        return Ok(Json(counted).into_response());
    }

    let search = non_blank(params.search);
    let sort_by = non_blank(params.sort_by);
    let tags = state
        .run(move |conn| {
            TagService::new(SqliteTagRepository::new(conn)).find_all(search, sort_by.as_deref())
        })
        .await?;
    Ok(Json(tags).into_response())
}

pub async fn popular(
    State(state): State<AppState>,
    Query(params): Query<PopularParams>,
) -> Result<Json<Vec<PopularTag>>, ApiError> {
    let limit = lenient_u32(params.limit.as_deref());
    let ranked = state
        .run(move |conn| TagService::new(SqliteTagRepository::new(conn)).popular_tags(limit))
        .await?;
    Ok(Json(ranked))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tag>, ApiError> {
    let tag = state
        .run(move |conn| {
            let id = parse_id(EntityKind::Tag, &id)?;
            TagService::new(SqliteTagRepository::new(conn)).require(id)
        })
        .await?;
    Ok(Json(tag))
}

pub async fn get_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Tag>, ApiError> {
    let tag = state
        .run(move |conn| {
            TagService::new(SqliteTagRepository::new(conn))
                .find_by_name(&name)?
                .ok_or(ServiceError::NotFound {
                    kind: EntityKind::Tag,
                    id: name,
                })
        })
        .await?;
    Ok(Json(tag))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<TagBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let body = json_body(payload)?;
    let tag = state
        .run(move |conn| TagService::new(SqliteTagRepository::new(conn)).create(body.into()))
        .await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TagBody>, JsonRejection>,
) -> Result<Json<Tag>, ApiError> {
    let body = json_body(payload)?;
    let tag = state
        .run(move |conn| {
            let id = parse_id(EntityKind::Tag, &id)?;
            TagService::new(SqliteTagRepository::new(conn)).update_by_id(id, body.into())
        })
        .await?;
    Ok(Json(tag))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    state
        .run(move |conn| {
            let id = parse_id(EntityKind::Tag, &id)?;
            TagService::new(SqliteTagRepository::new(conn)).delete_by_id(id)
        })
        .await?;
    Ok(MessageBody::new("Tag deleted successfully"))
}
