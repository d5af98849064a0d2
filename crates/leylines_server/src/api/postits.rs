//! `/api/postits` handlers.

use super::{json_body, lenient_u32, non_blank, MessageBody};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use leylines_core::{
    parse_id, BulkPositionOutcome, EntityKind, NewPostIt, Pagination, PositionInput,
    PositionUpdate, PostIt, PostItPatch, PostItService, SqlitePostItRepository,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostItsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub article_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostItList {
    pub postits: Vec<PostIt>,
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostItBody {
    pub content: Option<String>,
    pub article_id: Option<String>,
    pub position: Option<PositionInput>,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostItBody {
    pub content: Option<String>,
    pub position: Option<PositionInput>,
    pub color: Option<String>,
}

impl From<UpdatePostItBody> for PostItPatch {
    fn from(body: UpdatePostItBody) -> Self {
        Self {
            content: body.content,
            position: body.position,
            color: body.color,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PositionBody {
    pub position: Option<PositionInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkPositionsBody {
    pub updates: Option<Vec<PositionUpdate>>,
}

#[derive(Debug, Serialize)]
pub struct BulkPositionsResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: BulkPositionOutcome,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListPostItsParams>,
) -> Result<Json<PostItList>, ApiError> {
    let page = lenient_u32(params.page.as_deref());
    let limit = lenient_u32(params.limit.as_deref());
    let article_id = non_blank(params.article_id);

    let listed = state
        .run(move |conn| {
            let article_id = article_id
                .map(|raw| parse_id(EntityKind::Article, &raw))
                .transpose()?;
            PostItService::new(SqlitePostItRepository::new(conn)).find_all(page, limit, article_id)
        })
        .await?;
    Ok(Json(PostItList {
        postits: listed.items,
        pagination: listed.pagination,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostIt>, ApiError> {
    let postit = state
        .run(move |conn| {
            let id = parse_id(EntityKind::PostIt, &id)?;
            PostItService::new(SqlitePostItRepository::new(conn)).require(id)
        })
        .await?;
    Ok(Json(postit))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostItBody>, JsonRejection>,
) -> Result<(StatusCode, Json<PostIt>), ApiError> {
    let body = json_body(payload)?;
    let (Some(content), Some(article_id)) = (non_blank(body.content), non_blank(body.article_id))
    else {
        return Err(ApiError::bad_request("Content and articleId are required"));
    };

    let postit = state
        .run(move |conn| {
            let article_id = parse_id(EntityKind::Article, &article_id)?;
            PostItService::new(SqlitePostItRepository::new(conn)).create(NewPostIt {
                article_id,
                content,
                position: body.position.unwrap_or_default(),
                color: body.color,
            })
        })
        .await?;
    Ok((StatusCode::CREATED, Json(postit)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePostItBody>, JsonRejection>,
) -> Result<Json<PostIt>, ApiError> {
    let body = json_body(payload)?;
    let postit = state
        .run(move |conn| {
            let id = parse_id(EntityKind::PostIt, &id)?;
            PostItService::new(SqlitePostItRepository::new(conn)).update_by_id(id, body.into())
        })
        .await?;
    Ok(Json(postit))
}

pub async fn update_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PositionBody>, JsonRejection>,
) -> Result<Json<PostIt>, ApiError> {
    let position = json_body(payload)?
        .position
        .ok_or_else(|| ApiError::bad_request("Position data is required"))?;
    let postit = state
        .run(move |conn| {
            let id = parse_id(EntityKind::PostIt, &id)?;
            PostItService::new(SqlitePostItRepository::new(conn)).update_position(id, position)
        })
        .await?;
    Ok(Json(postit))
}

pub async fn bring_to_front(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostIt>, ApiError> {
    let postit = state
        .run(move |conn| {
            let id = parse_id(EntityKind::PostIt, &id)?;
            PostItService::new(SqlitePostItRepository::new(conn)).bring_to_front(id)
        })
        .await?;
    Ok(Json(postit))
}

pub async fn bulk_update_positions(
    State(state): State<AppState>,
    payload: Result<Json<BulkPositionsBody>, JsonRejection>,
) -> Result<Json<BulkPositionsResponse>, ApiError> {
    let updates = json_body(payload)?
        .updates
        .ok_or_else(|| ApiError::bad_request("Updates array is required"))?;
    if updates.is_empty() {
        return Ok(Json(BulkPositionsResponse {
            message: "No updates provided".to_string(),
            outcome: BulkPositionOutcome::default(),
        }));
    }

    let outcome = state
        .run(move |conn| {
            PostItService::new(SqlitePostItRepository::new(conn)).bulk_update_positions(updates)
        })
        .await?;
    Ok(Json(BulkPositionsResponse {
        message: format!("{} post-its updated successfully", outcome.modified_count),
        outcome,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    state
        .run(move |conn| {
            let id = parse_id(EntityKind::PostIt, &id)?;
            PostItService::new(SqlitePostItRepository::new(conn)).delete_by_id(id)
        })
        .await?;
    Ok(MessageBody::new("Post-it deleted successfully"))
}
