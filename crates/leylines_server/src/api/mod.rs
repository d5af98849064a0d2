//! HTTP handlers grouped by resource.
//!
//! # Invariants
//! - Handlers parse ids inside the store closure so malformed ids surface as
//!   `ServiceError::MalformedId`.
//! - Query parameters are parsed leniently: unparsable numbers fall back to
//!   their defaults instead of failing the request.

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Serialize;

pub mod articles;
pub mod postits;
pub mod request_log;
pub mod system;
pub mod tags;

/// `{ "message": ... }` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Unwraps a JSON body, turning extractor rejections into 400 responses.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(ApiError::from)
}

/// Parses an optional numeric query value; anything unparsable is `None`.
pub(crate) fn lenient_u32(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// Treats a blank query value as absent.
pub(crate) fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
