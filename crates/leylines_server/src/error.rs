//! HTTP error mapping.
//!
//! # Responsibility
//! - Map service error kinds onto HTTP status codes.
//! - Render every failure as a `{"error": "<message>"}` body.
//!
//! # Invariants
//! - 5xx bodies never carry internal details; the cause is logged instead.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use leylines_core::ServiceError;
use log::error;
use serde_json::json;
use std::fmt::{Display, Formatter};

const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

/// Error returned by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::NotFound { kind, .. } => {
                Self::not_found(format!("{} not found", kind.title()))
            }
            ServiceError::Conflict(message) => Self::new(StatusCode::CONFLICT, message),
            ServiceError::Validation(message) => Self::bad_request(message),
            ServiceError::MalformedId(err) => {
                Self::bad_request(format!("Invalid {} ID format", err.kind))
            }
            other @ (ServiceError::InconsistentState(_) | ServiceError::Repo(_)) => {
                error!(
                    "event=request_failed module=api status=error error_code=internal error={}",
                    other
                );
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::bad_request(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
