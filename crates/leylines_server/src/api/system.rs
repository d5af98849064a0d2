//! Service banner, health check and fallback route.

use crate::error::ApiError;
use axum::Json;
use log::error;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct Banner {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: String,
}

pub async fn banner() -> Json<Banner> {
    Json(Banner {
        message: "Leylines post-it board API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

pub async fn health() -> Result<Json<Health>, ApiError> {
    let timestamp = OffsetDateTime::now_utc().format(&Rfc3339).map_err(|err| {
        error!(
            "event=health module=api status=error error_code=timestamp_format error={}",
            err
        );
        ApiError::internal()
    })?;
    Ok(Json(Health {
        status: "OK",
        timestamp,
    }))
}

pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
