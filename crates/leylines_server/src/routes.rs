//! Router assembly.

use crate::api::{articles, postits, request_log, system, tags};
use crate::state::AppState;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::from_fn;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Hardening headers added to every response that does not set them itself.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "no-referrer"),
    ("x-dns-prefetch-control", "off"),
    ("content-security-policy", "default-src 'none'; frame-ancestors 'self'"),
];

/// Builds the full HTTP surface over `state`.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(system::banner))
        .route("/api/health", get(system::health))
        .route(
            "/api/articles",
            get(articles::list).post(articles::create),
        )
        .route("/api/articles/quick", post(articles::quick_create))
        .route(
            "/api/articles/:id",
            get(articles::get)
                .put(articles::update)
                .delete(articles::delete),
        )
        .route(
            "/api/articles/:id/tags",
            post(articles::add_tags).delete(articles::remove_tags),
        )
        .route("/api/articles/:id/postits", get(articles::list_postits))
        .route("/api/postits", get(postits::list).post(postits::create))
        .route(
            "/api/postits/bulk-update-positions",
            post(postits::bulk_update_positions),
        )
        .route(
            "/api/postits/:id",
            get(postits::get).put(postits::update).delete(postits::delete),
        )
        .route("/api/postits/:id/position", patch(postits::update_position))
        .route(
            "/api/postits/:id/bring-to-front",
            post(postits::bring_to_front),
        )
        .route("/api/tags", get(tags::list).post(tags::create))
        .route("/api/tags/popular", get(tags::popular))
        .route("/api/tags/name/:name", get(tags::get_by_name))
        .route(
            "/api/tags/:id",
            get(tags::get).put(tags::update).delete(tags::delete),
        )
        .fallback(system::route_not_found);

    with_security_headers(router)
        .layer(from_fn(request_log::log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn with_security_headers(router: Router<AppState>) -> Router<AppState> {
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}
