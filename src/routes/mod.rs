// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod auth;
pub mod calendar;
pub mod keywords;
pub mod todos;

use crate::error::{AppError, Result};
use crate::middleware::require_session;
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

/// `{"ok": true}`
#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// `?id=` on delete routes.
#[derive(Deserialize)]
pub struct IdParams {
    #[serde(default)]
    id: Option<String>,
}

/// Positive integer row id, or 400 `id_required`.
pub(crate) fn parse_id(params: &IdParams) -> Result<i64> {
    params
        .id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or(AppError::BadRequest("id_required"))
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from the app URL and localhost (for dev)
    let app_url = state.config.app_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == app_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(auth::routes())
        .merge(calendar::routes());

    // Per-user routes (identity cookie required)
    let protected_routes = Router::new()
        .merge(keywords::routes())
        .merge(todos::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: Option<&str>) -> Result<i64> {
        parse_id(&IdParams {
            id: raw.map(str::to_string),
        })
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(id(Some("42")).unwrap(), 42);
        assert_eq!(id(Some(" 7 ")).unwrap(), 7);
    }

    #[test]
    fn test_parse_id_rejects_missing_and_non_positive() {
        for raw in [None, Some(""), Some("abc"), Some("0"), Some("-3"), Some("1.5")] {
            assert!(
                matches!(id(raw), Err(AppError::BadRequest("id_required"))),
                "id {raw:?}"
            );
        }
    }
}
