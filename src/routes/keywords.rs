// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! News keyword routes (session required).

use crate::error::{AppError, Result};
use crate::models::{Keyword, Owner};
use crate::routes::{parse_id, IdParams, OkResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/keywords",
        get(list_keywords).post(add_keyword).delete(delete_keyword),
    )
}

#[derive(Serialize)]
pub struct KeywordsResponse {
    pub keywords: Vec<Keyword>,
}

#[derive(Serialize)]
pub struct KeywordResponse {
    pub keyword: Keyword,
}

#[derive(Deserialize)]
pub struct NewKeyword {
    keyword: String,
}

async fn list_keywords(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
) -> Result<Json<KeywordsResponse>> {
    let keywords = state
        .store
        .list_keywords(&owner)
        .await
        .map_err(AppError::store("failed_to_load"))?;

    Ok(Json(KeywordsResponse { keywords }))
}

async fn add_keyword(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    payload: std::result::Result<Json<NewKeyword>, JsonRejection>,
) -> Result<Json<KeywordResponse>> {
    let Json(body) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected keyword body");
        AppError::BadRequest("invalid_keyword")
    })?;

    let keyword = body.keyword.trim();
    if keyword.is_empty() {
        return Err(AppError::BadRequest("invalid_keyword"));
    }

    let keyword = state
        .store
        .add_keyword(&owner, keyword)
        .await
        .map_err(AppError::store("failed_to_create"))?;

    Ok(Json(KeywordResponse { keyword }))
}

async fn delete_keyword(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Query(params): Query<IdParams>,
) -> Result<Json<OkResponse>> {
    let id = parse_id(&params)?;

    let deleted = state
        .store
        .delete_keyword(&owner, id)
        .await
        .map_err(AppError::store("failed_to_delete"))?;
    tracing::debug!(id, deleted, "Keyword delete");

    Ok(Json(OkResponse { ok: true }))
}
