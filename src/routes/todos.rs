// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Todo routes (session required).

use crate::error::{AppError, Result};
use crate::models::{Owner, Todo};
use crate::routes::{parse_id, IdParams, OkResponse};
use crate::time_utils::today_in;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/todos", get(list_todos).post(add_todo).delete(delete_todo))
}

#[derive(Serialize)]
pub struct TodosResponse {
    pub todos: Vec<Todo>,
}

#[derive(Serialize)]
pub struct TodoResponse {
    pub todo: Todo,
}

#[derive(Deserialize)]
pub struct TodoListParams {
    #[serde(default)]
    date: Option<String>,
}

#[derive(Deserialize)]
pub struct NewTodo {
    text: String,
    /// `YYYY-MM-DD`
    target_date: NaiveDate,
}

/// Which todos a `GET /todos` asks for.
#[derive(Debug, PartialEq)]
enum TodoFilter {
    /// Exactly this day.
    On(NaiveDate),
    /// This day and later.
    From(NaiveDate),
}

impl TodoFilter {
    fn parse(date: Option<&str>, today: NaiveDate) -> Result<Self> {
        match date.map(str::trim) {
            None | Some("") => Ok(TodoFilter::From(today)),
            Some("today") => Ok(TodoFilter::On(today)),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(TodoFilter::From)
                .map_err(|_| AppError::BadRequest("invalid_date")),
        }
    }
}

async fn list_todos(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Query(params): Query<TodoListParams>,
) -> Result<Json<TodosResponse>> {
    let today = today_in(state.config.timezone, Utc::now());

    let todos = match TodoFilter::parse(params.date.as_deref(), today)? {
        TodoFilter::On(date) => state.store.list_todos_by_date(&owner, date).await,
        TodoFilter::From(date) => state.store.list_todos(&owner, date).await,
    }
    .map_err(AppError::store("failed_to_load"))?;

    Ok(Json(TodosResponse { todos }))
}

async fn add_todo(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    payload: std::result::Result<Json<NewTodo>, JsonRejection>,
) -> Result<Json<TodoResponse>> {
    let Json(body) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected todo body");
        AppError::BadRequest("invalid_body")
    })?;

    let text = body.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("invalid_body"));
    }

    let todo = state
        .store
        .add_todo(&owner, text, body.target_date)
        .await
        .map_err(AppError::store("failed_to_create"))?;

    Ok(Json(TodoResponse { todo }))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<Owner>,
    Query(params): Query<IdParams>,
) -> Result<Json<OkResponse>> {
    let id = parse_id(&params)?;

    let deleted = state
        .store
        .delete_todo(&owner, id)
        .await
        .map_err(AppError::store("failed_to_delete"))?;
    tracing::debug!(id, deleted, "Todo delete");

    Ok(Json(OkResponse { ok: true }))
}
