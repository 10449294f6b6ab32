// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Today's events from the user's primary Google calendar.

use crate::error::{AppError, Result};
use crate::models::CalendarEvent;
use crate::time_utils::{day_window, today_in};
use crate::AppState;
use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/calendar", get(todays_events))
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<CalendarEvent>,
}

/// Needs the token cookie rather than the identity cookie, so it is not
/// behind the session gate.
async fn todays_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<EventsResponse>> {
    let jar = state.sessions.jar(&headers);
    let tokens = state
        .sessions
        .read_tokens(&jar)
        .ok_or(AppError::NotAuthenticated)?;

    let tz = state.config.timezone;
    let (time_min, time_max) = day_window(tz, today_in(tz, Utc::now()));

    let events = state
        .calendar
        .list_events(&tokens.access_token, &time_min, &time_max, tz.name())
        .await?;

    Ok(Json(EventsResponse { events }))
}
