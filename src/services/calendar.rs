// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Calendar client for today's events on the primary calendar.

use crate::error::AppError;
use crate::models::CalendarEvent;
use serde::Deserialize;

const MAX_EVENTS: &str = "15";

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    #[serde(default)]
    start: EventTime,
    #[serde(default)]
    end: EventTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date: Option<String>,
    date_time: Option<String>,
}

impl EventTime {
    fn display(&self) -> String {
        self.date_time
            .clone()
            .or_else(|| self.date.clone())
            .unwrap_or_default()
    }
}

impl From<ApiEvent> for CalendarEvent {
    fn from(event: ApiEvent) -> Self {
        let start = event.start.display();
        let summary = event.summary.unwrap_or_else(|| "(untitled)".to_string());
        let id = event.id.unwrap_or_else(|| {
            let start_key = event.start.date.clone().unwrap_or_else(|| start.clone());
            format!("{start_key}-{summary}")
        });

        CalendarEvent {
            id,
            all_day: event.start.date.is_some(),
            end: event.end.display(),
            start,
            summary,
            location: event.location,
        }
    }
}

/// Calendar v3 API client.
#[derive(Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl CalendarClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// List single events in `[time_min, time_max)`, ordered by start time.
    pub async fn list_events(
        &self,
        access_token: &str,
        time_min: &str,
        time_max: &str,
        time_zone: &str,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let url = format!("{}/calendars/primary/events", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min),
                ("timeMax", time_max),
                ("timeZone", time_zone),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", MAX_EVENTS),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Calendar request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Calendar HTTP {}: {}", status, body)));
        }

        let list: EventList = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Calendar JSON parse error: {}", e)))?;

        Ok(list.items.into_iter().map(CalendarEvent::from).collect())
    }
}
