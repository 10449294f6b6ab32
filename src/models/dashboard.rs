// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user dashboard rows: news keywords and todos.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A news filter keyword. `(owner, keyword)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Keyword {
    pub id: i64,
    pub keyword: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "user_email")]
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// A todo scheduled for a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    /// Serialized as `YYYY-MM-DD`
    pub target_date: NaiveDate,
    #[serde(skip_serializing)]
    #[sqlx(rename = "user_email")]
    pub owner: String,
    pub created_at: DateTime<Utc>,
}
