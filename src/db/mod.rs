// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user data store (SQLite or Postgres via sqlx).
//!
//! Every operation takes the caller's [`Owner`] first and filters on it; the
//! store trusts whatever owner it is given. The pool and schema are set up by
//! the first operation, exactly once per `Store`, however many requests race
//! to trigger it.

pub mod postgres;
pub mod sqlite;

use crate::models::{Keyword, Owner, Todo};
use chrono::NaiveDate;
use sqlx::{PgPool, SqlitePool};
use tokio::sync::OnceCell;

/// Table names as constants.
pub mod tables {
    pub const KEYWORDS: &str = "news_keywords";
    pub const TODOS: &str = "todos";
}

/// Most keywords returned by [`Store::list_keywords`].
pub const MAX_KEYWORDS: i64 = 50;

/// Data store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("DATABASE_URL is not set")]
    NotConfigured,

    #[error("Unsupported database URL scheme: {0}")]
    UnsupportedUrl(String),

    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

enum Backend {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

/// Owner-scoped store for keywords and todos.
pub struct Store {
    database_url: Option<String>,
    backend: OnceCell<Backend>,
}

impl Store {
    /// Create a store. No I/O happens until the first operation.
    pub fn new(database_url: Option<String>) -> Self {
        Self {
            database_url,
            backend: OnceCell::new(),
        }
    }

    /// Pool + schema, initialized once. A failed initialization is reported
    /// to every caller waiting on it and retried by the next call.
    async fn backend(&self) -> Result<&Backend, StoreError> {
        self.backend.get_or_try_init(|| self.initialize()).await
    }

    async fn initialize(&self) -> Result<Backend, StoreError> {
        let url = self
            .database_url
            .as_deref()
            .ok_or(StoreError::NotConfigured)?;

        let backend = if url.starts_with("sqlite:") {
            let pool = sqlite::connect(url)?;
            sqlite::create_tables(&pool).await?;
            Backend::Sqlite(pool)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            let pool = postgres::connect(url)?;
            postgres::create_tables(&pool).await?;
            Backend::Postgres(pool)
        } else {
            let scheme = url.split(':').next().unwrap_or_default().to_string();
            return Err(StoreError::UnsupportedUrl(scheme));
        };

        tracing::info!(
            backend = match backend {
                Backend::Sqlite(_) => "sqlite",
                Backend::Postgres(_) => "postgres",
            },
            "Data store schema ready"
        );
        Ok(backend)
    }

    // ─── Keywords ────────────────────────────────────────────────

    /// Newest first, at most [`MAX_KEYWORDS`].
    pub async fn list_keywords(&self, owner: &Owner) -> Result<Vec<Keyword>, StoreError> {
        match self.backend().await? {
            Backend::Sqlite(pool) => sqlite::list_keywords(pool, owner).await,
            Backend::Postgres(pool) => postgres::list_keywords(pool, owner).await,
        }
    }

    /// Insert a trimmed keyword. Adding one the owner already has returns the
    /// existing row unchanged.
    pub async fn add_keyword(&self, owner: &Owner, keyword: &str) -> Result<Keyword, StoreError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(StoreError::InvalidInput("keyword must not be blank"));
        }

        match self.backend().await? {
            Backend::Sqlite(pool) => sqlite::add_keyword(pool, owner, keyword).await,
            Backend::Postgres(pool) => postgres::add_keyword(pool, owner, keyword).await,
        }
    }

    /// Delete the owner's keyword `id`. Returns rows affected (0 when the id
    /// does not exist or belongs to someone else).
    pub async fn delete_keyword(&self, owner: &Owner, id: i64) -> Result<u64, StoreError> {
        match self.backend().await? {
            Backend::Sqlite(pool) => sqlite::delete_keyword(pool, owner, id).await,
            Backend::Postgres(pool) => postgres::delete_keyword(pool, owner, id).await,
        }
    }

    // ─── Todos ───────────────────────────────────────────────────

    /// Todos on or after `from`, by date then id.
    pub async fn list_todos(&self, owner: &Owner, from: NaiveDate) -> Result<Vec<Todo>, StoreError> {
        match self.backend().await? {
            Backend::Sqlite(pool) => sqlite::list_todos(pool, owner, from).await,
            Backend::Postgres(pool) => postgres::list_todos(pool, owner, from).await,
        }
    }

    /// Todos on exactly `date`, by id.
    pub async fn list_todos_by_date(
        &self,
        owner: &Owner,
        date: NaiveDate,
    ) -> Result<Vec<Todo>, StoreError> {
        match self.backend().await? {
            Backend::Sqlite(pool) => sqlite::list_todos_by_date(pool, owner, date).await,
            Backend::Postgres(pool) => postgres::list_todos_by_date(pool, owner, date).await,
        }
    }

    /// Stores `text` trimmed, like keywords.
    pub async fn add_todo(
        &self,
        owner: &Owner,
        text: &str,
        target_date: NaiveDate,
    ) -> Result<Todo, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::InvalidInput("todo text must not be blank"));
        }

        match self.backend().await? {
            Backend::Sqlite(pool) => sqlite::add_todo(pool, owner, text, target_date).await,
            Backend::Postgres(pool) => postgres::add_todo(pool, owner, text, target_date).await,
        }
    }

    /// Same owner-scoped, zero-rows-on-mismatch semantics as keywords.
    pub async fn delete_todo(&self, owner: &Owner, id: i64) -> Result<u64, StoreError> {
        match self.backend().await? {
            Backend::Sqlite(pool) => sqlite::delete_todo(pool, owner, id).await,
            Backend::Postgres(pool) => postgres::delete_todo(pool, owner, id).await,
        }
    }

    // ─── Legacy unowned rows ─────────────────────────────────────
    //
    // Databases written by the old unscoped variant hold rows whose
    // `user_email` is '' or NULL. No request path reads them; these
    // operations exist to migrate them once.

    /// Number of unowned keyword + todo rows.
    pub async fn count_unowned(&self) -> Result<i64, StoreError> {
        match self.backend().await? {
            Backend::Sqlite(pool) => sqlite::count_unowned(pool).await,
            Backend::Postgres(pool) => postgres::count_unowned(pool).await,
        }
    }

    /// Assign every unowned row to `owner`. Unowned keywords the owner
    /// already has are dropped instead of duplicated. Returns rows assigned.
    pub async fn backfill_unowned(&self, owner: &Owner) -> Result<u64, StoreError> {
        match self.backend().await? {
            Backend::Sqlite(pool) => sqlite::backfill_unowned(pool, owner).await,
            Backend::Postgres(pool) => postgres::backfill_unowned(pool, owner).await,
        }
    }

    /// Delete every unowned row. Returns rows deleted.
    pub async fn discard_unowned(&self) -> Result<u64, StoreError> {
        match self.backend().await? {
            Backend::Sqlite(pool) => sqlite::discard_unowned(pool).await,
            Backend::Postgres(pool) => postgres::discard_unowned(pool).await,
        }
    }
}

/// `WHERE` fragment matching legacy rows without an owner.
const UNOWNED: &str = "(user_email IS NULL OR user_email = '')";
