// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::tables::{KEYWORDS, TODOS};
use super::{StoreError, MAX_KEYWORDS, UNOWNED};
use crate::models::{Keyword, Owner, Todo};
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Lazily connecting pool. An in-memory database lives only as long as its
/// connection, so it gets exactly one that is never recycled.
pub(super) fn connect(url: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let in_memory = url.contains(":memory:") || url.contains("mode=memory");

    let pool = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    Ok(pool.connect_lazy_with(options))
}

pub(super) async fn create_tables(pool: &SqlitePool) -> Result<(), StoreError> {
    let tables = [
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {KEYWORDS} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                keyword TEXT NOT NULL,
                user_email TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {TODOS} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                target_date DATE NOT NULL,
                user_email TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL
            )
            "#
        ),
    ];

    for statement in &tables {
        sqlx::query(statement).execute(pool).await?;
    }

    // Tables from before per-user scoping have no owner column.
    for table in [KEYWORDS, TODOS] {
        let has_owner: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM pragma_table_info('{table}') WHERE name = 'user_email'"
        ))
        .fetch_one(pool)
        .await?;
        if has_owner == 0 {
            sqlx::query(&format!(
                "ALTER TABLE {table} ADD COLUMN user_email TEXT DEFAULT ''"
            ))
            .execute(pool)
            .await?;
        }
    }

    let indexes = [
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_{KEYWORDS}_user_keyword ON {KEYWORDS} (user_email, keyword)"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{TODOS}_user_date ON {TODOS} (user_email, target_date)"
        ),
    ];

    for statement in &indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

pub(super) async fn list_keywords(pool: &SqlitePool, owner: &Owner) -> Result<Vec<Keyword>, StoreError> {
    let keywords = sqlx::query_as::<_, Keyword>(&format!(
        r#"
        SELECT id, keyword, user_email, created_at FROM {KEYWORDS}
        WHERE user_email = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#
    ))
    .bind(owner.as_str())
    .bind(MAX_KEYWORDS)
    .fetch_all(pool)
    .await?;

    Ok(keywords)
}

pub(super) async fn add_keyword(
    pool: &SqlitePool,
    owner: &Owner,
    keyword: &str,
) -> Result<Keyword, StoreError> {
    let inserted = sqlx::query_as::<_, Keyword>(&format!(
        r#"
        INSERT INTO {KEYWORDS} (keyword, user_email, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT (user_email, keyword) DO NOTHING
        RETURNING id, keyword, user_email, created_at
        "#
    ))
    .bind(keyword)
    .bind(owner.as_str())
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    if let Some(keyword) = inserted {
        return Ok(keyword);
    }

    let existing = sqlx::query_as::<_, Keyword>(&format!(
        r#"
        SELECT id, keyword, user_email, created_at FROM {KEYWORDS}
        WHERE user_email = ? AND keyword = ?
        "#
    ))
    .bind(owner.as_str())
    .bind(keyword)
    .fetch_one(pool)
    .await?;

    Ok(existing)
}

pub(super) async fn delete_keyword(pool: &SqlitePool, owner: &Owner, id: i64) -> Result<u64, StoreError> {
    let result = sqlx::query(&format!("DELETE FROM {KEYWORDS} WHERE id = ? AND user_email = ?"))
        .bind(id)
        .bind(owner.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub(super) async fn list_todos(
    pool: &SqlitePool,
    owner: &Owner,
    from: NaiveDate,
) -> Result<Vec<Todo>, StoreError> {
    let todos = sqlx::query_as::<_, Todo>(&format!(
        r#"
        SELECT id, text, target_date, user_email, created_at FROM {TODOS}
        WHERE user_email = ? AND target_date >= ?
        ORDER BY target_date ASC, id ASC
        "#
    ))
    .bind(owner.as_str())
    .bind(from)
    .fetch_all(pool)
    .await?;

    Ok(todos)
}

pub(super) async fn list_todos_by_date(
    pool: &SqlitePool,
    owner: &Owner,
    date: NaiveDate,
) -> Result<Vec<Todo>, StoreError> {
    let todos = sqlx::query_as::<_, Todo>(&format!(
        r#"
        SELECT id, text, target_date, user_email, created_at FROM {TODOS}
        WHERE user_email = ? AND target_date = ?
        ORDER BY id ASC
        "#
    ))
    .bind(owner.as_str())
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(todos)
}

pub(super) async fn add_todo(
    pool: &SqlitePool,
    owner: &Owner,
    text: &str,
    target_date: NaiveDate,
) -> Result<Todo, StoreError> {
    let todo = sqlx::query_as::<_, Todo>(&format!(
        r#"
        INSERT INTO {TODOS} (text, target_date, user_email, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, text, target_date, user_email, created_at
        "#
    ))
    .bind(text)
    .bind(target_date)
    .bind(owner.as_str())
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(todo)
}

pub(super) async fn delete_todo(pool: &SqlitePool, owner: &Owner, id: i64) -> Result<u64, StoreError> {
    let result = sqlx::query(&format!("DELETE FROM {TODOS} WHERE id = ? AND user_email = ?"))
        .bind(id)
        .bind(owner.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub(super) async fn count_unowned(pool: &SqlitePool) -> Result<i64, StoreError> {
    let count: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT (SELECT COUNT(*) FROM {KEYWORDS} WHERE {UNOWNED})
             + (SELECT COUNT(*) FROM {TODOS} WHERE {UNOWNED})
        "#
    ))
    .fetch_one(pool)
    .await?;

    Ok(count)
}

pub(super) async fn backfill_unowned(pool: &SqlitePool, owner: &Owner) -> Result<u64, StoreError> {
    let mut tx = pool.begin().await?;

    // Keep one unowned row per keyword, and none the owner already has.
    sqlx::query(&format!(
        r#"
        DELETE FROM {KEYWORDS}
        WHERE {UNOWNED}
          AND (keyword IN (SELECT keyword FROM {KEYWORDS} WHERE user_email = ?)
               OR id NOT IN (SELECT MIN(id) FROM {KEYWORDS} WHERE {UNOWNED} GROUP BY keyword))
        "#
    ))
    .bind(owner.as_str())
    .execute(&mut *tx)
    .await?;

    let keywords = sqlx::query(&format!("UPDATE {KEYWORDS} SET user_email = ? WHERE {UNOWNED}"))
        .bind(owner.as_str())
        .execute(&mut *tx)
        .await?;

    let todos = sqlx::query(&format!("UPDATE {TODOS} SET user_email = ? WHERE {UNOWNED}"))
        .bind(owner.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(keywords.rows_affected() + todos.rows_affected())
}

pub(super) async fn discard_unowned(pool: &SqlitePool) -> Result<u64, StoreError> {
    let mut tx = pool.begin().await?;

    let keywords = sqlx::query(&format!("DELETE FROM {KEYWORDS} WHERE {UNOWNED}"))
        .execute(&mut *tx)
        .await?;
    let todos = sqlx::query(&format!("DELETE FROM {TODOS} WHERE {UNOWNED}"))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(keywords.rows_affected() + todos.rows_affected())
}
