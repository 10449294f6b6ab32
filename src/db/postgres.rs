// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::tables::{KEYWORDS, TODOS};
use super::{StoreError, MAX_KEYWORDS, UNOWNED};
use crate::models::{Keyword, Owner, Todo};
use chrono::{NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

// Tables created by older deployments use SERIAL (INT4) ids.
const KEYWORD_COLUMNS: &str = "id::BIGINT AS id, keyword, user_email, created_at";
const TODO_COLUMNS: &str = "id::BIGINT AS id, text, target_date, user_email, created_at";

pub(super) fn connect(url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new().max_connections(5).connect_lazy(url)?;
    Ok(pool)
}

pub(super) async fn create_tables(pool: &PgPool) -> Result<(), StoreError> {
    let tables = [
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {KEYWORDS} (
                id BIGSERIAL PRIMARY KEY,
                keyword TEXT NOT NULL,
                user_email TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {TODOS} (
                id BIGSERIAL PRIMARY KEY,
                text TEXT NOT NULL,
                target_date DATE NOT NULL,
                user_email TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#
        ),
    ];

    for statement in &tables {
        sqlx::query(statement).execute(pool).await?;
    }

    // Tables from before per-user scoping have no owner column.
    for table in [KEYWORDS, TODOS] {
        sqlx::query(&format!(
            "ALTER TABLE {table} ADD COLUMN IF NOT EXISTS user_email TEXT DEFAULT ''"
        ))
        .execute(pool)
        .await?;
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

pub(super) async fn list_keywords(pool: &PgPool, owner: &Owner) -> Result<Vec<Keyword>, StoreError> {
    let keywords = sqlx::query_as::<_, Keyword>(&format!(
        r#"
        SELECT {KEYWORD_COLUMNS} FROM {KEYWORDS}
        WHERE user_email = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#
    ))
    .bind(owner.as_str())
    .bind(MAX_KEYWORDS)
    .fetch_all(pool)
    .await?;

    Ok(keywords)
}

pub(super) async fn add_keyword(pool: &PgPool, owner: &Owner, keyword: &str) -> Result<Keyword, StoreError> {
    let inserted = sqlx::query_as::<_, Keyword>(&format!(
        r#"
        INSERT INTO {KEYWORDS} (keyword, user_email, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_email, keyword) DO NOTHING
        RETURNING {KEYWORD_COLUMNS}
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
        SELECT {KEYWORD_COLUMNS} FROM {KEYWORDS}
        WHERE user_email = $1 AND keyword = $2
        "#
    ))
    .bind(owner.as_str())
    .bind(keyword)
    .fetch_one(pool)
    .await?;

    Ok(existing)
}

pub(super) async fn delete_keyword(pool: &PgPool, owner: &Owner, id: i64) -> Result<u64, StoreError> {
    let result = sqlx::query(&format!("DELETE FROM {KEYWORDS} WHERE id = $1 AND user_email = $2"))
        .bind(id)
        .bind(owner.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub(super) async fn list_todos(pool: &PgPool, owner: &Owner, from: NaiveDate) -> Result<Vec<Todo>, StoreError> {
    let todos = sqlx::query_as::<_, Todo>(&format!(
        r#"
        SELECT {TODO_COLUMNS} FROM {TODOS}
        WHERE user_email = $1 AND target_date >= $2
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
    pool: &PgPool,
    owner: &Owner,
    date: NaiveDate,
) -> Result<Vec<Todo>, StoreError> {
    let todos = sqlx::query_as::<_, Todo>(&format!(
        r#"
        SELECT {TODO_COLUMNS} FROM {TODOS}
        WHERE user_email = $1 AND target_date = $2
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
    pool: &PgPool,
    owner: &Owner,
    text: &str,
    target_date: NaiveDate,
) -> Result<Todo, StoreError> {
    let todo = sqlx::query_as::<_, Todo>(&format!(
        r#"
        INSERT INTO {TODOS} (text, target_date, user_email, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING {TODO_COLUMNS}
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

pub(super) async fn delete_todo(pool: &PgPool, owner: &Owner, id: i64) -> Result<u64, StoreError> {
    let result = sqlx::query(&format!("DELETE FROM {TODOS} WHERE id = $1 AND user_email = $2"))
        .bind(id)
        .bind(owner.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub(super) async fn count_unowned(pool: &PgPool) -> Result<i64, StoreError> {
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

pub(super) async fn backfill_unowned(pool: &PgPool, owner: &Owner) -> Result<u64, StoreError> {
    let mut tx = pool.begin().await?;

    // Keep one unowned row per keyword, and none the owner already has.
    sqlx::query(&format!(
        r#"
        DELETE FROM {KEYWORDS}
        WHERE {UNOWNED}
          AND (keyword IN (SELECT keyword FROM {KEYWORDS} WHERE user_email = $1)
               OR id NOT IN (SELECT MIN(id) FROM {KEYWORDS} WHERE {UNOWNED} GROUP BY keyword))
        "#
    ))
    .bind(owner.as_str())
    .execute(&mut *tx)
    .await?;

    let keywords = sqlx::query(&format!("UPDATE {KEYWORDS} SET user_email = $1 WHERE {UNOWNED}"))
        .bind(owner.as_str())
        .execute(&mut *tx)
        .await?;

    let todos = sqlx::query(&format!("UPDATE {TODOS} SET user_email = $1 WHERE {UNOWNED}"))
        .bind(owner.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(keywords.rows_affected() + todos.rows_affected())
}

pub(super) async fn discard_unowned(pool: &PgPool) -> Result<u64, StoreError> {
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
