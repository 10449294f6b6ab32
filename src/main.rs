// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Morning dashboard API server
//!
//! Google sign-in with cookie sessions, plus per-user news keywords, todos
//! and today's calendar events.

use morning_dashboard::{config::Config, db::Store, models::Owner, services, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        app_url = %config.app_url,
        timezone = %config.timezone,
        "Starting morning dashboard API"
    );

    if let Err(e) = config.oauth_credentials() {
        tracing::warn!(error = %e, "Google sign-in will fail until configured");
    }

    let http = services::build_http_client()?;
    let state = Arc::new(AppState::new(config.clone(), http)?);

    migrate_legacy_rows(&state.store, &config).await;

    // Build router
    let app = morning_dashboard::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Hand rows left by the old unscoped schema to `LEGACY_OWNER_EMAIL`, or
/// just report how many there are. Failures are logged, never fatal.
async fn migrate_legacy_rows(store: &Store, config: &Config) {
    if config.database_url.is_none() {
        tracing::warn!("DATABASE_URL is not set; keyword and todo routes will fail");
        return;
    }

    let legacy_owner = config.legacy_owner_email.clone().and_then(Owner::new);
    let result = match &legacy_owner {
        Some(owner) => store.backfill_unowned(owner).await.map(|assigned| {
            if assigned > 0 {
                tracing::info!(owner = %owner, assigned, "Backfilled unowned legacy rows");
            }
        }),
        None => store.count_unowned().await.map(|count| {
            if count > 0 {
                tracing::warn!(
                    count,
                    "Unowned legacy rows present; set LEGACY_OWNER_EMAIL to assign them"
                );
            }
        }),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Legacy row migration failed");
    }
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("morning_dashboard=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}
