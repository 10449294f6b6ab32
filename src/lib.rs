// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Morning dashboard: Google sign-in, cookie sessions and per-user data.
//!
//! This crate provides the backend API behind the dashboard: the OAuth
//! login flow, the signed cookie session, and owner-scoped storage for news
//! keywords and todos.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::{Config, ConfigError};
use db::Store;
use services::{CalendarClient, GoogleOAuthClient, IdentityResolver, SessionStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub oauth: GoogleOAuthClient,
    pub identity: IdentityResolver,
    pub store: Store,
    pub calendar: CalendarClient,
}

impl AppState {
    /// Wire every service from `config`, sharing one HTTP client.
    pub fn new(config: Config, http: reqwest::Client) -> Result<Self, ConfigError> {
        let sessions = SessionStore::from_config(&config)?;
        let oauth = GoogleOAuthClient::new(http.clone(), &config);
        let identity =
            IdentityResolver::google(http.clone(), config.google_endpoints.userinfo_url.clone());
        let calendar = CalendarClient::new(http, config.google_endpoints.calendar_api_url.clone());
        let store = Store::new(config.database_url.clone());

        Ok(Self {
            config,
            sessions,
            oauth,
            identity,
            store,
            calendar,
        })
    }
}
