// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session, OAuth and upstream API logic.

pub mod calendar;
pub mod google_oauth;
pub mod identity;
pub mod session;
pub mod token_codec;

pub use calendar::CalendarClient;
pub use google_oauth::{GoogleOAuthClient, OAuthError};
pub use identity::{IdentityResolver, IdentitySource};
pub use session::SessionStore;

use anyhow::Context;
use std::time::Duration;

/// Timeout for every outbound request to Google.
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared HTTP client for outbound requests.
pub fn build_http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}
