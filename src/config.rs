// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Google OAuth credentials and the database URL are optional at startup so
//! the server can come up on a half-configured host; the auth flow and the
//! data store report what is missing when they are first used.

use chrono_tz::Tz;
use std::env;

const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Tokyo;

/// Minimum length of `SESSION_SECRET` in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Google OAuth / API endpoints. Overridable so tests can point at a mock.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub calendar_api_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            calendar_api_url: "https://www.googleapis.com/calendar/v3".to_string(),
        }
    }
}

/// The three values the OAuth client cannot work without.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// App root used as the target of every auth redirect
    pub app_url: String,
    /// Mark session cookies `Secure` (production only)
    pub secure_cookies: bool,
    /// Master secret for cookie signing (raw bytes)
    pub session_secret: Vec<u8>,
    /// `sqlite:` or `postgres:` connection URL
    pub database_url: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_uri: Option<String>,
    pub google_endpoints: GoogleEndpoints,
    /// Zone that defines "today" for todos and the calendar window
    pub timezone: Tz,
    /// Owner that unowned legacy rows are backfilled to at startup
    pub legacy_owner_email: Option<String>,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| ConfigError::Missing("SESSION_SECRET"))?
            .into_bytes();
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "SESSION_SECRET",
                reason: format!("must be at least {MIN_SESSION_SECRET_LEN} bytes"),
            });
        }

        let timezone = match non_empty_var("APP_TIMEZONE") {
            Some(name) => name.parse::<Tz>().map_err(|_| ConfigError::Invalid {
                var: "APP_TIMEZONE",
                reason: format!("unknown timezone '{name}'"),
            })?,
            None => DEFAULT_TIMEZONE,
        };

        let defaults = GoogleEndpoints::default();
        let google_endpoints = GoogleEndpoints {
            auth_url: non_empty_var("GOOGLE_AUTH_URL").unwrap_or(defaults.auth_url),
            token_url: non_empty_var("GOOGLE_TOKEN_URL").unwrap_or(defaults.token_url),
            userinfo_url: non_empty_var("GOOGLE_USERINFO_URL").unwrap_or(defaults.userinfo_url),
            calendar_api_url: non_empty_var("GOOGLE_CALENDAR_API_URL")
                .unwrap_or(defaults.calendar_api_url),
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            app_url: non_empty_var("APP_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
            secure_cookies: env::var("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            session_secret,
            database_url: non_empty_var("DATABASE_URL").or_else(|| non_empty_var("NEON_DATABASE_URL")),
            google_client_id: non_empty_var("GOOGLE_CLIENT_ID"),
            google_client_secret: non_empty_var("GOOGLE_CLIENT_SECRET"),
            google_redirect_uri: non_empty_var("GOOGLE_REDIRECT_URI"),
            google_endpoints,
            timezone,
            legacy_owner_email: non_empty_var("LEGACY_OWNER_EMAIL"),
        })
    }

    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            app_url: DEFAULT_APP_URL.to_string(),
            secure_cookies: false,
            session_secret: b"test_session_secret_32_bytes_min!!".to_vec(),
            database_url: Some("sqlite::memory:".to_string()),
            google_client_id: Some("test-client-id.apps.googleusercontent.com".to_string()),
            google_client_secret: Some("test_client_secret".to_string()),
            google_redirect_uri: Some("http://localhost:8080/auth/callback".to_string()),
            google_endpoints: GoogleEndpoints::default(),
            timezone: DEFAULT_TIMEZONE,
            legacy_owner_email: None,
        }
    }

    /// Return the OAuth client credentials, or the names of the missing ones.
    pub fn oauth_credentials(&self) -> Result<OAuthCredentials, ConfigError> {
        match (
            &self.google_client_id,
            &self.google_client_secret,
            &self.google_redirect_uri,
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Ok(OAuthCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                redirect_uri: redirect_uri.clone(),
            }),
            (client_id, client_secret, redirect_uri) => {
                let missing = [
                    (client_id.is_none(), "GOOGLE_CLIENT_ID"),
                    (client_secret.is_none(), "GOOGLE_CLIENT_SECRET"),
                    (redirect_uri.is_none(), "GOOGLE_REDIRECT_URI"),
                ]
                .into_iter()
                .filter_map(|(is_missing, name)| is_missing.then_some(name))
                .collect();
                Err(ConfigError::MissingOAuth(missing))
            }
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Google OAuth is not configured; set {} in the environment", .0.join(", "))]
    MissingOAuth(Vec<&'static str>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_credentials_complete() {
        let config = Config::test_default();
        let creds = config.oauth_credentials().expect("credentials should be present");
        assert_eq!(creds.client_id, "test-client-id.apps.googleusercontent.com");
        assert_eq!(creds.redirect_uri, "http://localhost:8080/auth/callback");
    }

    #[test]
    fn test_oauth_credentials_lists_missing_names() {
        let config = Config {
            google_client_secret: None,
            google_redirect_uri: None,
            ..Config::test_default()
        };

        match config.oauth_credentials() {
            Err(ConfigError::MissingOAuth(missing)) => {
                assert_eq!(missing, vec!["GOOGLE_CLIENT_SECRET", "GOOGLE_REDIRECT_URI"]);
            }
            other => panic!("expected MissingOAuth, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_oauth_message_has_no_values() {
        let config = Config {
            google_client_id: None,
            ..Config::test_default()
        };
        let message = config.oauth_credentials().unwrap_err().to_string();
        assert!(message.contains("GOOGLE_CLIENT_ID"));
        assert!(!message.contains("test_client_secret"));
    }
}
