// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth2 authorization-code flow.
//!
//! Handles:
//! - Building the consent-screen URL (offline access, forced consent)
//! - Exchanging the authorization code for a token bundle

use crate::config::{Config, ConfigError, GoogleEndpoints, OAuthCredentials};
use crate::models::TokenBundle;
use serde::Deserialize;

/// Scopes requested on the consent screen.
pub const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/calendar.readonly",
    "openid",
    "email",
    "profile",
];

/// OAuth flow errors.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("token request failed: {0}")]
    Transport(String),

    #[error("token endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid token response: {0}")]
    Decode(String),
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

impl TokenResponse {
    fn into_bundle(self, now_millis: i64) -> TokenBundle {
        TokenBundle {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            scope: self.scope,
            token_type: self.token_type,
            expiry_date: self
                .expires_in
                .map(|secs| now_millis.saturating_add(secs.saturating_mul(1000))),
            id_token: self.id_token,
        }
    }
}

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    config: Config,
}

impl GoogleOAuthClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            config: config.clone(),
        }
    }

    fn endpoints(&self) -> &GoogleEndpoints {
        &self.config.google_endpoints
    }

    fn credentials(&self) -> Result<OAuthCredentials, OAuthError> {
        self.config.oauth_credentials().map_err(|err| {
            if let ConfigError::MissingOAuth(missing) = &err {
                tracing::error!(missing = ?missing, "Missing Google OAuth environment variables");
            }
            OAuthError::Config(err)
        })
    }

    /// Build the consent-screen URL.
    pub fn build_authorization_url(&self) -> Result<String, OAuthError> {
        let creds = self.credentials()?;

        Ok(format!(
            "{}?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             access_type=offline&\
             prompt=consent",
            self.endpoints().auth_url,
            urlencoding::encode(&creds.client_id),
            urlencoding::encode(&creds.redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
        ))
    }

    /// Exchange an authorization code for a token bundle.
    ///
    /// The result may lack `refresh_token`; callers merge it over any bundle
    /// already in the session instead of overwriting.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenBundle, OAuthError> {
        let creds = self.credentials()?;

        let response = self
            .http
            .post(&self.endpoints().token_url)
            .form(&[
                ("code", code),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("redirect_uri", creds.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Status { status, body });
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::Decode(e.to_string()))?;

        Ok(token_response.into_bundle(chrono::Utc::now().timestamp_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: &Config) -> GoogleOAuthClient {
        GoogleOAuthClient::new(reqwest::Client::new(), config)
    }

    #[test]
    fn test_authorization_url_parameters() {
        let url = client(&Config::test_default())
            .build_authorization_url()
            .unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=test-client-id.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains(
            "scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fcalendar.readonly%20openid%20email%20profile"
        ));
    }

    #[test]
    fn test_authorization_url_requires_credentials() {
        let config = Config {
            google_redirect_uri: None,
            ..Config::test_default()
        };

        let err = client(&config).build_authorization_url().unwrap_err();
        assert!(matches!(
            err,
            OAuthError::Config(ConfigError::MissingOAuth(ref missing)) if missing == &["GOOGLE_REDIRECT_URI"]
        ));
    }

    #[test]
    fn test_token_response_expiry_in_millis() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"a","expires_in":3599,"token_type":"Bearer","scope":"openid"}"#,
        )
        .unwrap();

        let bundle = response.into_bundle(1_000_000);
        assert_eq!(bundle.access_token, "a");
        assert_eq!(bundle.expiry_date, Some(1_000_000 + 3_599_000));
        assert_eq!(bundle.refresh_token, None);
        assert_eq!(bundle.token_type.as_deref(), Some("Bearer"));
    }

    #[tokio::test]
    async fn test_exchange_code_requires_credentials() {
        let config = Config {
            google_client_secret: None,
            ..Config::test_default()
        };

        let err = client(&config).exchange_code("code").await.unwrap_err();
        assert!(matches!(err, OAuthError::Config(_)));
    }
}
