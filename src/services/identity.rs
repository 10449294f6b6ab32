// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resolve the user's email from a freshly exchanged token bundle.
//!
//! Sources are tried in order and the first email wins:
//! 1. the `email` claim of the identity token (no network)
//! 2. the provider's userinfo endpoint, called with the access token

use crate::models::TokenBundle;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct EmailClaim {
    #[serde(default)]
    email: Option<String>,
}

/// Read the `email` claim from a compact three-segment identity token.
///
/// The signature is not checked: the token was just received from the token
/// endpoint over TLS, not from the browser.
pub fn email_from_id_token(id_token: &str) -> Option<String> {
    let mut segments = id_token.split('.');
    let (Some(_header), Some(claims), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        tracing::debug!("Identity token is not three dot-separated segments");
        return None;
    };

    // Tolerate padded input from providers that emit it.
    let bytes = URL_SAFE_NO_PAD.decode(claims.trim_end_matches('=')).ok()?;
    let claim: EmailClaim = serde_json::from_slice(&bytes)
        .map_err(|e| tracing::debug!(error = %e, "Identity token claims are not JSON"))
        .ok()?;

    claim.email.filter(|email| !email.trim().is_empty())
}

/// One way of finding the email for a bundle.
#[derive(Clone)]
pub enum IdentitySource {
    /// Decode the identity token carried in the bundle.
    IdToken,
    /// Ask the userinfo endpoint, authenticated with the access token.
    UserInfo {
        http: reqwest::Client,
        url: String,
    },
}

impl IdentitySource {
    pub async fn resolve(&self, bundle: &TokenBundle) -> Option<String> {
        match self {
            IdentitySource::IdToken => bundle.id_token.as_deref().and_then(email_from_id_token),
            IdentitySource::UserInfo { http, url } => {
                fetch_userinfo_email(http, url, &bundle.access_token).await
            }
        }
    }
}

async fn fetch_userinfo_email(http: &reqwest::Client, url: &str, access_token: &str) -> Option<String> {
    if access_token.is_empty() {
        return None;
    }

    let response = match http.get(url).bearer_auth(access_token).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Userinfo request failed");
            return None;
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, body = %body, "Userinfo endpoint returned an error");
        return None;
    }

    match response.json::<EmailClaim>().await {
        Ok(profile) => profile.email.filter(|email| !email.trim().is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "Userinfo response is not valid JSON");
            None
        }
    }
}

/// Ordered chain of identity sources.
#[derive(Clone)]
pub struct IdentityResolver {
    sources: Vec<IdentitySource>,
}

impl IdentityResolver {
    pub fn new(sources: Vec<IdentitySource>) -> Self {
        Self { sources }
    }

    /// Identity token first, then the userinfo endpoint at `userinfo_url`.
    pub fn google(http: reqwest::Client, userinfo_url: impl Into<String>) -> Self {
        Self::new(vec![
            IdentitySource::IdToken,
            IdentitySource::UserInfo {
                http,
                url: userinfo_url.into(),
            },
        ])
    }

    /// Return the first email any source produces, or `None`.
    pub async fn resolve_email(&self, bundle: &TokenBundle) -> Option<String> {
        for source in &self.sources {
            if let Some(email) = source.resolve(bundle).await {
                return Some(email);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_claims(claims: &str) -> String {
        format!(
            "{}.{}.c2lnbmF0dXJl",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn test_email_from_id_token() {
        let token = token_with_claims(r#"{"sub":"1234","email":"a@x.com","email_verified":true}"#);
        assert_eq!(email_from_id_token(&token), Some("a@x.com".to_string()));
    }

    #[test]
    fn test_email_from_id_token_without_email_claim() {
        let token = token_with_claims(r#"{"sub":"1234"}"#);
        assert_eq!(email_from_id_token(&token), None);
    }

    #[test]
    fn test_email_from_malformed_id_tokens() {
        let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("plain text"));
        for token in ["", "onlyone", "two.parts", "a.b.c.d", "a.!!!.c", not_json.as_str()] {
            assert_eq!(email_from_id_token(token), None, "token {token:?}");
        }
    }

    #[tokio::test]
    async fn test_id_token_source_short_circuits() {
        // An unroutable userinfo URL would fail if it were reached.
        let resolver = IdentityResolver::google(reqwest::Client::new(), "http://127.0.0.1:1/userinfo");
        let bundle = TokenBundle {
            id_token: Some(token_with_claims(r#"{"email":"fast@x.com"}"#)),
            ..TokenBundle::new("access")
        };

        assert_eq!(
            resolver.resolve_email(&bundle).await,
            Some("fast@x.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreachable_userinfo_yields_none() {
        let resolver = IdentityResolver::google(reqwest::Client::new(), "http://127.0.0.1:1/userinfo");
        assert_eq!(resolver.resolve_email(&TokenBundle::new("access")).await, None);
    }

    #[tokio::test]
    async fn test_empty_chain_resolves_nothing() {
        let resolver = IdentityResolver::new(vec![]);
        assert_eq!(resolver.resolve_email(&TokenBundle::new("access")).await, None);
    }
}
