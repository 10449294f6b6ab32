// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cookie-based session storage.
//!
//! A session is two signed, http-only cookies: the encoded token bundle and
//! the resolved email. There is no server-side session table. A cookie with a
//! bad signature reads exactly like a missing one.

use crate::config::{Config, ConfigError, MIN_SESSION_SECRET_LEN};
use crate::models::TokenBundle;
use crate::services::token_codec;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, Key, SameSite, SignedCookieJar};
use hkdf::Hkdf;
use sha2::Sha256;

/// Cookie holding the encoded token bundle.
pub const TOKENS_COOKIE: &str = "g_tokens";
/// Cookie holding the plain-text email.
pub const IDENTITY_COOKIE: &str = "g_user_email";
/// Lifetime of both session cookies.
pub const SESSION_MAX_AGE: time::Duration = time::Duration::days(30);

const KEY_SALT: &[u8] = b"morning-dashboard";
const KEY_INFO: &[u8] = b"session-cookie-signing";

/// Reads and writes the session cookie pair.
#[derive(Clone)]
pub struct SessionStore {
    key: Key,
    secure: bool,
}

impl SessionStore {
    /// Derive the 64-byte signing key from `secret` with HKDF-SHA256.
    pub fn new(secret: &[u8], secure: bool) -> Result<Self, ConfigError> {
        if secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "SESSION_SECRET",
                reason: format!("must be at least {MIN_SESSION_SECRET_LEN} bytes"),
            });
        }

        let mut okm = [0u8; 64];
        Hkdf::<Sha256>::new(Some(KEY_SALT), secret)
            .expand(KEY_INFO, &mut okm)
            .map_err(|e| ConfigError::Invalid {
                var: "SESSION_SECRET",
                reason: format!("key derivation failed: {e}"),
            })?;

        Ok(Self {
            key: Key::from(&okm),
            secure,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(&config.session_secret, config.secure_cookies)
    }

    /// Signed view of the request's cookies.
    pub fn jar(&self, headers: &HeaderMap) -> SignedCookieJar {
        SignedCookieJar::from_headers(headers, self.key.clone())
    }

    /// Token bundle from the session, if present, authentic and decodable.
    pub fn read_tokens(&self, jar: &SignedCookieJar) -> Option<TokenBundle> {
        let cookie = jar.get(TOKENS_COOKIE);
        token_codec::decode(cookie.as_ref().map(|c| c.value()))
    }

    /// Email from the session, if present and authentic.
    pub fn read_identity(&self, jar: &SignedCookieJar) -> Option<String> {
        jar.get(IDENTITY_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|email| !email.is_empty())
    }

    /// Write the session. The identity cookie is written only when `email`
    /// resolved; a stale one from an earlier login is removed otherwise.
    pub fn set_session(
        &self,
        jar: SignedCookieJar,
        bundle: &TokenBundle,
        email: Option<&str>,
    ) -> SignedCookieJar {
        let jar = jar.add(self.session_cookie(TOKENS_COOKIE, token_codec::encode(bundle)));

        match email {
            Some(email) => jar.add(self.session_cookie(IDENTITY_COOKIE, email.to_string())),
            None => jar.remove(self.session_cookie(IDENTITY_COOKIE, String::new())),
        }
    }

    /// Expire both cookies. Emits the removals even when the request carried
    /// no session, so it is safe to call at any time.
    pub fn clear_session(&self) -> CookieJar {
        [TOKENS_COOKIE, IDENTITY_COOKIE]
            .into_iter()
            .fold(CookieJar::new(), |jar, name| {
                let mut cookie = self.session_cookie(name, String::new());
                cookie.make_removal();
                jar.add(cookie)
            })
    }

    fn session_cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .max_age(SESSION_MAX_AGE)
            .build()
    }
}
