// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth credential bundle kept in the session cookie.

use serde::{Deserialize, Serialize};

/// Credentials issued by the identity provider at code exchange.
///
/// Stored opaquely in a cookie; only `access_token` and `id_token` are ever
/// read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Access token expiry, milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
    /// Compact identity token (`header.claims.signature`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenBundle {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            scope: None,
            token_type: None,
            expiry_date: None,
            id_token: None,
        }
    }

    /// Overlay `self` (freshly exchanged) on a previously stored bundle.
    ///
    /// Fields present in `self` win; fields it lacks keep their previous
    /// value, so a re-consent that omits `refresh_token` keeps the old one.
    pub fn merged_over(self, previous: Option<TokenBundle>) -> TokenBundle {
        let Some(previous) = previous else {
            return self;
        };

        TokenBundle {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous.refresh_token),
            scope: self.scope.or(previous.scope),
            token_type: self.token_type.or(previous.token_type),
            expiry_date: self.expiry_date.or(previous.expiry_date),
            id_token: self.id_token.or(previous.id_token),
        }
    }
}
