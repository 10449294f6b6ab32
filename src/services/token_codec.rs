// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cookie-safe encoding of the token bundle.
//!
//! The bundle is serialized to JSON and then base64url-encoded without
//! padding, so the cookie value never contains `"`, `,`, `;` or spaces.

use crate::models::TokenBundle;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Encode a bundle into a cookie value.
pub fn encode(bundle: &TokenBundle) -> String {
    // Serializing a struct of strings and integers cannot fail.
    let json = serde_json::to_vec(bundle).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode a cookie value. Missing or malformed input yields `None`.
pub fn decode(raw: Option<&str>) -> Option<TokenBundle> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
    match serde_json::from_slice::<TokenBundle>(&bytes) {
        Ok(bundle) => Some(bundle),
        Err(e) => {
            tracing::debug!(error = %e, "Discarding undecodable token cookie");
            None
        }
    }
}
