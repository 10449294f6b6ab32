// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tenant key for every per-user row.

use std::fmt;

/// The authenticated user's email, used as the partitioning key in the store.
///
/// Only constructible from a non-blank identity, so an anonymous request can
/// never be mapped onto an empty-string owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Owner(String);

impl Owner {
    pub fn new(email: impl Into<String>) -> Option<Self> {
        let email = email.into();
        if email.trim().is_empty() {
            None
        } else {
            Some(Self(email))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_identity_is_not_an_owner() {
        assert!(Owner::new("").is_none());
        assert!(Owner::new("   ").is_none());
    }

    #[test]
    fn test_owner_keeps_email() {
        let owner = Owner::new("a@x.com").unwrap();
        assert_eq!(owner.as_str(), "a@x.com");
        assert_eq!(owner.to_string(), "a@x.com");
    }
}
