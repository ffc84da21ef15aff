//! # Static Token Store
//!
//! In-memory `TokenStatusProvider` seeded with the known driver tokens.
//! Stands in for the external account store in single-process deployments
//! and tests.

use crate::ports::outbound::{LookupError, TokenStatusProvider};
use async_trait::async_trait;
use std::collections::HashMap;

/// Tokens known to be enabled.
pub const ENABLED_TOKENS: &[&str] = &[
    "driverABC-1234567890",
    "driver-token-xyz789-authenticated-user-session",
    "ev-charging-driver-token-qwerty123456789",
    "mobile-app-driver-id-987654321-active",
    "verified-driver-session-token-abcdef123456",
    "fleet-manager-driver-id-456789-premium-account-enabled",
    "corporate-fleet-driver-token-long-format-id-12345678",
    "public-charging-driver-session-token-uuid-format-enabled",
];

/// Tokens known to be disabled.
pub const DISABLED_TOKENS: &[&str] = &[
    "DISABLED_suspended-account-driver-token-abc",
    "DISABLED_token-blocked-user-456",
    "DISABLED_expired-trial-driver-token-xyz",
];

/// Fixed token → enabled map. Tokens not in the map have no record.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenStore {
    tokens: HashMap<String, bool>,
}

impl StaticTokenStore {
    /// Empty store: every lookup answers "no record".
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with [`ENABLED_TOKENS`] and [`DISABLED_TOKENS`].
    #[must_use]
    pub fn seeded() -> Self {
        let enabled = ENABLED_TOKENS.iter().map(|t| (*t, true));
        let disabled = DISABLED_TOKENS.iter().map(|t| (*t, false));
        enabled.chain(disabled).collect()
    }

    /// Add or replace a token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, enabled: bool) -> Self {
        self.tokens.insert(token.into(), enabled);
        self
    }

    /// Number of tokens with a record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// `true` if no token has a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, bool)> for StaticTokenStore {
    fn from_iter<I: IntoIterator<Item = (&'a str, bool)>>(iter: I) -> Self {
        Self {
            tokens: iter
                .into_iter()
                .map(|(token, enabled)| (token.to_string(), enabled))
                .collect(),
        }
    }
}

#[async_trait]
impl TokenStatusProvider for StaticTokenStore {
    async fn is_enabled(&self, token: &str) -> Result<Option<bool>, LookupError> {
        Ok(self.tokens.get(token).copied())
    }
}
