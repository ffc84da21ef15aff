//! # Core Domain Entities
//!
//! The decision outcome of an identity check, shared by both sides of the
//! request/response exchange.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CodecError;

/// Outcome of an identity check.
///
/// - `Invalid`: the request failed structural validation; no lookup happened.
/// - `Unknown`: the lookup had no definite answer for the token.
/// - `Accepted` / `Rejected`: the token is known and enabled / disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationStatus {
    /// Token known and enabled.
    Accepted,
    /// Token known and disabled.
    Rejected,
    /// No definite answer from the lookup.
    Unknown,
    /// Rejected by validation before any lookup.
    Invalid,
}

impl AuthenticationStatus {
    /// All outcomes, in declaration order.
    pub const ALL: [AuthenticationStatus; 4] = [
        Self::Accepted,
        Self::Rejected,
        Self::Unknown,
        Self::Invalid,
    ];

    /// Wire literal for this outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Unknown => "UNKNOWN",
            Self::Invalid => "INVALID",
        }
    }

    /// Map a tri-state enablement flag to an outcome.
    ///
    /// `None` means the lookup had no definite answer.
    #[must_use]
    pub const fn from_enabled(enabled: Option<bool>) -> Self {
        match enabled {
            Some(true) => Self::Accepted,
            Some(false) => Self::Rejected,
            None => Self::Unknown,
        }
    }
}

impl fmt::Display for AuthenticationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthenticationStatus {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CodecError::UnknownStatus(s.to_string()))
    }
}
