//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this service.

use async_trait::async_trait;
use shared_types::{AuthenticationMessage, AuthenticationResponse, AuthenticationStatus};

/// Primary Authentication API.
///
/// Both operations always produce an outcome. Implementations must be
/// thread-safe (`Send + Sync`).
#[async_trait]
pub trait AuthenticationApi: Send + Sync {
    /// Resolve the status of a raw token.
    ///
    /// Lookup failures and missing records both resolve to `UNKNOWN`.
    async fn resolve(&self, token: &str) -> AuthenticationStatus;

    /// Validate then resolve, producing the reply for `message`.
    ///
    /// The reply carries the message's request id, or `"unknown"` if it had
    /// none. Messages failing validation are answered `INVALID` without a
    /// lookup.
    async fn process(&self, message: &AuthenticationMessage) -> AuthenticationResponse;
}
