//! # Outbound Ports (Driven Ports / SPI)
//!
//! Traits that define dependencies this service needs.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Error from a token status lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The backing store could not be reached
    #[error("Token store unavailable: {0}")]
    Unavailable(String),

    /// The store did not answer in time
    #[error("Token lookup timed out")]
    Timeout,
}

/// Lookup answering "is this driver token currently enabled?".
///
/// The answer is tri-state: `Some(true)` enabled, `Some(false)` disabled,
/// `None` no record.
#[async_trait]
pub trait TokenStatusProvider: Send + Sync {
    /// Look up the enablement flag for `token`.
    ///
    /// # Errors
    /// * `LookupError::Unavailable` - the store could not be queried
    /// * `LookupError::Timeout` - the store did not answer in time
    async fn is_enabled(&self, token: &str) -> Result<Option<bool>, LookupError>;
}

#[async_trait]
impl<T: TokenStatusProvider + ?Sized> TokenStatusProvider for Arc<T> {
    async fn is_enabled(&self, token: &str) -> Result<Option<bool>, LookupError> {
        (**self).is_enabled(token).await
    }
}
