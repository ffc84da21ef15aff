//! Transaction service error types.
//!
//! Layering:
//! - [`AwaitError`]: why a registered waiter ended without a reply
//! - [`AuthorizationError`]: what the synchronous caller sees
//! - [`GatewayError`]: service startup and serving failures

use crate::domain::correlation::CorrelationId;
use crate::domain::pending::EvictionReason;
use std::time::Duration;
use thiserror::Error;

/// A waiter ended without a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AwaitError {
    /// No reply within the caller's bound. The entry is gone from the registry.
    #[error("no reply for {id} within {after:?}")]
    Timeout { id: CorrelationId, after: Duration },

    /// The registry evicted the entry before a reply arrived.
    #[error("request {id} evicted after {age:?} ({reason})")]
    Evicted {
        id: CorrelationId,
        reason: EvictionReason,
        age: Duration,
    },

    /// The entry was cancelled.
    #[error("request {0} cancelled")]
    Cancelled(CorrelationId),
}

/// Failure of a synchronous authorization call.
///
/// Distinct from all four outcomes: an outcome is data, these are faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    /// No decision within the bound. Maps to an "upstream unavailable" signal.
    #[error("authorization timed out after {0:?}")]
    Timeout(Duration),

    /// Publishing failed or something unexpected happened.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AwaitError> for AuthorizationError {
    fn from(err: AwaitError) -> Self {
        match err {
            AwaitError::Timeout { after, .. } => Self::Timeout(after),
            // The caller got no decision in time either way.
            AwaitError::Evicted { age, .. } => Self::Timeout(age),
            AwaitError::Cancelled(id) => Self::Internal(format!("request {id} cancelled")),
        }
    }
}

/// Service startup and serving errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server failed while serving
    #[error("server error: {0}")]
    Serve(String),
}
