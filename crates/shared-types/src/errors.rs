//! # Error Types
//!
//! Errors raised while encoding or decoding wire messages.

use thiserror::Error;

/// Errors from the JSON wire codec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Serialization failed.
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Payload is not a valid message of the expected kind.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Outcome literal is not one of the four known values.
    #[error("Unknown authentication status: {0}")]
    UnknownStatus(String),
}
