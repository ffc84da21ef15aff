//! # Authentication Errors
//!
//! None of these reach the party waiting for a decision: validation and
//! lookup problems are answered with an outcome instead.

use shared_types::CodecError;
use thiserror::Error;

/// Errors raised by the authentication service itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthenticationError {
    /// Token length bounds are inverted.
    #[error("Invalid token length range: min {min} > max {max}")]
    InvalidLengthRange { min: usize, max: usize },

    /// The reply could not be encoded for the bus.
    #[error("Failed to encode reply: {0}")]
    Codec(#[from] CodecError),
}
