//! Validation configuration.

use crate::domain::errors::AuthenticationError;
use serde::{Deserialize, Serialize};

/// Default inclusive minimum token length.
pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 20;

/// Default inclusive maximum token length.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 80;

/// Bounds applied by the standard validator chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Shortest accepted token, in characters.
    pub min_token_length: usize,
    /// Longest accepted token, in characters.
    pub max_token_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_token_length: DEFAULT_MIN_TOKEN_LENGTH,
            max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
        }
    }
}

impl ValidationConfig {
    /// Check the length range is usable.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError::InvalidLengthRange` if `min > max`.
    pub fn validate(&self) -> Result<(), AuthenticationError> {
        if self.min_token_length > self.max_token_length {
            return Err(AuthenticationError::InvalidLengthRange {
                min: self.min_token_length,
                max: self.max_token_length,
            });
        }
        Ok(())
    }
}
