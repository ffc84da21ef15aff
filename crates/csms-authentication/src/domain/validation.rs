//! # Validator Chain
//!
//! Structural checks applied to an identity check message before any
//! lookup happens. Validators run in the order they were given and the
//! first failure stops the chain.

use crate::domain::config::ValidationConfig;
use shared_types::AuthenticationMessage;
use std::fmt;

/// A single predicate over an identity check message.
///
/// Implementations must be stateless: the same message always yields the
/// same answer.
pub trait AuthenticationValidator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// `true` if `message` passes this check. `None` means no message.
    fn validate(&self, message: Option<&AuthenticationMessage>) -> bool;
}

/// Fails on a missing message, a missing token, or a blank token.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenExistenceValidator;

impl AuthenticationValidator for TokenExistenceValidator {
    fn name(&self) -> &'static str {
        "token-existence"
    }

    fn validate(&self, message: Option<&AuthenticationMessage>) -> bool {
        message
            .and_then(AuthenticationMessage::token)
            .is_some_and(|token| !token.trim().is_empty())
    }
}

/// Fails unless the token's character count lies in `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct TokenLengthValidator {
    min: usize,
    max: usize,
}

impl TokenLengthValidator {
    /// Validator for the inclusive range `min..=max`.
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Validator using the bounds in `config`.
    #[must_use]
    pub const fn from_config(config: &ValidationConfig) -> Self {
        Self::new(config.min_token_length, config.max_token_length)
    }
}

impl Default for TokenLengthValidator {
    fn default() -> Self {
        Self::from_config(&ValidationConfig::default())
    }
}

impl AuthenticationValidator for TokenLengthValidator {
    fn name(&self) -> &'static str {
        "token-length"
    }

    fn validate(&self, message: Option<&AuthenticationMessage>) -> bool {
        message
            .and_then(AuthenticationMessage::token)
            .is_some_and(|token| (self.min..=self.max).contains(&token.chars().count()))
    }
}

/// Ordered, short-circuiting validator chain.
pub struct ValidationService {
    validators: Vec<Box<dyn AuthenticationValidator>>,
}

impl ValidationService {
    /// Chain running `validators` in the given order.
    #[must_use]
    pub fn new(validators: Vec<Box<dyn AuthenticationValidator>>) -> Self {
        Self { validators }
    }

    /// Existence check followed by the configured length check.
    #[must_use]
    pub fn standard(config: &ValidationConfig) -> Self {
        Self::new(vec![
            Box::new(TokenExistenceValidator),
            Box::new(TokenLengthValidator::from_config(config)),
        ])
    }

    /// `true` only if every validator passes. An empty chain passes.
    pub fn validate_all(&self, message: Option<&AuthenticationMessage>) -> bool {
        self.validators.iter().all(|validator| {
            let passed = validator.validate(message);
            if !passed {
                tracing::debug!(validator = validator.name(), "Validation failed");
            }
            passed
        })
    }

    /// Number of validators in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// `true` if the chain has no validators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::standard(&ValidationConfig::default())
    }
}

impl fmt::Debug for ValidationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.validators.iter().map(|v| v.name()).collect();
        f.debug_struct("ValidationService")
            .field("validators", &names)
            .finish()
    }
}
