//! # Authentication Service
//!
//! Application service layer that implements the `AuthenticationApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`AuthenticationApi`)
//! - Uses the outbound port (`TokenStatusProvider`) for status lookups
//! - Delegates message checks to the domain validator chain

use crate::domain::validation::ValidationService;
use crate::ports::inbound::AuthenticationApi;
use crate::ports::outbound::TokenStatusProvider;
use async_trait::async_trait;
use csms_telemetry::metrics::AUTH_DECISIONS;
use shared_types::{AuthenticationMessage, AuthenticationResponse, AuthenticationStatus};
use tracing::{debug, warn};

/// Authentication Service.
///
/// Holds no correlation state: every call is answered from the message and
/// the token store alone.
pub struct AuthenticationService<P: TokenStatusProvider> {
    validation: ValidationService,
    provider: P,
}

impl<P: TokenStatusProvider> AuthenticationService<P> {
    /// Create a new authentication service.
    ///
    /// # Arguments
    /// * `validation` - The validator chain applied before any lookup
    /// * `provider` - The token status store
    pub fn new(validation: ValidationService, provider: P) -> Self {
        Self {
            validation,
            provider,
        }
    }

    /// Service with the standard validator chain.
    pub fn with_default_validation(provider: P) -> Self {
        Self::new(ValidationService::default(), provider)
    }

    /// The validator chain in use.
    pub fn validation(&self) -> &ValidationService {
        &self.validation
    }
}

#[async_trait]
impl<P: TokenStatusProvider> AuthenticationApi for AuthenticationService<P> {
    async fn resolve(&self, token: &str) -> AuthenticationStatus {
        match self.provider.is_enabled(token).await {
            Ok(enabled) => AuthenticationStatus::from_enabled(enabled),
            Err(e) => {
                warn!(error = %e, "Token lookup failed, resolving as UNKNOWN");
                AuthenticationStatus::Unknown
            }
        }
    }

    async fn process(&self, message: &AuthenticationMessage) -> AuthenticationResponse {
        let status = match message.token() {
            Some(token) if self.validation.validate_all(Some(message)) => {
                self.resolve(token).await
            }
            _ => AuthenticationStatus::Invalid,
        };

        debug!(
            request_id = message.reply_id(),
            status = %status,
            "Identity check decided"
        );
        AUTH_DECISIONS.with_label_values(&[status.as_str()]).inc();

        AuthenticationResponse::new(message.reply_id(), status)
    }
}
