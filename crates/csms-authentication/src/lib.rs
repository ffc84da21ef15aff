//! # Authentication Service
//!
//! Answers identity checks published by the transaction service.
//!
//! ## Architecture
//!
//! This service follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Validator chain and configuration, no I/O
//! - **Ports Layer** (`ports/`): Inbound API and the token status lookup
//! - **Adapters Layer** (`adapters/`): Static token store and bus consumer
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Decision Rules
//!
//! - A message that fails validation is answered `INVALID` without a lookup
//! - A lookup error or missing record is answered `UNKNOWN`
//! - Otherwise the enablement flag maps to `ACCEPTED` / `REJECTED`
//!
//! Every processed message is answered with exactly one reply carrying the
//! request's `requestId`.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::bus::AuthenticationConsumer;
pub use adapters::token_store::StaticTokenStore;
pub use domain::config::ValidationConfig;
pub use domain::errors::AuthenticationError;
pub use domain::validation::{
    AuthenticationValidator, TokenExistenceValidator, TokenLengthValidator, ValidationService,
};
pub use ports::inbound::AuthenticationApi;
pub use ports::outbound::{LookupError, TokenStatusProvider};
pub use service::AuthenticationService;
