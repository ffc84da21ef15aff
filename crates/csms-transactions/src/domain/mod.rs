//! Domain layer: correlation ids, the pending-reply registry, configuration
//! and the HTTP-facing types.

pub mod config;
pub mod correlation;
pub mod error;
pub mod pending;
pub mod types;
