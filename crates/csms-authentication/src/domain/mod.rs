//! # Domain Layer
//!
//! Pure validation logic for identity check messages.

pub mod config;
pub mod errors;
pub mod validation;
