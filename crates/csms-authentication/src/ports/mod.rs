//! # Ports Layer
//!
//! Hexagonal architecture port definitions.

pub mod inbound;
pub mod outbound;
