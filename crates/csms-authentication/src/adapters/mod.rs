//! # Adapters Layer
//!
//! Concrete implementations of the outbound port and the bus wiring.

pub mod bus;
pub mod token_store;
