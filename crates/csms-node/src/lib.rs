//! # CSMS Node Library
//!
//! Exposes the node wiring for tests. The main entry point is the `main.rs`
//! binary.
//!
//! ## Event Flow
//!
//! ```text
//! HTTP ──► TransactionService ──auth-request──► Event Bus ──► AuthenticationConsumer
//!                ▲                                                    │
//!                └──── ResponseListener ◄──auth-response── Event Bus ◄┘
//! ```

#![allow(missing_docs)]

pub mod config;
pub mod runtime;

pub use config::{load_config, NodeConfig};
pub use runtime::NodeRuntime;
