// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! # Transaction Service
//!
//! Turns a driver authorization into a blocking call over the asynchronous
//! request/reply exchange with the authentication service.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 TRANSACTION SERVICE                       │
//! ├──────────────────────────────────────────────────────────┤
//! │   POST /api/v1/transaction/authorize   GET /health        │
//! │                    │                                      │
//! │   ┌────────────────┴────────────────┐                     │
//! │   │      Authorization Handler      │                     │
//! │   │  register → publish → await     │                     │
//! │   └────────────────┬────────────────┘                     │
//! │                    │                                      │
//! │   ┌────────────────┴────────────────┐   ┌─────────────┐   │
//! │   │      Correlation Registry       │◄──┤  Response   │   │
//! │   │  (bounded, oldest evicted)      │   │  Listener   │   │
//! │   └─────────────────────────────────┘   └──────▲──────┘   │
//! └────────────────────┬─────────────────────────────┼────────┘
//!                      │ auth-request                │ auth-response
//!                      ▼                             │
//!                 Event Bus ───► Authentication Service
//! ```
//!
//! ## Outcomes
//!
//! A call ends in exactly one of: the authentication status carried by the
//! reply, [`AuthorizationError::Timeout`], or [`AuthorizationError::Internal`]
//! when the request could not be published. Every path removes the waiter.
//!
//! ## Usage
//!
//! ```ignore
//! use csms_transactions::{EventBusSender, TransactionConfig, TransactionService};
//!
//! let sender = Arc::new(EventBusSender::new(Arc::clone(&bus)));
//! let service = TransactionService::new(TransactionConfig::default(), sender)?;
//! service.start(shutdown_signal).await?;
//! ```

pub mod domain;
pub mod ipc;
pub mod service;

// Re-exports
pub use domain::config::{
    AuthorizationConfig, ConfigError, HttpConfig, RegistryConfig, TransactionConfig,
};
pub use domain::correlation::CorrelationId;
pub use domain::error::{AuthorizationError, AwaitError, GatewayError};
pub use domain::pending::{
    sweeper_task, CorrelationRegistry, EvictionHook, EvictionReason, PendingReply, PendingStats,
    StatsSnapshot,
};
pub use domain::types::{AuthorizationRequest, AuthorizationResponse, DriverIdentifier, ErrorResponse};
pub use ipc::{
    AuthorizationHandler, EventBusReceiver, EventBusSender, IpcError, RequestSender,
    ResponseListener, ResponseReceiver,
};
pub use service::{TransactionService, AUTHORIZE_PATH};
