//! # Shared Bus - Publish/Subscribe Transport
//!
//! In-process stand-in for the message broker that connects the transaction
//! service with the authentication service.
//!
//! ## Request/Reply over Topics
//!
//! ```text
//! ┌──────────────────┐   auth-request    ┌────────────────────────┐
//! │ Transaction Svc  │ ────────────────→ │ Authentication Service │
//! │ (waits on reply) │                   │  (validate + resolve)  │
//! │                  │ ←──────────────── │                        │
//! └──────────────────┘   auth-response   └────────────────────────┘
//! ```
//!
//! Records carry JSON payloads keyed by request id, so consumers decode with
//! `shared_types::codec` exactly as they would from a real broker. Delivery
//! is fire-and-forget: the bus never blocks a publisher and never retries.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{BusEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
