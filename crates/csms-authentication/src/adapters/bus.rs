//! # Event Bus Adapter
//!
//! Wires the authentication service to the shared event bus.
//!
//! ## Event Flow
//!
//! ```text
//! [Transaction Service] ──auth-request──→ [Event Bus] ──→ AuthenticationConsumer
//!                                                                │
//!                                                   validate + resolve (service)
//!                                                                │
//! [Transaction Service] ←──auth-response── [Event Bus] ←─────────┘
//! ```
//!
//! A request record that fails to decode is logged and dropped: without a
//! decodable request id there is nobody to reply to.

use crate::domain::errors::AuthenticationError;
use crate::ports::inbound::AuthenticationApi;
use csms_telemetry::metrics::MALFORMED_MESSAGES;
use futures::StreamExt;
use shared_bus::{BusEvent, EventFilter, EventPublisher, EventStream, EventSubscriber, EventTopic};
use shared_types::AuthenticationResponse;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Consumes identity check requests and publishes the replies.
///
/// The request subscription is taken in [`AuthenticationConsumer::new`], so
/// requests published after construction are never missed even if `run`
/// starts later.
pub struct AuthenticationConsumer<S, B>
where
    S: AuthenticationApi,
    B: EventPublisher + EventSubscriber,
{
    /// The authentication service
    service: Arc<S>,

    /// The shared bus, used to publish replies
    bus: Arc<B>,

    /// Subscription to the request topic
    requests: EventStream,
}

impl<S, B> AuthenticationConsumer<S, B>
where
    S: AuthenticationApi,
    B: EventPublisher + EventSubscriber,
{
    /// Create a consumer and subscribe it to the request topic.
    pub fn new(service: Arc<S>, bus: Arc<B>) -> Self {
        let requests = bus.event_stream(EventFilter::topics(vec![EventTopic::AuthRequest]));
        Self {
            service,
            bus,
            requests,
        }
    }

    /// Get a reference to the underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Process requests until the bus closes.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!("[authentication] Started listening for identity check requests");

        while let Some(event) = self.requests.next().await {
            self.handle_event(&event).await;
        }

        warn!("[authentication] Request stream ended, shutting down");
    }

    /// Decode, process and answer one request record.
    ///
    /// Returns the reply, or `None` if the record could not be decoded.
    pub async fn handle_event(&self, event: &BusEvent) -> Option<AuthenticationResponse> {
        let message = match event.decode_request() {
            Ok(message) => message,
            Err(e) => {
                warn!(key = %event.key, error = %e, "Dropping malformed identity check request");
                MALFORMED_MESSAGES.inc();
                return None;
            }
        };

        let reply = self.service.process(&message).await;

        if let Err(e) = self.publish_reply(&reply).await {
            error!(request_id = %reply.request_id, error = %e, "Failed to publish reply");
        }

        Some(reply)
    }

    /// Publish a reply on the response topic.
    ///
    /// # Returns
    ///
    /// The number of subscriptions that received it.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError::Codec` if the reply cannot be encoded.
    pub async fn publish_reply(
        &self,
        reply: &AuthenticationResponse,
    ) -> Result<usize, AuthenticationError> {
        let event = BusEvent::response(reply)?;
        let receivers = self.bus.publish(event).await;

        if receivers == 0 {
            warn!(request_id = %reply.request_id, "No listener for identity check reply");
        } else {
            debug!(
                request_id = %reply.request_id,
                status = %reply.authentication_status,
                receivers = receivers,
                "Published identity check reply"
            );
        }

        Ok(receivers)
    }
}
