//! Event bus adapter for real IPC communication.
//!
//! Implements `RequestSender`/`ResponseReceiver` over shared-bus. Requests go
//! out on the request topic keyed by correlation id; replies come back on the
//! response topic.

use crate::ipc::handler::{IpcError, RequestSender, ResponseReceiver};
use async_trait::async_trait;
use futures::StreamExt;
use shared_bus::{BusEvent, EventFilter, EventPublisher, EventStream, EventSubscriber, EventTopic};
use shared_types::{AuthenticationMessage, AuthenticationResponse};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Publishes identity check requests to the event bus.
pub struct EventBusSender<B> {
    bus: Arc<B>,
}

impl<B: EventPublisher> EventBusSender<B> {
    pub fn new(bus: Arc<B>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl<B: EventPublisher + 'static> RequestSender for EventBusSender<B> {
    async fn send(&self, message: AuthenticationMessage) -> Result<(), IpcError> {
        let event = BusEvent::request(&message)?;
        let key = event.key.clone();

        let receivers = self.bus.publish(event).await;
        if receivers == 0 {
            warn!(
                correlation_id = %key,
                "No subscribers for authentication request (consumer may not be running)"
            );
            return Err(IpcError::NoSubscribers(EventTopic::AuthRequest.name()));
        }

        debug!(correlation_id = %key, receivers, "Authentication request delivered");
        Ok(())
    }
}

/// Receives identity check replies from the event bus.
///
/// Subscribes on construction so no reply published afterwards is missed.
pub struct EventBusReceiver {
    stream: Mutex<EventStream>,
}

impl EventBusReceiver {
    pub fn new<S: EventSubscriber + ?Sized>(bus: &S) -> Self {
        let stream = bus.event_stream(EventFilter::topics(vec![EventTopic::AuthResponse]));
        Self {
            stream: Mutex::new(stream),
        }
    }
}

#[async_trait]
impl ResponseReceiver for EventBusReceiver {
    async fn receive(&self) -> Result<AuthenticationResponse, IpcError> {
        let mut stream = self.stream.lock().await;
        loop {
            let Some(event) = stream.next().await else {
                return Err(IpcError::ChannelClosed);
            };
            match event.decode_response() {
                Ok(reply) => return Ok(reply),
                Err(e) => {
                    // Skip malformed records; they carry no usable id.
                    warn!(key = %event.key, error = %e, "Discarding malformed authentication reply");
                }
            }
        }
    }
}
