//! IPC handler bridging synchronous authorization calls to the event bus.

use crate::domain::error::AuthorizationError;
use crate::domain::pending::{CorrelationRegistry, PendingReply};
use async_trait::async_trait;
use csms_telemetry::metrics::{
    HistogramTimer, AUTHORIZATIONS, AUTHORIZATION_DURATION, AUTHORIZATION_TIMEOUTS,
    PUBLISH_FAILURES,
};
use shared_types::{AuthenticationMessage, AuthenticationResponse, AuthenticationStatus, CodecError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Sends identity check requests to the authentication service
#[async_trait]
pub trait RequestSender: Send + Sync {
    /// Hand a request to the transport. `Ok` means at least one consumer
    /// will see it.
    async fn send(&self, message: AuthenticationMessage) -> Result<(), IpcError>;
}

/// Receives identity check replies from the authentication service
#[async_trait]
pub trait ResponseReceiver: Send + Sync {
    /// Receive next reply (blocks until available)
    async fn receive(&self) -> Result<AuthenticationResponse, IpcError>;
}

/// IPC error types
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("channel closed")]
    ChannelClosed,
    #[error("no subscribers on topic {0}")]
    NoSubscribers(&'static str),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl From<IpcError> for AuthorizationError {
    fn from(err: IpcError) -> Self {
        Self::Internal(format!("publish failed: {err}"))
    }
}

/// Synchronous facade over the request/reply exchange.
///
/// Registers a waiter, publishes the request, and blocks until the reply,
/// the timeout, or an eviction settles it. Never retries.
pub struct AuthorizationHandler {
    /// Pending-reply registry for correlation
    registry: Arc<CorrelationRegistry>,
    /// Sender for outgoing requests
    sender: Arc<dyn RequestSender>,
    /// Default timeout
    default_timeout: Duration,
}

impl AuthorizationHandler {
    pub fn new(
        registry: Arc<CorrelationRegistry>,
        sender: Arc<dyn RequestSender>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            sender,
            default_timeout,
        }
    }

    /// Authorize `driver_token` at `station_uuid`.
    ///
    /// # Errors
    ///
    /// * `AuthorizationError::Timeout` - no reply within the configured bound
    /// * `AuthorizationError::Internal` - the request could not be published
    pub async fn authorize(
        &self,
        station_uuid: &str,
        driver_token: Option<String>,
    ) -> Result<AuthenticationStatus, AuthorizationError> {
        let _timer = HistogramTimer::new(&AUTHORIZATION_DURATION);

        let result = match self.begin_request(driver_token).await {
            Ok(pending) => self.await_reply(pending, None).await,
            Err(e) => Err(e.into()),
        };

        match &result {
            Ok(status) => {
                AUTHORIZATIONS.with_label_values(&[status.as_str()]).inc();
                info!(station_uuid, status = %status, "Authorization decided");
            }
            Err(AuthorizationError::Timeout(after)) => {
                AUTHORIZATIONS.with_label_values(&["timeout"]).inc();
                AUTHORIZATION_TIMEOUTS.inc();
                warn!(
                    station_uuid,
                    timeout_ms = after.as_millis(),
                    "Authorization timed out"
                );
            }
            Err(AuthorizationError::Internal(reason)) => {
                AUTHORIZATIONS.with_label_values(&["error"]).inc();
                error!(station_uuid, reason = %reason, "Authorization failed");
            }
        }

        result
    }

    /// Register a waiter and publish the request carrying its id.
    ///
    /// If publishing fails the registration is rolled back, so no orphan
    /// waiter is left behind.
    pub async fn begin_request(&self, token: Option<String>) -> Result<PendingReply, IpcError> {
        let pending = self.registry.register();
        let correlation_id = pending.id();
        let message = AuthenticationMessage::new(correlation_id.to_string(), token);

        if let Err(e) = self.sender.send(message).await {
            // Remove from pending if send fails
            self.registry.cancel(&correlation_id);
            PUBLISH_FAILURES.inc();
            error!(correlation_id = %correlation_id, error = %e, "Failed to publish authentication request");
            return Err(e);
        }

        debug!(correlation_id = %correlation_id, "Sent authentication request");
        Ok(pending)
    }

    /// Wait for the reply to `pending`, defaulting to the configured timeout.
    pub async fn await_reply(
        &self,
        pending: PendingReply,
        timeout: Option<Duration>,
    ) -> Result<AuthenticationStatus, AuthorizationError> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        Ok(self.registry.await_reply(pending, timeout).await?)
    }

    /// Get pending request count
    pub fn pending_count(&self) -> usize {
        self.registry.pending_count()
    }

    /// The registry this handler registers into.
    pub fn registry(&self) -> Arc<CorrelationRegistry> {
        Arc::clone(&self.registry)
    }
}

/// Response listener that feeds incoming replies into the registry
pub struct ResponseListener {
    registry: Arc<CorrelationRegistry>,
    receiver: Arc<dyn ResponseReceiver>,
}

impl ResponseListener {
    pub fn new(registry: Arc<CorrelationRegistry>, receiver: Arc<dyn ResponseReceiver>) -> Self {
        Self { registry, receiver }
    }

    /// Run the listener loop
    pub async fn run(self) {
        info!("[transactions] Response listener started");
        loop {
            match self.receiver.receive().await {
                Ok(reply) => {
                    self.registry.on_reply(&reply);
                }
                Err(IpcError::ChannelClosed) => {
                    warn!("Reply channel closed, stopping listener");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Error receiving authentication reply");
                }
            }
        }
    }
}

/// In-memory IPC channel for testing
pub mod channel {
    use super::*;
    use tokio::sync::{mpsc, Mutex};

    pub struct ChannelSender(pub mpsc::Sender<AuthenticationMessage>);
    pub struct ChannelReceiver(pub Mutex<mpsc::Receiver<AuthenticationResponse>>);

    #[async_trait]
    impl RequestSender for ChannelSender {
        async fn send(&self, message: AuthenticationMessage) -> Result<(), IpcError> {
            self.0
                .send(message)
                .await
                .map_err(|_| IpcError::ChannelClosed)
        }
    }

    #[async_trait]
    impl ResponseReceiver for ChannelReceiver {
        async fn receive(&self) -> Result<AuthenticationResponse, IpcError> {
            let mut guard = self.0.lock().await;
            guard.recv().await.ok_or(IpcError::ChannelClosed)
        }
    }

    /// Create a test IPC channel pair
    pub fn create_test_channel(
        buffer: usize,
    ) -> (
        mpsc::Sender<AuthenticationMessage>,
        mpsc::Receiver<AuthenticationMessage>,
        mpsc::Sender<AuthenticationResponse>,
        mpsc::Receiver<AuthenticationResponse>,
    ) {
        let (req_tx, req_rx) = mpsc::channel(buffer);
        let (resp_tx, resp_rx) = mpsc::channel(buffer);
        (req_tx, req_rx, resp_tx, resp_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::channel::*;
    use super::*;
    use tokio::sync::{mpsc, Mutex};

    struct FailingSender;

    #[async_trait]
    impl RequestSender for FailingSender {
        async fn send(&self, _message: AuthenticationMessage) -> Result<(), IpcError> {
            Err(IpcError::NoSubscribers("auth-request"))
        }
    }

    fn registry() -> Arc<CorrelationRegistry> {
        Arc::new(CorrelationRegistry::new(100, Duration::from_secs(600)))
    }

    /// Answers every request with `status`, through the response listener.
    fn spawn_responder(
        mut requests: mpsc::Receiver<AuthenticationMessage>,
        replies: mpsc::Sender<AuthenticationResponse>,
        status: AuthenticationStatus,
    ) {
        tokio::spawn(async move {
            while let Some(message) = requests.recv().await {
                let reply = AuthenticationResponse::new(message.reply_id(), status);
                if replies.send(reply).await.is_err() {
                    break;
                }
            }
        });
    }

    #[tokio::test]
    async fn test_authorize_returns_reply_outcome() {
        let registry = registry();
        let (req_tx, req_rx, resp_tx, resp_rx) = create_test_channel(16);
        let handler = AuthorizationHandler::new(
            Arc::clone(&registry),
            Arc::new(ChannelSender(req_tx)),
            Duration::from_secs(5),
        );
        let listener = ResponseListener::new(
            Arc::clone(&registry),
            Arc::new(ChannelReceiver(Mutex::new(resp_rx))),
        );
        tokio::spawn(listener.run());
        spawn_responder(req_rx, resp_tx, AuthenticationStatus::Accepted);

        let outcome = handler.authorize("station-1", Some("token".into())).await;
        assert_eq!(outcome, Ok(AuthenticationStatus::Accepted));
        assert_eq!(handler.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_request_carries_correlation_id_and_token() {
        let registry = registry();
        let (req_tx, mut req_rx, _resp_tx, _resp_rx) = create_test_channel(16);
        let handler = AuthorizationHandler::new(
            Arc::clone(&registry),
            Arc::new(ChannelSender(req_tx)),
            Duration::from_secs(5),
        );

        let pending = handler
            .begin_request(Some("driver-token".into()))
            .await
            .unwrap();
        let sent = req_rx.recv().await.unwrap();

        assert_eq!(sent.request_id, Some(pending.id().to_string()));
        assert_eq!(sent.token(), Some("driver-token"));
        assert!(registry.is_pending(&pending.id()));
    }

    #[tokio::test]
    async fn test_publish_failure_rolls_back_registration() {
        let registry = registry();
        let handler = AuthorizationHandler::new(
            Arc::clone(&registry),
            Arc::new(FailingSender),
            Duration::from_secs(5),
        );

        let outcome = handler.authorize("station-1", Some("token".into())).await;

        assert!(matches!(outcome, Err(AuthorizationError::Internal(_))));
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_distinct_and_cleans_up() {
        let registry = registry();
        let (req_tx, _req_rx, _resp_tx, _resp_rx) = create_test_channel(16);
        let handler = AuthorizationHandler::new(
            Arc::clone(&registry),
            Arc::new(ChannelSender(req_tx)),
            Duration::from_secs(5),
        );

        let outcome = handler.authorize("station-1", Some("token".into())).await;

        assert_eq!(outcome, Err(AuthorizationError::Timeout(Duration::from_secs(5))));
        assert_eq!(registry.pending_count(), 0);
        assert_eq!(registry.stats().snapshot().timeouts, 1);
    }

    #[tokio::test]
    async fn test_listener_stops_when_channel_closes() {
        let (_req_tx, _req_rx, resp_tx, resp_rx) = create_test_channel(1);
        let listener = ResponseListener::new(
            registry(),
            Arc::new(ChannelReceiver(Mutex::new(resp_rx))),
        );
        drop(resp_tx);

        tokio::time::timeout(Duration::from_secs(1), listener.run())
            .await
            .expect("listener should stop");
    }
}
