//! Test fixtures wiring both services onto one bus.

use csms_authentication::{AuthenticationConsumer, AuthenticationService, StaticTokenStore};
use csms_transactions::{
    AuthorizationHandler, CorrelationRegistry, EventBusReceiver, EventBusSender, ResponseListener,
};
use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A bus with the transaction side listening and, optionally, an
/// authentication consumer answering.
pub struct Harness {
    pub bus: Arc<InMemoryEventBus>,
    pub registry: Arc<CorrelationRegistry>,
    pub handler: Arc<AuthorizationHandler>,
    tasks: Vec<JoinHandle<()>>,
}

impl Harness {
    /// Both services wired, answering from `store`.
    pub fn new(store: StaticTokenStore, timeout: Duration) -> Self {
        let mut harness = Self::without_consumer(timeout);
        harness.add_consumer(store);
        harness
    }

    /// Transaction side only; nothing answers requests.
    pub fn without_consumer(timeout: Duration) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let registry = Arc::new(CorrelationRegistry::new(1_000, Duration::from_secs(600)));

        let sender = Arc::new(EventBusSender::new(Arc::clone(&bus)));
        let handler = Arc::new(AuthorizationHandler::new(
            Arc::clone(&registry),
            sender,
            timeout,
        ));

        let receiver = Arc::new(EventBusReceiver::new(bus.as_ref()));
        let listener = ResponseListener::new(Arc::clone(&registry), receiver);

        Self {
            bus,
            registry,
            handler,
            tasks: vec![tokio::spawn(listener.run())],
        }
    }

    /// Start another authentication consumer on the same bus.
    pub fn add_consumer(&mut self, store: StaticTokenStore) {
        let service = Arc::new(AuthenticationService::with_default_validation(store));
        let consumer = AuthenticationConsumer::new(service, Arc::clone(&self.bus));
        self.tasks.push(tokio::spawn(consumer.run()));
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// A token of exactly `len` characters.
pub fn token_of_len(len: usize) -> String {
    let mut token = String::from("driver-");
    while token.len() < len {
        token.push('x');
    }
    token.truncate(len);
    token
}

/// Poll `condition` until it holds, for up to a second.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
