//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::{BusEvent, EventFilter, EventTopic};
use crate::subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionTable};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscriptions whose filter accepts the event.
    /// Zero means the record was dropped.
    async fn publish(&self, event: BusEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Suitable for single-process operation; a distributed deployment would put
/// a broker client behind the same traits.
pub struct InMemoryEventBus {
    /// Broadcast sender for events.
    sender: broadcast::Sender<BusEvent>,

    /// Active subscriptions and their filters.
    subscriptions: SubscriptionTable,

    /// Next subscription id.
    next_subscription_id: AtomicU64,

    /// Total events published.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            next_subscription_id: AtomicU64::new(0),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Number of active subscriptions that would receive a record on `topic`.
    #[must_use]
    pub fn subscribers_for(&self, topic: EventTopic) -> usize {
        let probe = BusEvent::raw(topic, "", Vec::new());
        self.matching_subscriptions(&probe)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn matching_subscriptions(&self, event: &BusEvent) -> usize {
        self.subscriptions
            .read()
            .map(|table| table.values().filter(|f| f.matches(event)).count())
            .unwrap_or(0)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut table) = self.subscriptions.write() {
            table.insert(id, filter.clone());
        }

        debug!(subscription_id = id, topics = ?filter.topics, "New subscription created");

        Subscription::new(receiver, filter, id, Arc::clone(&self.subscriptions))
    }

    fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.subscribe(filter).into_stream()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: BusEvent) -> usize {
        let topic = event.topic;
        let key = event.key.clone();

        // Always increment counter (event was attempted)
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let matching = self.matching_subscriptions(&event);
        if matching == 0 {
            warn!(topic = topic.name(), key = %key, "Event dropped (no subscribers for topic)");
            return 0;
        }

        match self.sender.send(event) {
            Ok(_) => {
                debug!(
                    topic = topic.name(),
                    key = %key,
                    receivers = matching,
                    "Event published"
                );
                matching
            }
            Err(e) => {
                warn!(
                    topic = topic.name(),
                    key = %key,
                    error = %e,
                    "Event dropped (no receivers)"
                );
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
