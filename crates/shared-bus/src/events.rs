//! # Bus Events
//!
//! A bus event is a keyed JSON record on a topic, mirroring a broker record.
//! Typed construction and decoding go through `shared_types::codec`.

use shared_types::{codec, AuthenticationMessage, AuthenticationResponse, CodecError};

/// Topics known to the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    /// Identity check requests (transaction service -> authentication service).
    AuthRequest,
    /// Identity check replies (authentication service -> transaction service).
    AuthResponse,
    /// Wildcard used only in filters.
    All,
}

impl EventTopic {
    /// Broker-style topic name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AuthRequest => "auth-request",
            Self::AuthResponse => "auth-response",
            Self::All => "*",
        }
    }
}

/// A record published to the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusEvent {
    /// Topic the record is published on.
    pub topic: EventTopic,
    /// Record key (the request id).
    pub key: String,
    /// JSON payload.
    pub payload: Vec<u8>,
}

impl BusEvent {
    /// Build a raw record. Used by tests to inject malformed payloads.
    pub fn raw(topic: EventTopic, key: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            topic,
            key: key.into(),
            payload,
        }
    }

    /// Encode an identity check request onto the request topic.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encode` if the message cannot be serialized.
    pub fn request(message: &AuthenticationMessage) -> Result<Self, CodecError> {
        Ok(Self {
            topic: EventTopic::AuthRequest,
            key: message.reply_id().to_string(),
            payload: codec::encode(message)?,
        })
    }

    /// Encode an identity check reply onto the response topic.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encode` if the reply cannot be serialized.
    pub fn response(response: &AuthenticationResponse) -> Result<Self, CodecError> {
        Ok(Self {
            topic: EventTopic::AuthResponse,
            key: response.request_id.clone(),
            payload: codec::encode(response)?,
        })
    }

    /// Decode the payload as an identity check request.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Decode` if the payload is not a request.
    pub fn decode_request(&self) -> Result<AuthenticationMessage, CodecError> {
        codec::decode_message(&self.payload)
    }

    /// Decode the payload as an identity check reply.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Decode` if the payload is not a reply.
    pub fn decode_response(&self) -> Result<AuthenticationResponse, CodecError> {
        codec::decode_response(&self.payload)
    }
}

/// Filter for subscribing to specific topics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &BusEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic)
    }
}
