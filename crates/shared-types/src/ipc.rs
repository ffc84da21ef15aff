//! # IPC Message Payloads
//!
//! The two messages that cross the event bus:
//!
//! - [`AuthenticationMessage`]: transaction service -> authentication service
//! - [`AuthenticationResponse`]: authentication service -> transaction service
//!
//! Both carry the `requestId` issued by the transaction service so the reply
//! can be matched to the waiting caller.

use crate::entities::AuthenticationStatus;
use crate::errors::CodecError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Request id echoed back when an inbound message carries none.
pub const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Identity check request.
///
/// Both fields are optional on the wire: the message may arrive from an
/// untrusted producer, and a missing token is a validation failure rather
/// than a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationMessage {
    /// Correlation id issued by the requester.
    #[serde(default)]
    pub request_id: Option<String>,
    /// Driver token to check.
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthenticationMessage {
    /// Create a request carrying `token`.
    pub fn new(request_id: impl Into<String>, token: Option<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            token,
        }
    }

    /// Token as a string slice, if present.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Request id to echo in the reply.
    #[must_use]
    pub fn reply_id(&self) -> &str {
        self.request_id.as_deref().unwrap_or(UNKNOWN_REQUEST_ID)
    }
}

/// Identity check reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    /// Correlation id copied from the request.
    pub request_id: String,
    /// Decision outcome. Written as `status`; `authenticationStatus` is
    /// accepted on input.
    #[serde(rename = "status", alias = "authenticationStatus")]
    pub authentication_status: AuthenticationStatus,
}

impl AuthenticationResponse {
    /// Create a reply for `request_id`.
    pub fn new(request_id: impl Into<String>, authentication_status: AuthenticationStatus) -> Self {
        Self {
            request_id: request_id.into(),
            authentication_status,
        }
    }
}

/// JSON wire codec for bus payloads.
pub mod codec {
    use super::*;

    /// Encode a message as JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encode` if serialization fails.
    pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(message).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Decode an identity check request.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Decode` if the bytes are not a JSON object of the
    /// expected shape.
    pub fn decode_message(bytes: &[u8]) -> Result<AuthenticationMessage, CodecError> {
        decode(bytes)
    }

    /// Decode an identity check reply.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Decode` if the bytes are malformed, the
    /// `requestId` is missing, or the status literal is unknown.
    pub fn decode_response(bytes: &[u8]) -> Result<AuthenticationResponse, CodecError> {
        decode(bytes)
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_shape() {
        let message = AuthenticationMessage::new("req-1", Some("driver-token".into()));
        let json: serde_json::Value =
            serde_json::from_slice(&codec::encode(&message).unwrap()).unwrap();

        assert_eq!(json["requestId"], "req-1");
        assert_eq!(json["token"], "driver-token");
    }

    #[test]
    fn test_response_wire_shape() {
        let response = AuthenticationResponse::new("req-2", AuthenticationStatus::Rejected);
        let json: serde_json::Value =
            serde_json::from_slice(&codec::encode(&response).unwrap()).unwrap();

        assert_eq!(json["requestId"], "req-2");
        assert_eq!(json["status"], "REJECTED");
        assert!(json.get("authenticationStatus").is_none());
    }

    #[test]
    fn test_decision_service_reply_decodes() {
        let reply = codec::decode_response(br#"{"requestId":"abc","status":"ACCEPTED"}"#).unwrap();
        assert_eq!(reply.request_id, "abc");
        assert_eq!(reply.authentication_status, AuthenticationStatus::Accepted);

        let legacy =
            codec::decode_response(br#"{"requestId":"abc","authenticationStatus":"REJECTED"}"#)
                .unwrap();
        assert_eq!(legacy.authentication_status, AuthenticationStatus::Rejected);
    }

    #[test]
    fn test_null_and_missing_token_decode_as_absent() {
        let null_token = codec::decode_message(br#"{"requestId":"a","token":null}"#).unwrap();
        assert_eq!(null_token.token(), None);

        let missing = codec::decode_message(br#"{"requestId":"b"}"#).unwrap();
        assert_eq!(missing.token(), None);
        assert_eq!(missing.reply_id(), "b");
    }

    #[test]
    fn test_missing_request_id_echoes_unknown() {
        let message = codec::decode_message(br#"{"token":"x"}"#).unwrap();
        assert_eq!(message.reply_id(), UNKNOWN_REQUEST_ID);
    }

    #[test]
    fn test_response_with_unknown_status_is_rejected() {
        let result = codec::decode_response(br#"{"requestId":"a","status":"MAYBE"}"#);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(codec::decode_message(b"not json").is_err());
        assert!(codec::decode_response(b"{}").is_err());
    }
}
