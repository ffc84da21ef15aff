//! HTTP request and response bodies for the authorization endpoint.

use serde::{Deserialize, Serialize};
use shared_types::AuthenticationStatus;

/// Body of `POST /api/v1/transaction/authorize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationRequest {
    /// Charging station asking for the authorization
    pub station_uuid: String,
    /// Driver presenting the token. Missing means no token.
    #[serde(default)]
    pub driver_identifier: Option<DriverIdentifier>,
}

impl AuthorizationRequest {
    /// Request for `token` at `station_uuid`.
    pub fn new(station_uuid: impl Into<String>, token: Option<String>) -> Self {
        Self {
            station_uuid: station_uuid.into(),
            driver_identifier: Some(DriverIdentifier { id: token }),
        }
    }

    /// The driver token, if any.
    pub fn driver_token(&self) -> Option<&str> {
        self.driver_identifier.as_ref()?.id.as_deref()
    }
}

/// Driver identifier; `id` is the token checked by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverIdentifier {
    #[serde(default)]
    pub id: Option<String>,
}

/// Successful authorization body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationResponse {
    pub authentication_status: AuthenticationStatus,
}

/// Error body for 5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
