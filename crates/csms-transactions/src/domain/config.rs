//! Transaction service configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main transaction service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Authorization call configuration
    pub authorization: AuthorizationConfig,
    /// Pending-reply registry bounds
    pub registry: RegistryConfig,
}

impl TransactionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.authorization.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "authorization timeout cannot be 0".into(),
            ));
        }

        if self.registry.max_entries == 0 {
            return Err(ConfigError::InvalidLimit(
                "registry max_entries cannot be 0".into(),
            ));
        }

        if self.registry.max_age.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "registry max_age cannot be 0".into(),
            ));
        }

        if self.registry.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "registry sweep_interval cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
        }
    }
}

/// Authorization call configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// How long a caller waits for the reply (default: 5s)
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Bounds on the pending-reply registry, independent of the call timeout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum live waiters; the oldest is evicted past this (default: 10000)
    pub max_entries: usize,
    /// Maximum waiter age before the sweeper evicts it (default: 10m)
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,
    /// How often the sweeper runs (default: 1s)
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_age: Duration::from_secs(10 * 60),
            sweep_interval: Duration::from_secs(1),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}
