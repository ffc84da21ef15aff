//! Node configuration loaded from environment variables.

use csms_authentication::ValidationConfig;
use csms_transactions::TransactionConfig;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Configuration for every component of the node.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Transaction service: HTTP, call timeout, registry bounds
    pub transactions: TransactionConfig,
    /// Authentication service token rules
    pub validation: ValidationConfig,
}

impl NodeConfig {
    /// Check every section.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.transactions.validate()?;
        self.validation.validate()?;
        Ok(())
    }
}

/// Load configuration from the environment.
///
/// # Environment Variables
///
/// - `CSMS_HTTP_HOST`, `CSMS_HTTP_PORT`: HTTP bind address (default 0.0.0.0:8080)
/// - `CSMS_AUTH_TIMEOUT_SECS`: authorization call timeout (default 5)
/// - `CSMS_REGISTRY_MAX_ENTRIES`: live waiter bound (default 10000)
/// - `CSMS_REGISTRY_MAX_AGE_SECS`: waiter age bound (default 600)
/// - `CSMS_TOKEN_MIN_LENGTH`, `CSMS_TOKEN_MAX_LENGTH`: token length range (default 20..=80)
///
/// Malformed values are logged and the default is kept, so logging should be
/// initialized first.
pub fn load_config() -> NodeConfig {
    load_config_from(|key| std::env::var(key).ok())
}

pub(crate) fn load_config_from(var: impl Fn(&str) -> Option<String>) -> NodeConfig {
    let mut config = NodeConfig::default();

    let tx = &mut config.transactions;
    override_from(&var, "CSMS_HTTP_HOST", &mut tx.http.host);
    override_from(&var, "CSMS_HTTP_PORT", &mut tx.http.port);
    override_secs(&var, "CSMS_AUTH_TIMEOUT_SECS", &mut tx.authorization.timeout);
    override_from(&var, "CSMS_REGISTRY_MAX_ENTRIES", &mut tx.registry.max_entries);
    override_secs(&var, "CSMS_REGISTRY_MAX_AGE_SECS", &mut tx.registry.max_age);

    let validation = &mut config.validation;
    override_from(&var, "CSMS_TOKEN_MIN_LENGTH", &mut validation.min_token_length);
    override_from(&var, "CSMS_TOKEN_MAX_LENGTH", &mut validation.max_token_length);

    config
}

fn override_from<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) {
    let Some(raw) = var(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => warn!(key, value = %raw, "Ignoring malformed environment value"),
    }
}

fn override_secs(var: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut Duration) {
    let mut secs = slot.as_secs();
    override_from(var, key, &mut secs);
    *slot = Duration::from_secs(secs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::{IpAddr, Ipv4Addr};

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = load_config_from(vars(&[]));

        assert_eq!(config.transactions.http.port, 8080);
        assert_eq!(config.transactions.authorization.timeout, Duration::from_secs(5));
        assert_eq!(config.transactions.registry.max_entries, 10_000);
        assert_eq!(config.validation.min_token_length, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = load_config_from(vars(&[
            ("CSMS_HTTP_HOST", "127.0.0.1"),
            ("CSMS_HTTP_PORT", "9090"),
            ("CSMS_AUTH_TIMEOUT_SECS", "2"),
            ("CSMS_REGISTRY_MAX_ENTRIES", "64"),
            ("CSMS_REGISTRY_MAX_AGE_SECS", "30"),
            ("CSMS_TOKEN_MIN_LENGTH", "8"),
            ("CSMS_TOKEN_MAX_LENGTH", "16"),
        ]));

        let tx = &config.transactions;
        assert_eq!(tx.http.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(tx.http.port, 9090);
        assert_eq!(tx.authorization.timeout, Duration::from_secs(2));
        assert_eq!(tx.registry.max_entries, 64);
        assert_eq!(tx.registry.max_age, Duration::from_secs(30));
        assert_eq!(config.validation.min_token_length, 8);
        assert_eq!(config.validation.max_token_length, 16);
    }

    #[test]
    fn test_malformed_values_keep_defaults() {
        let config = load_config_from(vars(&[
            ("CSMS_HTTP_PORT", "not-a-port"),
            ("CSMS_AUTH_TIMEOUT_SECS", "-3"),
        ]));

        assert_eq!(config.transactions.http.port, 8080);
        assert_eq!(config.transactions.authorization.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects_inverted_token_range() {
        let config = load_config_from(vars(&[
            ("CSMS_TOKEN_MIN_LENGTH", "50"),
            ("CSMS_TOKEN_MAX_LENGTH", "10"),
        ]));

        assert!(config.validate().is_err());
    }
}
