//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "csms".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CSMS_SERVICE_NAME`: Service name (default: csms)
    /// - `CSMS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `CSMS_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `CSMS_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Create configuration from the environment with `service_name` as the
    /// default name. `CSMS_SERVICE_NAME` still takes precedence.
    pub fn for_service(service_name: &str) -> Self {
        Self::service_from_vars(service_name, |key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self::service_from_vars("csms", var)
    }

    fn service_from_vars(default_name: &str, var: impl Fn(&str) -> Option<String>) -> Self {
        let is_container =
            var("KUBERNETES_SERVICE_HOST").is_some() || var("DOCKER_CONTAINER").is_some();

        Self {
            service_name: var("CSMS_SERVICE_NAME").unwrap_or_else(|| default_name.to_string()),

            log_level: var("CSMS_LOG_LEVEL")
                .or_else(|| var("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: var("CSMS_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: var("CSMS_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }
}
