//! # CSMS Telemetry
//!
//! Observability for the transaction and authentication services.
//!
//! ## Components
//!
//! - **Logging**: `tracing` subscriber with an env filter, human or JSON output
//! - **Metrics**: Prometheus counters and gauges in a crate-local registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use csms_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CSMS_SERVICE_NAME` | `csms` (`csms-node` for the node binary) | Service name in log lines |
//! | `CSMS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CSMS_JSON_LOGS` | `false` (`true` in containers) | JSON log output |
//! | `CSMS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics, MetricsHandle};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Register metrics and install the global log subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or a metric cannot be
/// registered.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<MetricsHandle, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(metrics)
}
