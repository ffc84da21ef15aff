//! # CSMS Node
//!
//! Runs the authentication and transaction services in one process.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and metrics
//! 2. Load configuration from the environment
//! 3. Start the authentication consumer and the response listener
//! 4. Serve HTTP until Ctrl+C

use anyhow::{Context, Result};
use csms_node::{load_config, NodeRuntime};
use csms_telemetry::TelemetryConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // `CSMS_SERVICE_NAME` overrides the default name.
    let telemetry = TelemetryConfig::for_service("csms-node");
    csms_telemetry::init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = load_config();

    let runtime = NodeRuntime::new(config);
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;

    Ok(())
}
