//! Node runtime wiring both services onto one event bus.

use crate::config::NodeConfig;
use anyhow::{Context, Result};
use csms_authentication::{
    AuthenticationConsumer, AuthenticationService, StaticTokenStore, ValidationService,
};
use csms_transactions::{
    EventBusReceiver, EventBusSender, ResponseListener, TransactionService,
};
use shared_bus::InMemoryEventBus;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long shutdown waits for tasks to finish.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The node runtime orchestrating the authentication and transaction services.
pub struct NodeRuntime {
    config: NodeConfig,
    /// Shared event bus.
    bus: Arc<InMemoryEventBus>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    /// Spawned service tasks.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NodeRuntime {
    /// Create a new node runtime with configuration.
    pub fn new(config: NodeConfig) -> Self {
        info!("Creating CSMS node runtime");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            bus: Arc::new(InMemoryEventBus::new()),
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start both services and return the HTTP address being served.
    ///
    /// ## Startup Sequence
    ///
    /// 1. Validate configuration
    /// 2. Subscribe the authentication consumer to requests
    /// 3. Subscribe the response listener to replies
    /// 4. Bind HTTP and start serving
    ///
    /// Both subscriptions exist before the first request can be published.
    pub async fn start(&self) -> Result<SocketAddr> {
        info!("===========================================");
        info!("  CSMS Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        self.config.validate().context("Invalid configuration")?;

        // Authentication service
        let validation = ValidationService::standard(&self.config.validation);
        let service = Arc::new(AuthenticationService::new(
            validation,
            StaticTokenStore::seeded(),
        ));
        let consumer = AuthenticationConsumer::new(service, Arc::clone(&self.bus));
        self.spawn("authentication", consumer.run()).await;

        // Transaction service
        let sender = Arc::new(EventBusSender::new(Arc::clone(&self.bus)));
        let transactions = TransactionService::new(self.config.transactions.clone(), sender)
            .context("Failed to create transaction service")?;

        let receiver = Arc::new(EventBusReceiver::new(self.bus.as_ref()));
        let listener = ResponseListener::new(transactions.registry(), receiver);
        self.spawn("response-listener", listener.run()).await;

        let tcp = transactions
            .bind()
            .await
            .context("Failed to bind HTTP listener")?;
        let addr = tcp.local_addr().context("Failed to read bound address")?;

        let mut http_shutdown = self.shutdown_rx.clone();
        let server = tokio::spawn(async move {
            let signal = async move {
                let _ = http_shutdown.changed().await;
            };
            if let Err(e) = transactions.serve(tcp, signal).await {
                error!(error = %e, "Transaction service failed");
            }
        });
        self.tasks.lock().await.push(server);

        info!(http = %addr, "CSMS node running");
        Ok(addr)
    }

    /// Shutdown the node gracefully.
    ///
    /// Signals every task, then waits up to a short grace period for them.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        let joined = tokio::time::timeout(SHUTDOWN_GRACE, async {
            for task in tasks {
                let _ = task.await;
            }
        })
        .await;

        if joined.is_err() {
            warn!("Some tasks did not stop within the grace period");
        }

        info!("Shutdown complete");
    }

    /// The shared event bus.
    pub fn bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.bus)
    }

    /// Run `task` until it ends or shutdown is signalled.
    async fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = task => {}
                _ = shutdown.changed() => {
                    info!("[{}] Shutdown signal received", name);
                }
            }
        });
        self.tasks.lock().await.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn local_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.transactions.http.host = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.transactions.http.port = 0;
        config
    }

    #[tokio::test]
    async fn test_node_answers_over_http() {
        let runtime = NodeRuntime::new(local_config());
        let addr = runtime.start().await.unwrap();

        let response = reqwest::Client::new()
            .post(format!("http://{addr}/api/v1/transaction/authorize"))
            .json(&serde_json::json!({
                "stationUuid": "station-1",
                "driverIdentifier": {"id": "driverABC-1234567890"}
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"authenticationStatus": "ACCEPTED"}));

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_invalid_config_fails_start() {
        let mut config = local_config();
        config.validation.min_token_length = 100;

        let runtime = NodeRuntime::new(config);
        assert!(runtime.start().await.is_err());
    }

    #[tokio::test]
    async fn test_subscriptions_exist_after_start() {
        let runtime = NodeRuntime::new(local_config());
        runtime.start().await.unwrap();

        let bus = runtime.bus();
        assert_eq!(bus.subscribers_for(shared_bus::EventTopic::AuthRequest), 1);
        assert_eq!(bus.subscribers_for(shared_bus::EventTopic::AuthResponse), 1);

        runtime.shutdown().await;
    }
}
