//! Transaction service: HTTP surface over the authorization facade.

use crate::domain::config::TransactionConfig;
use crate::domain::error::{AuthorizationError, GatewayError};
use crate::domain::pending::{sweeper_task, CorrelationRegistry};
use crate::domain::types::{AuthorizationRequest, AuthorizationResponse, ErrorResponse};
use crate::ipc::handler::{AuthorizationHandler, RequestSender};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Path of the authorization endpoint.
pub const AUTHORIZE_PATH: &str = "/api/v1/transaction/authorize";

/// Transaction service state
pub struct TransactionService {
    config: TransactionConfig,
    registry: Arc<CorrelationRegistry>,
    handler: Arc<AuthorizationHandler>,
}

impl TransactionService {
    /// Create a new transaction service publishing through `sender`.
    pub fn new(
        config: TransactionConfig,
        sender: Arc<dyn RequestSender>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let registry = Arc::new(CorrelationRegistry::new(
            config.registry.max_entries,
            config.registry.max_age,
        ));

        let handler = Arc::new(AuthorizationHandler::new(
            Arc::clone(&registry),
            sender,
            config.authorization.timeout,
        ));

        Ok(Self {
            config,
            registry,
            handler,
        })
    }

    /// Registry shared with the response listener.
    pub fn registry(&self) -> Arc<CorrelationRegistry> {
        Arc::clone(&self.registry)
    }

    /// The synchronous authorization facade.
    pub fn handler(&self) -> Arc<AuthorizationHandler> {
        Arc::clone(&self.handler)
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Bind the configured HTTP address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn start<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// Runs the registry sweeper for as long as the server runs.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sweeper = tokio::spawn(sweeper_task(
            Arc::clone(&self.registry),
            self.config.registry.sweep_interval,
        ));

        let addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %addr, "Starting HTTP server");

        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await;

        sweeper.abort();

        match result {
            Ok(()) => {
                info!("Transaction service stopped");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "HTTP server error");
                Err(GatewayError::Serve(e.to_string()))
            }
        }
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let state = AppState {
            handler: Arc::clone(&self.handler),
            registry: Arc::clone(&self.registry),
        };

        Router::new()
            .route(AUTHORIZE_PATH, post(handle_authorize))
            .route("/health", get(health_check))
            .route("/pending", get(pending_stats))
            .route("/metrics", get(metrics))
            .with_state(state)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    handler: Arc<AuthorizationHandler>,
    registry: Arc<CorrelationRegistry>,
}

async fn handle_authorize(
    State(state): State<AppState>,
    Json(request): Json<AuthorizationRequest>,
) -> Response {
    let token = request.driver_token().map(str::to_owned);

    match state.handler.authorize(&request.station_uuid, token).await {
        Ok(status) => (
            StatusCode::OK,
            Json(AuthorizationResponse {
                authentication_status: status,
            }),
        )
            .into_response(),
        Err(e) => {
            let code = match e {
                AuthorizationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                AuthorizationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (code, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
    }
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "pending": state.registry.pending_count(),
    }))
}

async fn pending_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "count": state.registry.pending_count(),
        "capacity": state.registry.capacity(),
        "stats": state.registry.stats().snapshot(),
    }))
}

async fn metrics() -> Response {
    match csms_telemetry::encode_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: e.to_string() }),
        )
            .into_response(),
    }
}
