//! # Squeezy Webhooks HTTP Service
//!
//! HTTP server and runtime adapters for Lemon Squeezy webhooks.
//!
//! This crate provides:
//! - The webhook route, which hands every request to a shared
//!   [`WebhookDispatcher`] and writes its response back unchanged
//! - A `GET /health` endpoint
//! - Adapters for plain `http` crate requests and for axum
//! - Service configuration and graceful shutdown

pub mod adapters;
pub mod config;
pub mod errors;

pub use adapters::{
    dispatch_axum_request, from_parts, handle_http_request, normalize_http_request,
    HttpResponseEmitter, WebhookReply,
};
pub use config::{LoggingConfig, ServerConfig, ServiceConfig, WebhookConfig};
pub use errors::{ConfigError, ServiceError};

use axum::{
    extract::{Request, State},
    response::Json,
    routing::{any, get},
    Router,
};
use serde::{Deserialize, Serialize};
use squeezy_webhooks_core::webhook::WebhookDispatcher;
use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::Notify;
use tower::ServiceBuilder;
use tower_http::{timeout::RequestBodyTimeoutLayer, trace::TraceLayer};
use tracing::{error, info, instrument, warn};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: ServiceConfig,

    /// Dispatcher shared by every webhook request
    pub dispatcher: Arc<WebhookDispatcher>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ServiceConfig, dispatcher: Arc<WebhookDispatcher>) -> Self {
        Self { config, dispatcher }
    }
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
///
/// The webhook route accepts every method so that the dispatcher, not the
/// router, answers non-`POST` requests with its own 405 body. The body size
/// limit is applied by the webhook handler after the method check, and
/// `server.timeout_seconds` bounds how long reading the body may take. Both
/// failures come back as reported dispatcher responses.
pub fn create_router(state: AppState) -> Router {
    let body_timeout = Duration::from_secs(state.config.server.timeout_seconds);

    Router::new()
        .route(&state.config.webhook.endpoint_path, any(handle_webhook))
        .route("/health", get(handle_health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyTimeoutLayer::new(body_timeout))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
pub async fn start_server(
    config: ServiceConfig,
    dispatcher: Arc<WebhookDispatcher>,
) -> Result<(), ServiceError> {
    let address = format!("{}:{}", config.server.host, config.server.port);
    let addr: SocketAddr = address.parse().map_err(|_| {
        ServiceError::Configuration(ConfigError::Invalid {
            message: format!("Invalid server address: {}", address),
        })
    })?;

    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: addr.to_string(),
                message: e.to_string(),
            })?;

    info!(
        "Starting HTTP server on {} (webhook path {})",
        addr, config.webhook.endpoint_path
    );

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    let app = create_router(AppState::new(config, dispatcher));

    // In-flight requests finish after the signal; new connections are refused.
    let signalled = Arc::new(Notify::new());
    let notify = signalled.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!(
                "Initiating graceful shutdown with {}s timeout",
                shutdown_timeout.as_secs()
            );
            notify.notify_one();
        })
        .into_future();

    let drain_deadline = async {
        signalled.notified().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| ServiceError::ServerFailed {
                message: e.to_string(),
            })?;
        }
        _ = drain_deadline => {
            warn!(
                "Graceful shutdown did not finish within {}s, dropping open connections",
                shutdown_timeout.as_secs()
            );
        }
    }

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C)"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Handle Lemon Squeezy webhook requests
#[instrument(skip_all, fields(method = %request.method(), uri = %request.uri()))]
pub async fn handle_webhook(State(state): State<AppState>, request: Request) -> WebhookReply {
    info!("Received webhook request");

    dispatch_axum_request(&state.dispatcher, request, state.config.server.max_body_size).await
}

/// Basic health check endpoint
#[instrument]
async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
