//! # Squeezy Webhooks Service
//!
//! Binary entry point for the Lemon Squeezy webhook service.
//!
//! This executable:
//! - Loads configuration from files and the environment
//! - Initializes logging
//! - Builds the webhook dispatcher with the logging handler
//! - Starts the HTTP server from squeezy-webhooks-api

mod handler;
mod settings;

use handler::LoggingEventHandler;
use squeezy_webhooks_api::{start_server, LoggingConfig};
use squeezy_webhooks_core::webhook::{TracingErrorReporter, WebhookDispatcher};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Logging settings come from the configuration, so load it first and
    // report any failure once the subscriber is up.
    let loaded = settings::load_service_config();
    let logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging);

    info!("Starting Squeezy Webhooks Service");

    let service_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration; aborting");
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(
            error = %e,
            "Service configuration is invalid; aborting. Set {} or SQW__WEBHOOK__SECRET.",
            settings::SECRET_ENV
        );
        std::process::exit(3);
    }

    let secret = match service_config.webhook_secret() {
        Ok(secret) => secret,
        Err(e) => {
            error!(error = %e, "Webhook secret is unusable; aborting");
            std::process::exit(3);
        }
    };

    let dispatcher = match WebhookDispatcher::new(secret, Arc::new(LoggingEventHandler::new())) {
        Ok(dispatcher) => dispatcher.with_reporter(Arc::new(TracingErrorReporter)),
        Err(e) => {
            error!(error = %e, "Failed to build webhook dispatcher; aborting");
            std::process::exit(3);
        }
    };

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        endpoint = %service_config.webhook.endpoint_path,
        "Starting HTTP server"
    );

    if let Err(e) = start_server(service_config, Arc::new(dispatcher)).await {
        error!("Failed to start server: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&logging.level)));

    let (json_layer, text_layer) = if logging.json_format {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn default_filter(level: &str) -> String {
    format!(
        "squeezy_webhooks_service={level},squeezy_webhooks_api={level},squeezy_webhooks_core={level},tower_http=debug"
    )
}
