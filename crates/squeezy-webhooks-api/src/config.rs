//! Configuration types for the HTTP service

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use squeezy_webhooks_core::WebhookSecret;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Webhook endpoint settings
    pub webhook: WebhookConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Check the configuration before the server binds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.webhook.secret.as_deref() {
            None => {
                return Err(ConfigError::Missing {
                    key: "webhook.secret".to_string(),
                })
            }
            Some(secret) if secret.is_empty() => {
                return Err(ConfigError::Invalid {
                    message: "webhook.secret must not be empty".to_string(),
                })
            }
            Some(_) => {}
        }

        if !self.webhook.endpoint_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                message: format!(
                    "webhook.endpoint_path must start with '/': {}",
                    self.webhook.endpoint_path
                ),
            });
        }

        if self.webhook.endpoint_path == "/health" {
            return Err(ConfigError::Invalid {
                message: "webhook.endpoint_path conflicts with the health endpoint".to_string(),
            });
        }

        if self.server.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "server.max_body_size must be greater than zero".to_string(),
            });
        }

        if self.server.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                message: "server.timeout_seconds must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// The signing secret as a [`WebhookSecret`].
    pub fn webhook_secret(&self) -> Result<WebhookSecret, ConfigError> {
        let secret = self
            .webhook
            .secret
            .clone()
            .ok_or_else(|| ConfigError::Missing {
                key: "webhook.secret".to_string(),
            })?;

        WebhookSecret::new(secret).map_err(|e| ConfigError::Invalid {
            message: format!("webhook.secret: {}", e),
        })
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            timeout_seconds: 30,
            shutdown_timeout_seconds: 30,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Webhook endpoint configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Path the webhook route is mounted on
    pub endpoint_path: String,

    /// Shared signing secret from the Lemon Squeezy dashboard
    #[serde(skip_serializing)]
    pub secret: Option<String>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/api/webhooks".to_string(),
            secret: None,
        }
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("endpoint_path", &self.endpoint_path)
            .field("secret", &self.secret.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
