//! Service configuration loading.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. `/etc/squeezy-webhooks/service.yaml`
//! 2. `./config/service.yaml`
//! 3. The file named by `SQW_CONFIG_FILE` (must exist when set)
//! 4. Environment variables prefixed `SQW__`, e.g. `SQW__SERVER__PORT=9090`
//!
//! `SQUEEZY_WEBHOOK_SECRET` fills in `webhook.secret` when no other source
//! set it.

use squeezy_webhooks_api::{ConfigError, ServiceConfig};
use std::env;
use tracing::info;

pub const CONFIG_FILE_ENV: &str = "SQW_CONFIG_FILE";
pub const SECRET_ENV: &str = "SQUEEZY_WEBHOOK_SECRET";

const DEFAULT_CONFIG_FILES: [&str; 2] = ["/etc/squeezy-webhooks/service", "config/service"];

/// Load the service configuration from files and the environment.
pub fn load_service_config() -> Result<ServiceConfig, ConfigError> {
    load_from(&DEFAULT_CONFIG_FILES)
}

fn load_from(default_files: &[&str]) -> Result<ServiceConfig, ConfigError> {
    let mut builder = config::Config::builder();

    for path in default_files {
        builder = builder.add_source(
            config::File::with_name(path)
                .required(false)
                .format(config::FileFormat::Yaml),
        );
    }

    if let Ok(explicit_path) = env::var(CONFIG_FILE_ENV) {
        if !explicit_path.is_empty() {
            builder = builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
            info!(path = %explicit_path, "Loading configuration from explicit path");
        }
    }

    let mut service_config: ServiceConfig = builder
        .add_source(config::Environment::with_prefix("SQW").separator("__"))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ConfigError::Load {
            message: e.to_string(),
        })?;

    if service_config.webhook.secret.is_none() {
        if let Ok(secret) = env::var(SECRET_ENV) {
            if !secret.is_empty() {
                service_config.webhook.secret = Some(secret);
            }
        }
    }

    Ok(service_config)
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
