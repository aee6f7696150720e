//! # Squeezy Webhooks CLI
//!
//! Developer tools for Lemon Squeezy webhooks:
//! - `sign` prints the `x-signature` value for a payload
//! - `verify` checks a signature against a payload
//! - `send` posts a signed payload to a running endpoint
//!
//! Payloads are read from a file, or from stdin when no file is given.

use clap::{Args, Parser, Subcommand};
use squeezy_webhooks_core::webhook::{compute_signature, verify, SIGNATURE_HEADER};
use squeezy_webhooks_core::WebhookSecret;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the signing secret.
pub const SECRET_ENV: &str = "SQUEEZY_WEBHOOK_SECRET";

// ============================================================================
// CLI Structure
// ============================================================================

/// Squeezy Webhooks CLI - sign, verify and replay Lemon Squeezy webhooks
#[derive(Parser, Debug)]
#[command(name = "squeezy-webhooks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sign, verify and replay Lemon Squeezy webhook payloads")]
pub struct Cli {
    /// Logging level
    #[arg(short, long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Signing secret argument shared by all commands
#[derive(Args, Debug, Clone)]
pub struct SecretArgs {
    /// Webhook signing secret
    #[arg(short, long, env = "SQUEEZY_WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: String,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the hex HMAC-SHA256 signature of a payload
    Sign {
        #[command(flatten)]
        secret: SecretArgs,

        /// Payload file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Check a signature against a payload; exits 1 on mismatch
    Verify {
        #[command(flatten)]
        secret: SecretArgs,

        /// Signature to check, as sent in the x-signature header
        #[arg(long)]
        signature: String,

        /// Payload file (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// POST a signed payload to a webhook endpoint
    Send {
        /// Endpoint URL, e.g. http://localhost:8080/api/webhooks
        #[arg(short, long)]
        url: String,

        #[command(flatten)]
        secret: SecretArgs,

        /// Payload file
        #[arg(short, long)]
        file: PathBuf,
    },
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Signature does not match the payload")]
    SignatureMismatch,

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("Failed to read payload from {path}: {source}")]
    ReadPayload {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SignatureMismatch => 1,
            Self::InvalidArgument { .. } => 2,
            Self::ReadPayload { .. } | Self::Output(_) => 3,
            Self::Request { .. } => 4,
        }
    }
}

/// Response returned by the endpoint for `send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub status: u16,
    pub body: String,
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    initialize_logging(&cli);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli.command, &mut out).await
}

/// Run one command, writing its result to `out`.
pub async fn execute(command: Commands, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Commands::Sign { secret, file } => {
            let body = read_payload(file.as_deref())?;
            let signature = sign_payload(&secret.secret, &body)?;
            writeln!(out, "{}", signature)?;
        }
        Commands::Verify {
            secret,
            signature,
            file,
        } => {
            let body = read_payload(file.as_deref())?;
            let secret = parse_secret(&secret.secret)?;
            if !verify(&secret, &body, signature.trim()) {
                return Err(CliError::SignatureMismatch);
            }
            writeln!(out, "Signature is valid")?;
        }
        Commands::Send { url, secret, file } => {
            let body = read_payload(Some(file.as_path()))?;
            let outcome = send_payload(&url, &secret.secret, body).await?;
            writeln!(out, "{}", outcome.status)?;
            writeln!(out, "{}", outcome.body)?;
        }
    }
    Ok(())
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Hex signature of `body` for `secret`.
pub fn sign_payload(secret: &str, body: &[u8]) -> Result<String, CliError> {
    let secret = parse_secret(secret)?;
    compute_signature(&secret, body).map_err(|e| CliError::InvalidArgument {
        arg: "secret".to_string(),
        message: e.to_string(),
    })
}

/// POST `body` to `url` with a freshly computed `x-signature` header.
pub async fn send_payload(url: &str, secret: &str, body: Vec<u8>) -> Result<SendOutcome, CliError> {
    let signature = sign_payload(secret, &body)?;
    info!(url = %url, body_size = body.len(), "Sending signed webhook payload");

    let request_error = |e: reqwest::Error| CliError::Request {
        url: url.to_string(),
        message: e.to_string(),
    };

    let response = reqwest::Client::new()
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(body)
        .send()
        .await
        .map_err(request_error)?;

    let status = response.status().as_u16();
    let body = response.text().await.map_err(request_error)?;
    debug!(status = status, "Endpoint responded");

    Ok(SendOutcome { status, body })
}

fn parse_secret(secret: &str) -> Result<WebhookSecret, CliError> {
    WebhookSecret::new(secret).map_err(|e| CliError::InvalidArgument {
        arg: "secret".to_string(),
        message: e.to_string(),
    })
}

/// Read the payload from `file`, or from stdin when `file` is `None`.
///
/// The bytes are returned untouched; a trailing newline is part of the
/// signed payload.
fn read_payload(file: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match file {
        Some(path) => std::fs::read(path).map_err(|source| CliError::ReadPayload {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut body = Vec::new();
            io::stdin()
                .read_to_end(&mut body)
                .map_err(|source| CliError::ReadPayload {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(body)
        }
    }
}

/// Initialize logging based on CLI arguments. Logs go to stderr so command
/// output on stdout stays scriptable.
fn initialize_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("squeezy_webhooks_cli={}", cli.log_level)));

    let (json_layer, text_layer) = if cli.json_logs {
        (
            Some(tracing_subscriber::fmt::layer().json().with_writer(io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(io::stderr)),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
