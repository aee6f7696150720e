//! # Squeezy Webhooks Core
//!
//! Transport-independent verification and dispatch pipeline for Lemon Squeezy
//! webhook notifications.
//!
//! The pipeline runs in one direction:
//!
//! ```text
//! RawRequest -> signature check -> WebhookEnvelope -> DiscriminatedPayload
//!            -> WebhookHandler -> CanonicalResponse
//! ```
//!
//! ## Architecture
//!
//! - The dispatcher depends only on [`webhook::RawRequest`] and
//!   [`webhook::CanonicalResponse`], never on a particular HTTP runtime
//! - Runtime adapters (axum, plain `http` types) live in the API crate
//! - The event handler and the error reporter are injected trait objects
//!
//! ## Usage
//!
//! ```rust
//! use squeezy_webhooks_core::webhook::{handler_fn, RawRequest, WebhookDispatcher};
//! use squeezy_webhooks_core::WebhookSecret;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = WebhookSecret::new("signing-secret")?;
//! let handler = handler_fn(|payload| async move {
//!     println!("received {}", payload.event_name);
//!     Ok(())
//! });
//! let dispatcher = WebhookDispatcher::new(secret, Arc::new(handler))?;
//!
//! let request = RawRequest::new("GET", "http://localhost/webhooks", Vec::<(String, String)>::new(), bytes::Bytes::new());
//! let response = dispatcher.dispatch(request).await;
//! assert_eq!(response.status(), 405);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use zeroize::Zeroizing;

pub mod events;
pub mod webhook;

pub use events::{EventName, EventShape};
pub use webhook::{
    CanonicalResponse, DecodeError, DiscriminatedPayload, NormalizeError, RawRequest,
    WebhookDispatcher, WebhookEnvelope, WebhookError,
};

// ============================================================================
// Webhook Secret
// ============================================================================

/// Shared signing secret configured on the Lemon Squeezy webhook.
///
/// The secret is loaded once at startup and only ever read afterwards. Its
/// memory is zeroized on drop and it never appears in `Debug` output.
#[derive(Clone)]
pub struct WebhookSecret(Zeroizing<String>);

impl WebhookSecret {
    /// Wrap a secret value, rejecting empty strings.
    pub fn new(value: impl Into<String>) -> Result<Self, SecretError> {
        let value = Zeroizing::new(value.into());
        if value.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self(value))
    }

    /// Raw secret bytes, used as the HMAC key.
    pub fn expose_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WebhookSecret").field(&"<REDACTED>").finish()
    }
}

/// Errors raised while preparing the webhook secret.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    #[error("Webhook secret must not be empty")]
    Empty,

    #[error("Webhook secret cannot be used as an HMAC key")]
    InvalidKey,
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
