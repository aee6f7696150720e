//! # Webhook Processing Module
//!
//! Verification and dispatch of Lemon Squeezy webhook deliveries.
//!
//! # Core Components
//!
//! - [`RawRequest`] - runtime-independent view of the incoming request
//! - [`SignatureVerifier`] - HMAC-SHA256 check of the `x-signature` header
//! - [`decode`] - JSON parsing into a [`WebhookEnvelope`]
//! - [`WebhookDispatcher`] - runs the pipeline and always yields a response
//! - [`CanonicalResponse`] / [`ResponseEmitter`] - the response and the
//!   contract for writing it back through a runtime
//!
//! # Status codes
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | handler completed | 200 | `{"message":"Webhook received"}` |
//! | unreadable or malformed body, handler failure | 400 | `{"message":"Webhook error: <detail>"}` |
//! | signature mismatch | 401 | `{"message":"Invalid signature."}` |
//! | method other than POST | 405 | `{"message":"Method not allowed"}` |

pub mod dispatch;
pub mod handler;
pub mod payload;
pub mod reporter;
pub mod request;
pub mod response;
pub mod signature;

pub use dispatch::WebhookDispatcher;
pub use handler::{handler_fn, FnHandler, HandlerError, WebhookHandler};
pub use payload::{decode, DiscriminatedPayload, WebhookEnvelope, WebhookMeta};
pub use reporter::{reporter_fn, ErrorReporter, FnReporter, NoopErrorReporter, TracingErrorReporter};
pub use request::{NormalizeError, RawRequest, SIGNATURE_HEADER};
pub use response::{CanonicalResponse, ResponseEmitter, CONTENT_TYPE_JSON};
pub use signature::{compute_signature, verify, SignatureVerifier};

// ============================================================================
// Errors
// ============================================================================

/// Every way a webhook delivery can fail.
///
/// All variants are recovered inside [`WebhookDispatcher::dispatch`] and turned
/// into one of the documented responses. The `Display` text is meant for logs
/// and reporters; clients only ever see [`WebhookError::client_message`].
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The request used a method other than `POST`.
    #[error("Method not allowed for webhook: {method}")]
    MethodNotAllowed { method: String },

    /// The `x-signature` header did not match the body.
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// The body could not be read from the connection.
    #[error("Failed to read webhook body: {message}")]
    UnreadableBody { message: String },

    /// The body could not be parsed into a webhook envelope.
    #[error("Malformed webhook body: {message}")]
    MalformedBody { message: String },

    /// The caller's handler returned an error or panicked.
    ///
    /// `cause` holds the handler's original error; it is `None` for panics.
    #[error("Webhook handler failed: {message}")]
    HandlerFailure {
        message: String,
        #[source]
        cause: Option<HandlerError>,
    },
}

impl WebhookError {
    /// HTTP status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MethodNotAllowed { .. } => 405,
            Self::InvalidSignature => 401,
            Self::UnreadableBody { .. }
            | Self::MalformedBody { .. }
            | Self::HandlerFailure { .. } => 400,
        }
    }

    /// Short message returned to the webhook sender.
    pub fn client_message(&self) -> String {
        match self {
            Self::MethodNotAllowed { .. } => "Method not allowed".to_string(),
            Self::InvalidSignature => "Invalid signature.".to_string(),
            Self::UnreadableBody { message }
            | Self::MalformedBody { message }
            | Self::HandlerFailure { message, .. } => {
                format!("Webhook error: {}", message)
            }
        }
    }
}

impl From<DecodeError> for WebhookError {
    fn from(error: DecodeError) -> Self {
        Self::MalformedBody {
            message: error.to_string(),
        }
    }
}

impl From<NormalizeError> for WebhookError {
    fn from(error: NormalizeError) -> Self {
        Self::UnreadableBody {
            message: error.to_string(),
        }
    }
}

/// Payload decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The body is not a JSON webhook envelope.
    #[error("{message}")]
    MalformedBody { message: String },

    /// The `data` block does not fit the shape its event name implies.
    #[error("data does not match the '{expected}' shape: {message}")]
    ShapeMismatch { expected: String, message: String },
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
