//! Webhook dispatcher: method check, signature check, decode, handler call.
//!
//! # Processing Steps
//!
//! 1. Reject anything but `POST` with `405`
//! 2. Verify `x-signature` over the raw body, `401` on mismatch
//! 3. Decode the body, `400` when it is not a webhook envelope
//! 4. Await the handler with the [`DiscriminatedPayload`]
//! 5. `200` on success, `400` when the handler fails or panics
//!
//! Every failure is reported through the [`ErrorReporter`] before the response
//! is returned. Unknown event names are not rejected here; the handler
//! decides what to do with them.

use crate::webhook::handler::WebhookHandler;
use crate::webhook::payload::{decode, DiscriminatedPayload};
use crate::webhook::reporter::{ErrorReporter, TracingErrorReporter};
use crate::webhook::request::{NormalizeError, RawRequest};
use crate::webhook::response::CanonicalResponse;
use crate::webhook::signature::SignatureVerifier;
use crate::webhook::WebhookError;
use crate::{SecretError, WebhookSecret};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, instrument, Span};

/// Runs the verification and dispatch pipeline for one delivery at a time.
///
/// Holds only read-only state, so one instance behind an `Arc` serves all
/// concurrent deliveries.
///
/// # Examples
///
/// ```rust
/// use squeezy_webhooks_core::webhook::{handler_fn, NoopErrorReporter, WebhookDispatcher};
/// use squeezy_webhooks_core::WebhookSecret;
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = WebhookDispatcher::new(
///     WebhookSecret::new("signing-secret")?,
///     Arc::new(handler_fn(|_payload| async { Ok(()) })),
/// )?
/// .with_reporter(Arc::new(NoopErrorReporter));
/// # Ok(())
/// # }
/// ```
pub struct WebhookDispatcher {
    verifier: SignatureVerifier,
    handler: Arc<dyn WebhookHandler>,
    reporter: Arc<dyn ErrorReporter>,
}

impl WebhookDispatcher {
    /// Create a dispatcher that reports failures through `tracing`.
    pub fn new(
        secret: WebhookSecret,
        handler: Arc<dyn WebhookHandler>,
    ) -> Result<Self, SecretError> {
        Ok(Self {
            verifier: SignatureVerifier::new(&secret)?,
            handler,
            reporter: Arc::new(TracingErrorReporter),
        })
    }

    /// Replace the error reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Process one delivery and build its response.
    ///
    /// Never fails: every error is reported and mapped to a status code.
    #[instrument(
        name = "webhook.dispatch",
        skip(self, request),
        fields(method = %request.method(), event_name = tracing::field::Empty)
    )]
    pub async fn dispatch(&self, request: RawRequest) -> CanonicalResponse {
        match self.process(&request).await {
            Ok(()) => {
                info!("Webhook handled");
                CanonicalResponse::received()
            }
            Err(error) => self.fail(error).await,
        }
    }

    /// Build the response for a delivery whose body could not be read.
    ///
    /// The method check still comes first, so a non-`POST` request is a 405
    /// whatever happened to its body. A `POST` becomes a reported 400.
    #[instrument(name = "webhook.dispatch", skip_all, fields(method = %method))]
    pub async fn reject_unreadable(&self, method: &str, error: NormalizeError) -> CanonicalResponse {
        let error = if method == "POST" {
            WebhookError::from(error)
        } else {
            WebhookError::MethodNotAllowed {
                method: method.to_string(),
            }
        };
        self.fail(error).await
    }

    async fn fail(&self, error: WebhookError) -> CanonicalResponse {
        self.reporter.report(&error).await;
        CanonicalResponse::from_error(&error)
    }

    async fn process(&self, request: &RawRequest) -> Result<(), WebhookError> {
        if !request.is_post() {
            return Err(WebhookError::MethodNotAllowed {
                method: request.method().to_string(),
            });
        }

        let signature = request.signature().unwrap_or_default();
        if !self.verifier.verify(request.body(), signature) {
            return Err(WebhookError::InvalidSignature);
        }
        debug!("Webhook signature verified");

        let payload = DiscriminatedPayload::from(decode(request.body())?);
        Span::current().record("event_name", payload.event_name.as_str());

        self.invoke_handler(payload).await
    }

    async fn invoke_handler(&self, payload: DiscriminatedPayload) -> Result<(), WebhookError> {
        let outcome = AssertUnwindSafe(self.handler.handle(payload))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(cause)) => Err(WebhookError::HandlerFailure {
                message: cause.to_string(),
                cause: Some(cause),
            }),
            Err(panic) => Err(WebhookError::HandlerFailure {
                message: panic_message(panic.as_ref()),
                cause: None,
            }),
        }
    }
}

impl std::fmt::Debug for WebhookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookDispatcher")
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

/// Text of a panic payload; panics carry either `&str` or `String`.
fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
