//! Error reporting side channel.
//!
//! The dispatcher reports every non-200 outcome through an injected
//! [`ErrorReporter`]. Reporting is fire-and-observe: it returns nothing, so a
//! failing sink cannot change the response sent to the provider.

use crate::webhook::WebhookError;
use async_trait::async_trait;
use std::future::Future;
use tracing::warn;

/// Receives every failure the dispatcher recovers from.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(&self, error: &WebhookError);
}

/// Default reporter: emits a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

#[async_trait]
impl ErrorReporter for TracingErrorReporter {
    async fn report(&self, error: &WebhookError) {
        warn!(
            status = error.status_code(),
            error = %error,
            "Webhook delivery rejected"
        );
    }
}

/// Reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopErrorReporter;

#[async_trait]
impl ErrorReporter for NoopErrorReporter {
    async fn report(&self, _error: &WebhookError) {}
}

/// [`ErrorReporter`] backed by an async closure. See [`reporter_fn`].
#[derive(Clone)]
pub struct FnReporter<F> {
    f: F,
}

/// Wrap a closure as an [`ErrorReporter`].
///
/// The closure gets the error by reference and returns a future that must not
/// borrow from it.
pub fn reporter_fn<F, Fut>(f: F) -> FnReporter<F>
where
    F: Fn(&WebhookError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    FnReporter { f }
}

#[async_trait]
impl<F, Fut> ErrorReporter for FnReporter<F>
where
    F: Fn(&WebhookError) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn report(&self, error: &WebhookError) {
        (self.f)(error).await
    }
}

#[cfg(test)]
#[path = "reporter_tests.rs"]
mod tests;
