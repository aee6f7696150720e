//! Webhook handler trait for application-provided processing logic.
//!
//! The handler runs inline: the dispatcher awaits it and its outcome decides
//! the response status. Persistence and business rules live in the handler;
//! this crate never interprets what an event means.
//!
//! # Examples
//!
//! ```rust
//! use squeezy_webhooks_core::webhook::{DiscriminatedPayload, HandlerError, WebhookHandler};
//! use squeezy_webhooks_core::EventName;
//! use async_trait::async_trait;
//!
//! struct OrderHandler;
//!
//! #[async_trait]
//! impl WebhookHandler for OrderHandler {
//!     async fn handle(&self, payload: DiscriminatedPayload) -> Result<(), HandlerError> {
//!         match payload.event_name {
//!             EventName::OrderCreated => println!("new order"),
//!             EventName::Unknown(name) => println!("ignoring {name}"),
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::webhook::payload::DiscriminatedPayload;
use async_trait::async_trait;
use std::future::Future;

/// Error type returned by handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Application-provided webhook event handler.
///
/// # Error Handling
///
/// Returning `Err` (or panicking) makes the dispatcher answer `400` with
/// `Webhook error: <error>` and report the failure. The provider then retries
/// the delivery, so handlers should be idempotent.
///
/// # Concurrency
///
/// One handler instance serves all concurrent deliveries and must be
/// `Send + Sync`.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Handle one verified, decoded delivery.
    async fn handle(&self, payload: DiscriminatedPayload) -> Result<(), HandlerError>;
}

/// [`WebhookHandler`] backed by an async closure. See [`handler_fn`].
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Wrap an async closure as a [`WebhookHandler`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(DiscriminatedPayload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> WebhookHandler for FnHandler<F>
where
    F: Fn(DiscriminatedPayload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, payload: DiscriminatedPayload) -> Result<(), HandlerError> {
        (self.f)(payload).await
    }
}
