//! Default event handler for the service binary: logs every delivery.

use async_trait::async_trait;
use squeezy_webhooks_core::events::TypedResource;
use squeezy_webhooks_core::webhook::{DiscriminatedPayload, HandlerError, WebhookHandler};
use squeezy_webhooks_core::EventName;
use tracing::{info, warn};

/// Logs a summary of each delivery.
///
/// Unknown event names are logged and acknowledged. Known events whose `data`
/// does not fit the shape their name implies are rejected, so the provider
/// retries them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventHandler;

impl LoggingEventHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebhookHandler for LoggingEventHandler {
    async fn handle(&self, payload: DiscriminatedPayload) -> Result<(), HandlerError> {
        if let EventName::Unknown(name) = &payload.event_name {
            warn!(event_name = %name, "Ignoring unrecognised webhook event");
            return Ok(());
        }

        let org_id = payload
            .custom_data()
            .get("orgId")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        match payload.resource()? {
            TypedResource::Subscription(sub) => info!(
                event_name = %payload.event_name,
                subscription_id = %sub.id,
                status = %sub.attributes.status,
                org_id = ?org_id,
                "Subscription event"
            ),
            TypedResource::SubscriptionInvoice(invoice) => info!(
                event_name = %payload.event_name,
                invoice_id = %invoice.id,
                subscription_id = %invoice.attributes.subscription_id,
                status = %invoice.attributes.status,
                org_id = ?org_id,
                "Subscription invoice event"
            ),
            TypedResource::Order(order) => info!(
                event_name = %payload.event_name,
                order_id = %order.id,
                total = %order.attributes.total,
                org_id = ?org_id,
                "Order event"
            ),
            TypedResource::LicenseKey(key) => info!(
                event_name = %payload.event_name,
                license_key_id = %key.id,
                status = %key.attributes.status,
                org_id = ?org_id,
                "License key event"
            ),
            TypedResource::Unknown(_) => {}
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
