//! Webhook body decoding.
//!
//! The body is parsed as `{ meta: { event_name, custom_data }, data }`. The
//! `data` block is kept as loose JSON: its shape is implied by the event name
//! but never checked here.

use crate::events::resources::{
    LicenseKeyAttributes, OrderAttributes, Resource, SubscriptionAttributes,
    SubscriptionInvoiceAttributes, TypedResource,
};
use crate::events::{EventName, EventShape};
use crate::webhook::DecodeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `meta` block of a webhook body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookMeta {
    pub event_name: EventName,

    /// Checkout custom data, passed through untouched
    #[serde(default)]
    pub custom_data: Value,

    /// Any other meta fields, e.g. `test_mode` or `webhook_id`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parsed webhook body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    pub meta: WebhookMeta,

    #[serde(default)]
    pub data: Value,
}

/// Parse a raw body into a [`WebhookEnvelope`].
///
/// Unknown event names are accepted. Fails with
/// [`DecodeError::MalformedBody`] when the body is not JSON or lacks the
/// `meta.event_name` discriminator.
pub fn decode(raw_body: &[u8]) -> Result<WebhookEnvelope, DecodeError> {
    serde_json::from_slice(raw_body).map_err(|e| DecodeError::MalformedBody {
        message: e.to_string(),
    })
}

/// Envelope handed to the handler, with the event name lifted to the top.
///
/// Serializes as `{"event_name": ..., "meta": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscriminatedPayload {
    pub event_name: EventName,

    #[serde(flatten)]
    pub envelope: WebhookEnvelope,
}

impl From<WebhookEnvelope> for DiscriminatedPayload {
    fn from(envelope: WebhookEnvelope) -> Self {
        Self {
            event_name: envelope.meta.event_name.clone(),
            envelope,
        }
    }
}

impl DiscriminatedPayload {
    pub fn meta(&self) -> &WebhookMeta {
        &self.envelope.meta
    }

    pub fn custom_data(&self) -> &Value {
        &self.envelope.meta.custom_data
    }

    /// The untyped `data` block.
    pub fn data(&self) -> &Value {
        &self.envelope.data
    }

    pub fn shape(&self) -> EventShape {
        self.event_name.shape()
    }

    /// Decode `custom_data` into a caller-defined type.
    pub fn custom_data_as<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        T::deserialize(self.custom_data()).map_err(|e| DecodeError::ShapeMismatch {
            expected: "custom_data".to_string(),
            message: e.to_string(),
        })
    }

    /// Decode `data` according to the shape the event name implies.
    ///
    /// Unknown event names yield [`TypedResource::Unknown`] with the data
    /// untouched.
    pub fn resource(&self) -> Result<TypedResource, DecodeError> {
        let resource = match self.shape() {
            EventShape::Subscription => {
                TypedResource::Subscription(self.data_as::<SubscriptionAttributes>()?)
            }
            EventShape::SubscriptionInvoice => {
                TypedResource::SubscriptionInvoice(self.data_as::<SubscriptionInvoiceAttributes>()?)
            }
            EventShape::Order => TypedResource::Order(self.data_as::<OrderAttributes>()?),
            EventShape::LicenseKey => {
                TypedResource::LicenseKey(self.data_as::<LicenseKeyAttributes>()?)
            }
            EventShape::Unknown => TypedResource::Unknown(self.envelope.data.clone()),
        };
        Ok(resource)
    }

    fn data_as<A: DeserializeOwned>(&self) -> Result<Resource<A>, DecodeError> {
        Resource::<A>::deserialize(&self.envelope.data).map_err(|e| DecodeError::ShapeMismatch {
            expected: self.shape().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
