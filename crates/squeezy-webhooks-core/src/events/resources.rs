//! Typed views over the `data` block of a webhook.
//!
//! Lemon Squeezy sends JSON:API resource objects. These types cover the
//! attributes that integrations usually read; unlisted fields are ignored.
//! Nothing in the dispatch path applies these types. Handlers opt in through
//! [`crate::webhook::DiscriminatedPayload::resource`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// JSON:API resource object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource<A> {
    /// Resource type, e.g. `subscriptions` or `orders`
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Resource identifier; numeric ids are converted to strings
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,

    pub attributes: A,
}

/// Subscription resource attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionAttributes {
    pub store_id: Option<u64>,
    pub customer_id: Option<u64>,
    pub order_id: u64,
    pub order_item_id: Option<u64>,
    pub product_id: u64,
    pub variant_id: u64,
    pub product_name: Option<String>,
    pub variant_name: String,
    pub user_name: Option<String>,
    pub user_email: String,
    pub status: String,
    pub status_formatted: Option<String>,
    pub renews_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub test_mode: bool,
}

/// Subscription invoice resource attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionInvoiceAttributes {
    pub store_id: Option<u64>,
    pub subscription_id: u64,
    pub billing_reason: Option<String>,
    pub status: String,
    pub currency: Option<String>,
    /// Total in the smallest currency unit
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub refunded: bool,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub test_mode: bool,
}

/// Order resource attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAttributes {
    pub store_id: Option<u64>,
    pub customer_id: Option<u64>,
    pub identifier: Option<String>,
    pub order_number: Option<u64>,
    pub user_name: Option<String>,
    pub user_email: String,
    pub currency: Option<String>,
    pub status: String,
    /// Total in the smallest currency unit
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub refunded: bool,
    pub first_order_item: OrderItem,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub test_mode: bool,
}

/// First line item of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,
    pub order_id: u64,
    pub product_id: u64,
    pub variant_id: u64,
    pub product_name: Option<String>,
    pub variant_name: String,
    #[serde(default)]
    pub price: i64,
}

/// License key resource attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseKeyAttributes {
    pub store_id: Option<u64>,
    pub customer_id: Option<u64>,
    pub order_id: u64,
    pub order_item_id: Option<u64>,
    pub product_id: Option<u64>,
    pub user_email: Option<String>,
    pub key_short: String,
    pub activation_limit: Option<u32>,
    #[serde(default)]
    pub instances_count: u32,
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub test_mode: bool,
}

/// The `data` block decoded according to its event name.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedResource {
    Subscription(Resource<SubscriptionAttributes>),
    SubscriptionInvoice(Resource<SubscriptionInvoiceAttributes>),
    Order(Resource<OrderAttributes>),
    LicenseKey(Resource<LicenseKeyAttributes>),
    /// Data for an event name this crate does not know, left untouched
    Unknown(serde_json::Value),
}

impl TypedResource {
    /// Resource id, when the data was decoded into a known shape.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Subscription(r) => Some(&r.id),
            Self::SubscriptionInvoice(r) => Some(&r.id),
            Self::Order(r) => Some(&r.id),
            Self::LicenseKey(r) => Some(&r.id),
            Self::Unknown(_) => None,
        }
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;
