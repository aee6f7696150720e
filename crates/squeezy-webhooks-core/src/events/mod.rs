//! Lemon Squeezy event names and the shape of data each one carries.
//!
//! The `meta.event_name` field of a webhook body acts as the discriminator
//! for the `data` block. Names the provider may add in future decode to
//! [`EventName::Unknown`] so existing deployments keep accepting deliveries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod resources;

pub use resources::{
    LicenseKeyAttributes, OrderAttributes, OrderItem, Resource, SubscriptionAttributes,
    SubscriptionInvoiceAttributes, TypedResource,
};

// ============================================================================
// Event Name
// ============================================================================

/// Discriminator carried in `meta.event_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventName {
    SubscriptionCreated,
    SubscriptionCancelled,
    SubscriptionResumed,
    SubscriptionExpired,
    SubscriptionPaused,
    SubscriptionUnpaused,
    SubscriptionPaymentSuccess,
    SubscriptionPaymentFailed,
    SubscriptionPaymentRecovered,
    OrderCreated,
    OrderRefunded,
    LicenseKeyCreated,
    /// Any event name not known to this crate, kept verbatim.
    Unknown(String),
}

impl EventName {
    /// Every event name this crate knows about.
    pub const KNOWN: [EventName; 12] = [
        Self::SubscriptionCreated,
        Self::SubscriptionCancelled,
        Self::SubscriptionResumed,
        Self::SubscriptionExpired,
        Self::SubscriptionPaused,
        Self::SubscriptionUnpaused,
        Self::SubscriptionPaymentSuccess,
        Self::SubscriptionPaymentFailed,
        Self::SubscriptionPaymentRecovered,
        Self::OrderCreated,
        Self::OrderRefunded,
        Self::LicenseKeyCreated,
    ];

    /// Wire representation of the event name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SubscriptionCreated => "subscription_created",
            Self::SubscriptionCancelled => "subscription_cancelled",
            Self::SubscriptionResumed => "subscription_resumed",
            Self::SubscriptionExpired => "subscription_expired",
            Self::SubscriptionPaused => "subscription_paused",
            Self::SubscriptionUnpaused => "subscription_unpaused",
            Self::SubscriptionPaymentSuccess => "subscription_payment_success",
            Self::SubscriptionPaymentFailed => "subscription_payment_failed",
            Self::SubscriptionPaymentRecovered => "subscription_payment_recovered",
            Self::OrderCreated => "order_created",
            Self::OrderRefunded => "order_refunded",
            Self::LicenseKeyCreated => "license_key_created",
            Self::Unknown(name) => name,
        }
    }

    /// Shape of the `data` block implied by this event name.
    pub fn shape(&self) -> EventShape {
        match self {
            Self::SubscriptionCreated
            | Self::SubscriptionCancelled
            | Self::SubscriptionResumed
            | Self::SubscriptionExpired
            | Self::SubscriptionPaused
            | Self::SubscriptionUnpaused => EventShape::Subscription,
            Self::SubscriptionPaymentSuccess
            | Self::SubscriptionPaymentFailed
            | Self::SubscriptionPaymentRecovered => EventShape::SubscriptionInvoice,
            Self::OrderCreated | Self::OrderRefunded => EventShape::Order,
            Self::LicenseKeyCreated => EventShape::LicenseKey,
            Self::Unknown(_) => EventShape::Unknown,
        }
    }

    /// Check whether this name is outside the known set.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for EventName {
    fn from(value: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|known| known.as_str() == value)
            .cloned()
            .unwrap_or_else(|| Self::Unknown(value.to_string()))
    }
}

impl From<String> for EventName {
    fn from(value: String) -> Self {
        match Self::from(value.as_str()) {
            Self::Unknown(_) => Self::Unknown(value),
            known => known,
        }
    }
}

impl From<EventName> for String {
    fn from(value: EventName) -> Self {
        match value {
            EventName::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for EventName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Event Shape
// ============================================================================

/// Resource type carried in the `data` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventShape {
    Subscription,
    SubscriptionInvoice,
    Order,
    LicenseKey,
    Unknown,
}

impl fmt::Display for EventShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Subscription => "subscription",
            Self::SubscriptionInvoice => "subscription_invoice",
            Self::Order => "order",
            Self::LicenseKey => "license_key",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
