//! Typed view of the Stripe webhook payloads this service consumes.
//!
//! Only `checkout.session.completed` is decoded past the envelope. Its
//! `data.object` must match [`CheckoutSession`]; every other event type is
//! carried as [`EventPayload::Other`] and acknowledged without inspection.

use {
    super::{
        error::FulfillmentError,
        id::{EventId, OrderId, UserId},
        order::{AddressKind, PostalAddress},
    },
    serde::Deserialize,
    std::collections::HashMap,
};

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Deserialize)]
struct Envelope {
    id: EventId,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    #[serde(default)]
    livemode: bool,
    data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    object: serde_json::Value,
}

#[derive(Debug, Clone)]
pub enum EventPayload {
    CheckoutSessionCompleted(Box<CheckoutSession>),
    Other,
}

/// A verified webhook event plus the JSON it was parsed from.
#[derive(Debug, Clone)]
pub struct PaymentEvent {
    pub id: EventId,
    pub event_type: String,
    pub created: i64,
    pub livemode: bool,
    pub payload: EventPayload,
    raw: serde_json::Value,
}

impl PaymentEvent {
    /// Parse a request body that has already passed signature verification.
    pub fn parse(body: &[u8]) -> Result<Self, FulfillmentError> {
        let raw: serde_json::Value = serde_json::from_slice(body)?;
        let envelope: Envelope = serde_json::from_value(raw.clone())?;

        let payload = if envelope.event_type == CHECKOUT_SESSION_COMPLETED {
            let session: CheckoutSession = serde_json::from_value(envelope.data.object)?;
            EventPayload::CheckoutSessionCompleted(Box::new(session))
        } else {
            EventPayload::Other
        };

        Ok(Self {
            id: envelope.id,
            event_type: envelope.event_type,
            created: envelope.created,
            livemode: envelope.livemode,
            payload,
            raw,
        })
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    pub fn into_raw(self) -> serde_json::Value {
        self.raw
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    /// Where the customer asked us to ship. The older `shipping` key is not read.
    #[serde(default)]
    pub shipping_details: Option<ShippingDetails>,
    #[serde(default)]
    pub amount_total: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<stripe::Address>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShippingDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<stripe::Address>,
}

impl CheckoutSession {
    pub fn customer_email(&self) -> Result<&str, FulfillmentError> {
        self.customer_details
            .as_ref()
            .and_then(|d| non_empty(d.email.as_ref()))
            .ok_or(FulfillmentError::MissingCustomerEmail)
    }

    /// `orderId` and `userId` from the session metadata. Both are required.
    pub fn order_refs(&self) -> Result<(OrderId, UserId), FulfillmentError> {
        let metadata = self
            .metadata
            .as_ref()
            .ok_or_else(|| FulfillmentError::InvalidOrderMetadata("metadata missing".into()))?;

        let order_id = metadata
            .get("orderId")
            .ok_or_else(|| FulfillmentError::InvalidOrderMetadata("orderId missing".into()))?;
        let user_id = metadata
            .get("userId")
            .ok_or_else(|| FulfillmentError::InvalidOrderMetadata("userId missing".into()))?;

        Ok((OrderId::new(order_id.as_str())?, UserId::new(user_id.as_str())?))
    }

    pub fn billing_address(&self) -> Result<PostalAddress, FulfillmentError> {
        let address = self.customer_details.as_ref().and_then(|d| d.address.as_ref());
        self.postal_address(AddressKind::Billing, address)
    }

    pub fn shipping_address(&self) -> Result<PostalAddress, FulfillmentError> {
        let address = self
            .shipping_details
            .as_ref()
            .and_then(|d| d.address.as_ref());
        self.postal_address(AddressKind::Shipping, address)
    }

    /// Both addresses carry the customer's display name, not the recipient
    /// name Stripe may collect for shipping.
    fn postal_address(
        &self,
        kind: AddressKind,
        address: Option<&stripe::Address>,
    ) -> Result<PostalAddress, FulfillmentError> {
        let address = address.ok_or(FulfillmentError::MissingAddress {
            kind,
            field: "address",
        })?;
        let name = self.customer_details.as_ref().and_then(|d| d.name.as_ref());

        Ok(PostalAddress {
            name: required(kind, "name", name)?,
            street: required(kind, "line1", address.line1.as_ref())?,
            city: required(kind, "city", address.city.as_ref())?,
            state: non_empty(address.state.as_ref()).map(str::to_owned),
            postal_code: required(kind, "postal_code", address.postal_code.as_ref())?,
            country: required(kind, "country", address.country.as_ref())?,
        })
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

fn required(
    kind: AddressKind,
    field: &'static str,
    value: Option<&String>,
) -> Result<String, FulfillmentError> {
    non_empty(value)
        .map(str::to_owned)
        .ok_or(FulfillmentError::MissingAddress { kind, field })
}
