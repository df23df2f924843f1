use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::error::FulfillmentError;

/// Storefront order identifier, assigned when the checkout session is created
/// and echoed back in the session metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Result<Self, FulfillmentError> {
        let id = id.into();
        if id.is_empty() {
            return Err(FulfillmentError::InvalidOrderMetadata(
                "orderId must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Storefront user that placed the order.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, FulfillmentError> {
        let id = id.into();
        if id.is_empty() {
            return Err(FulfillmentError::InvalidOrderMetadata(
                "userId must not be empty".into(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stripe event identifier (`evt_xxx`). Taken as delivered; only used for
/// log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
