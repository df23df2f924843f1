use {
    super::{id::OrderId, order::AddressKind},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("webhook signature: {0}")]
    InvalidSignature(String),

    #[error("malformed event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error("checkout session has no customer email")]
    MissingCustomerEmail,

    #[error("invalid order metadata: {0}")]
    InvalidOrderMetadata(String),

    #[error("missing {kind} address field: {field}")]
    MissingAddress {
        kind: AddressKind,
        field: &'static str,
    },

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("store: {0}")]
    StoreWriteFailed(#[from] sqlx::Error),

    #[error("notification: {0}")]
    NotificationSendFailed(String),
}

impl FulfillmentError {
    /// Redelivering the same event cannot succeed where this error occurred.
    /// The response code does not reflect this; it only steers log levels.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature(_)
                | Self::MalformedEvent(_)
                | Self::MissingCustomerEmail
                | Self::InvalidOrderMetadata(_)
                | Self::MissingAddress { .. }
                | Self::OrderNotFound(_)
        )
    }
}
