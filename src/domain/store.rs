use {
    super::error::FulfillmentError,
    super::id::OrderId,
    super::order::{MarkPaid, PostalAddress},
    chrono::{DateTime, Utc},
    std::{future::Future, pin::Pin},
};

/// Persistence for orders created at checkout time. Implementations must
/// never create an order and must make `mark_paid` safe to re-apply.
pub trait OrderStore: Send + Sync {
    /// Set `is_paid` and attach freshly created shipping and billing
    /// addresses, in one atomic step. An order that is already paid is
    /// returned as [`MarkPaid::AlreadyPaid`] without any write.
    fn mark_paid(
        &self,
        order_id: &OrderId,
        shipping: &PostalAddress,
        billing: &PostalAddress,
    ) -> Pin<Box<dyn Future<Output = Result<MarkPaid, FulfillmentError>> + Send + '_>>;

    /// Record that the customer confirmation went out.
    fn mark_confirmation_sent(
        &self,
        order_id: &OrderId,
        at: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<(), FulfillmentError>> + Send + '_>>;
}
