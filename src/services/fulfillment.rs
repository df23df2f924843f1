use {
    crate::domain::{
        confirmation::OrderConfirmation,
        error::FulfillmentError,
        event::{CheckoutSession, EventPayload, PaymentEvent},
        id::OrderId,
        notifier::Notifier,
        order::MarkPaid,
        store::OrderStore,
    },
    chrono::{DateTime, Utc},
    std::{sync::Arc, time::Duration},
};

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// Order marked paid and confirmation sent.
    Fulfilled(OrderId),
    /// Order was paid by an earlier delivery whose confirmation never went out;
    /// the confirmation has now been sent.
    ConfirmationResent(OrderId),
    /// Order already paid and confirmed. Nothing done.
    Duplicate(OrderId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Fulfillment(FulfillmentOutcome),
    /// Event type this service does not act on.
    Ignored,
}

/// Reconciles completed checkouts with stored orders and notifies customers.
pub struct Fulfiller {
    store: Arc<dyn OrderStore>,
    notifier: Arc<dyn Notifier>,
    sender: String,
    notify_timeout: Duration,
}

impl Fulfiller {
    pub fn new(
        store: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            sender: sender.into(),
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// Route a verified event. Only completed checkouts do any work; every
    /// other type is acknowledged so the provider stops redelivering it.
    pub async fn dispatch(&self, event: &PaymentEvent) -> Result<DispatchOutcome, FulfillmentError> {
        match &event.payload {
            EventPayload::CheckoutSessionCompleted(session) => self
                .fulfill(session)
                .await
                .map(DispatchOutcome::Fulfillment),
            EventPayload::Other => Ok(DispatchOutcome::Ignored),
        }
    }

    pub async fn fulfill(
        &self,
        session: &CheckoutSession,
    ) -> Result<FulfillmentOutcome, FulfillmentError> {
        self.fulfill_at(session, Utc::now()).await
    }

    /// Same as [`Fulfiller::fulfill`] with the fulfillment time supplied.
    pub async fn fulfill_at(
        &self,
        session: &CheckoutSession,
        now: DateTime<Utc>,
    ) -> Result<FulfillmentOutcome, FulfillmentError> {
        let email = session.customer_email()?;
        let (order_id, user_id) = session.order_refs()?;
        let billing = session.billing_address()?;
        let shipping = session.shipping_address()?;

        let marked = self.store.mark_paid(&order_id, &shipping, &billing).await?;
        let order = marked.order();

        if order.user_id != user_id {
            tracing::warn!(
                order_id = %order_id,
                metadata_user = %user_id,
                order_user = %order.user_id,
                "checkout metadata user does not own the order"
            );
        }

        let outcome = match &marked {
            MarkPaid::Transitioned(_) => {
                tracing::info!(
                    order_id = %order_id,
                    session_id = %session.id,
                    amount_total = ?session.amount_total,
                    "order marked paid"
                );
                FulfillmentOutcome::Fulfilled(order_id.clone())
            }
            MarkPaid::AlreadyPaid(order) if order.confirmation_sent_at.is_some() => {
                tracing::info!(order_id = %order_id, "order already paid and confirmed, skipping");
                return Ok(FulfillmentOutcome::Duplicate(order_id));
            }
            MarkPaid::AlreadyPaid(_) => {
                tracing::info!(order_id = %order_id, "order already paid, confirmation still pending");
                FulfillmentOutcome::ConfirmationResent(order_id.clone())
            }
        };

        // The stored address wins over the one in this delivery.
        let ship_to = order
            .shipping_address
            .as_ref()
            .map_or(&shipping, |stored| &stored.address);

        let message = OrderConfirmation {
            order_id: &order_id,
            order_date: now,
            shipping: ship_to,
            amount: order.amount,
            configuration: &order.configuration,
        }
        .render(&self.sender, email);

        match tokio::time::timeout(self.notify_timeout, self.notifier.send(&message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(
                    order_id = %order_id,
                    store_updated = true,
                    error = %e,
                    "order is paid but the confirmation email failed"
                );
                return Err(e);
            }
            Err(_) => {
                tracing::error!(
                    order_id = %order_id,
                    store_updated = true,
                    timeout_ms = self.notify_timeout.as_millis() as u64,
                    "order is paid but the confirmation email timed out"
                );
                return Err(FulfillmentError::NotificationSendFailed(format!(
                    "timed out after {:?}",
                    self.notify_timeout
                )));
            }
        }

        self.store.mark_confirmation_sent(&order_id, now).await?;
        tracing::info!(order_id = %order_id, "confirmation email sent");

        Ok(outcome)
    }
}
