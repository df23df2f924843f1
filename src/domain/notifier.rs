use {
    super::error::FulfillmentError,
    serde::Serialize,
    std::{future::Future, pin::Pin},
};

/// A fully rendered email, ready for the delivery provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub trait Notifier: Send + Sync {
    /// Deliver once. No retries; the caller bounds the wait.
    fn send(
        &self,
        message: &EmailMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), FulfillmentError>> + Send + '_>>;
}
