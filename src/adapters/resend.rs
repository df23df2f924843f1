//! Confirmation delivery through the Resend email API.

use {
    crate::domain::{
        error::FulfillmentError,
        notifier::{EmailMessage, Notifier},
    },
    reqwest::Client,
    serde::Deserialize,
    std::{future::Future, pin::Pin},
};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Deserialize)]
struct ResendEmailResponse {
    id: String,
}

pub struct ResendMailer {
    api_key: String,
    endpoint: String,
    http_client: Client,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: RESEND_API_URL.to_string(),
            http_client: Client::new(),
        }
    }

    /// Point at a different API base, e.g. a local stub.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn send_inner(&self, message: &EmailMessage) -> Result<(), FulfillmentError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| FulfillmentError::NotificationSendFailed(format!("resend request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FulfillmentError::NotificationSendFailed(format!(
                "resend returned {status}: {body}"
            )));
        }

        let sent: ResendEmailResponse = response.json().await.map_err(|e| {
            FulfillmentError::NotificationSendFailed(format!("resend response: {e}"))
        })?;
        tracing::debug!(email_id = %sent.id, to = ?message.to, "email accepted by resend");
        Ok(())
    }
}

impl Notifier for ResendMailer {
    fn send(
        &self,
        message: &EmailMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), FulfillmentError>> + Send + '_>> {
        let message = message.clone();
        Box::pin(async move { self.send_inner(&message).await })
    }
}

/// Used when no API key is configured: the email is logged, not delivered.
pub struct LogMailer;

impl Notifier for LogMailer {
    fn send(
        &self,
        message: &EmailMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), FulfillmentError>> + Send + '_>> {
        tracing::warn!(
            to = ?message.to,
            subject = %message.subject,
            "RESEND_API_KEY not set, confirmation email not delivered"
        );
        tracing::debug!(text = %message.text);
        Box::pin(async { Ok(()) })
    }
}
