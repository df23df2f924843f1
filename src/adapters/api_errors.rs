use crate::domain::error::FulfillmentError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype so the domain error can become an axum response.
pub struct ApiError(pub FulfillmentError);

impl From<FulfillmentError> for ApiError {
    fn from(err: FulfillmentError) -> Self {
        Self(err)
    }
}

// Callers only ever see a generic message. Stripe redelivers on any non-2xx,
// so the detail goes to the operator log instead.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            FulfillmentError::InvalidSignature(reason) => {
                tracing::warn!(reason = %reason, "rejected webhook signature");
                (StatusCode::BAD_REQUEST, "Invalid signature")
            }
            err if err.is_permanent() => {
                tracing::warn!(error = %err, permanent = true, "webhook failed, redelivery will not help");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
            err => {
                tracing::error!(error = %err, "webhook failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
        };

        error_response(status, message)
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({
        "ok": false,
        "message": message,
    });

    (status, Json(body)).into_response()
}

/// Rewrites rejections produced by router layers (body limit, request
/// timeout) into the same generic 500 body the handler uses.
pub async fn map_layer_rejections(response: Response) -> Response {
    match response.status() {
        StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(permanent = true, "webhook body over size limit");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
        }
        StatusCode::REQUEST_TIMEOUT => {
            tracing::error!("webhook request timed out");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
        }
        _ => response,
    }
}
