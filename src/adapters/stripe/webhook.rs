use {
    super::signature::SIGNATURE_HEADER,
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::event::PaymentEvent,
        services::fulfillment::DispatchOutcome,
    },
    axum::{Json, body::Bytes, extract::State, http::HeaderMap},
};

#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(event_id = tracing::field::Empty, event_type = tracing::field::Empty)
)]
pub async fn wh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sig = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    state.verifier.verify(&body, sig)?;

    let event = PaymentEvent::parse(&body)?;

    tracing::Span::current()
        .record("event_id", tracing::field::display(&event.id))
        .record("event_type", tracing::field::display(&event.event_type));

    match state.fulfiller.dispatch(&event).await? {
        DispatchOutcome::Fulfillment(outcome) => {
            tracing::info!(?outcome, "checkout session processed");
        }
        DispatchOutcome::Ignored => {
            tracing::debug!("event type not handled, acknowledged");
        }
    }

    Ok(Json(serde_json::json!({
        "ok": true,
        "result": event.into_raw(),
    })))
}
