pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;

use {
    adapters::{
        api_errors::map_layer_rejections,
        stripe::{signature::WebhookVerifier, webhook::wh_handler},
    },
    axum::{
        Router,
        extract::DefaultBodyLimit,
        http::StatusCode,
        middleware::map_response,
        routing::{get, post},
    },
    services::fulfillment::Fulfiller,
    std::{sync::Arc, time::Duration},
    tower_http::timeout::TimeoutLayer,
};

/// Upper bound on one webhook request. The notification timeout must stay
/// below it.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<WebhookVerifier>,
    pub fulfiller: Arc<Fulfiller>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/api/webhooks", post(wh_handler))
        .layer(DefaultBodyLimit::max(64 * 1024)) // 64 KB, Stripe events are typically <20 KB
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(map_response(map_layer_rejections))
        .with_state(state)
}
