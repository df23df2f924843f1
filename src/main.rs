use {
    case_fulfillment::{
        AppState,
        adapters::{
            resend::{LogMailer, ResendMailer},
            stripe::signature::WebhookVerifier,
        },
        config::Config,
        domain::notifier::Notifier,
        infra::postgres::order_repo::PgOrderStore,
        services::fulfillment::Fulfiller,
    },
    sqlx::postgres::PgPoolOptions,
    std::{sync::Arc, time::Duration},
    tokio::signal,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let notifier: Arc<dyn Notifier> = match &config.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(key.as_str())),
        None => {
            tracing::warn!("RESEND_API_KEY not set, confirmation emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let fulfiller = Fulfiller::new(
        Arc::new(PgOrderStore::new(pool)),
        notifier,
        config.sender(),
    )
    .with_notify_timeout(config.notify_timeout);

    let state = AppState {
        verifier: Arc::new(
            WebhookVerifier::new(config.stripe_webhook_secret.as_str())
                .with_tolerance(config.webhook_tolerance),
        ),
        fulfiller: Arc::new(fulfiller),
    };

    let app = case_fulfillment::app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("failed to bind listener");
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
