use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use avatar_gen::{
    app_state::AppState,
    config::AppConfig,
    db::{self, JobStore, PgJobStore},
    routes,
    services::{
        dispatcher::JobDispatcher, generator::A2eClient, reference::CatalogSelector,
    },
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing avatar-gen server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");

    metrics::describe_counter!(
        "generation_jobs_submitted_total",
        "Generation jobs accepted and recorded"
    );
    metrics::describe_counter!(
        "generation_jobs_completed_total",
        "Generation jobs that reached the completed status"
    );
    metrics::describe_counter!(
        "generation_jobs_failed_total",
        "Generation jobs that reached the failed status"
    );
    metrics::describe_counter!(
        "generation_jobs_placeholder_total",
        "Completed jobs whose provider response carried no result URL"
    );
    metrics::describe_histogram!(
        "generation_provider_seconds",
        "Duration of the outbound generation provider call"
    );

    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!(
        endpoint = %config.a2e_api_url,
        timeout_secs = config.generation_timeout_secs,
        authenticated = config.a2e_api_key.is_some(),
        "Initializing generation provider client"
    );
    let generator = A2eClient::new(
        config.a2e_api_url.clone(),
        config.a2e_api_key.clone(),
        config.generation_timeout(),
    )
    .expect("Failed to initialize generation provider client");

    let selector = CatalogSelector::new(config.reference_catalog.clone());

    let store: Arc<dyn JobStore> = Arc::new(PgJobStore::new(db_pool));
    let dispatcher = JobDispatcher::new(Arc::clone(&store), Arc::new(generator), Arc::new(selector));
    let state = AppState::new(store, dispatcher);

    let app = routes::app_router(
        state,
        prometheus_handle,
        routes::cors_layer(&config.cors_allowed_origins),
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
