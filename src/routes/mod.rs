use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

pub mod generate;
pub mod health;
pub mod metrics;

/// Generation requests carry image URLs, not image bytes.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// API routes without the metrics endpoint or middleware.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/generate", post(generate::submit_generation))
        .route("/generate/{id}", get(generate::get_generation))
        .with_state(state)
}

/// Full application router: API routes, Prometheus scrape endpoint and
/// the HTTP middleware stack.
pub fn app_router(state: AppState, handle: PrometheusHandle, cors: CorsLayer) -> Router {
    api_router(state)
        .route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(Arc::new(handle)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

/// CORS policy for the browser front end.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
