mod app_state;
mod config;
mod models;
mod routes;
mod services;

use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;

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

    tracing::info!("Initializing photoboost server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("enhance_requests_total", "Total enhancement requests received");
    metrics::describe_histogram!(
        "enhance_processing_seconds",
        "Time to apply local pixel adjustments to a photo"
    );
    metrics::describe_counter!(
        "upscale_predictions_total",
        "Total upscale predictions submitted"
    );
    metrics::describe_counter!(
        "upscale_predictions_completed",
        "Upscale predictions that produced an output"
    );
    metrics::describe_counter!(
        "upscale_predictions_failed",
        "Upscale predictions that ended without an output"
    );
    metrics::describe_histogram!(
        "upscale_poll_seconds",
        "Time from prediction submission to terminal status"
    );

    // Initialize remote AI service clients and shared state
    tracing::info!("Initializing vision and prediction clients");
    let state = AppState::from_config(&config);

    // Build API routes
    let app = Router::new()
        .route("/", get(routes::health::health_check))
        .route("/health", get(routes::health::health_check))
        .route("/api/v1/enhance", post(routes::enhance::enhance_photo))
        .route("/api/v1/upscale", post(routes::upscale::upscale_photo))
        .route(
            "/api/v1/predictions/{id}",
            get(routes::upscale::get_prediction),
        )
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(50 * 1024 * 1024)); // 50 MB limit for base64 photos

    tracing::info!("Starting photoboost on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
