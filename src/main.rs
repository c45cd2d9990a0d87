mod client;
mod config;
mod dto;
mod handlers;
mod service;

use axum::http::HeaderValue;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use std::sync::Arc;

use client::GeminiClient;
use handlers::rest::{self, AppState};
use service::ReplyService;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to locate or load config file: {e}");
    });
    tracing::info!("Successfully loaded email writer config");
    tracing::info!("Configured generative API: {:?}", cfg.gemini);

    // Setup service
    let client = GeminiClient::new(&cfg.gemini).unwrap_or_else(|e| {
        tracing::error!("Failed to create HTTP client: {e}");
        panic!("failed to create HTTP client: {e}");
    });
    let state = Arc::new(AppState {
        service: ReplyService::new(client),
        strict_errors: cfg.strict_errors,
    });

    // Setup router
    let router = rest::routes(state)
        .layer(cors_layer(&cfg.allowed_origins))
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to port {}: {e}", cfg.port);
            panic!("failed to bind to address: {e}");
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Email writer starting, listening on {}", addr),
        Err(e) => tracing::warn!("Email writer starting, local address unavailable: {e}"),
    }

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start server: {e}");
    }
}
