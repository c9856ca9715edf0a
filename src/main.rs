//! bvh-relay server entry point.
//!
//! Starts the Axum HTTP server with the REST control surface and the
//! WebSocket relay endpoint.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bvh_relay::api;
use bvh_relay::app_state::AppState;
use bvh_relay::config::RelayConfig;
use bvh_relay::service::RelayService;
use bvh_relay::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting bvh-relay");

    // Build application state
    let app_state = AppState {
        relay: Arc::new(RelayService::new()),
    };

    // The control surface is browser-facing; only the configured UI origin
    // may call it cross-origin.
    let cors = CorsLayer::new()
        .allow_origin(config.cors_allowed_origin.parse::<HeaderValue>()?)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
