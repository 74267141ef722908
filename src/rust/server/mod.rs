//! HTTP facade over the mood analyzer.
//!
//! - `GET /` - liveness message
//! - `POST /analyze_bulk` - analyze a batch of `{id, text}` items

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use state::ServerState;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::analyzer::MoodAnalyzer;

/// Largest accepted `/analyze_bulk` body, replacing axum's 2 MiB default.
pub const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Build the router with all routes and middleware
pub fn build_router(state: Arc<ServerState>) -> Router {
    let mut router = Router::new()
        .route("/", get(routes::index))
        .route(
            "/analyze_bulk",
            post(routes::analyze_bulk).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .fallback(routes::not_found);

    if let Some(timeout) = state.config.timeout() {
        router = router.layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout));
    }
    if state.config.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.layer(from_fn(routes::log_requests)).with_state(state)
}

/// Binds to the configured address and serves until Ctrl+C or SIGTERM.
pub async fn start_server(config: ServerConfig, analyzer: MoodAnalyzer) -> ServerResult<()> {
    let addr = config.socket_addr()?;
    log::info!(
        "Starting MoodLens server on {} (chunk size: {} chars, timeout: {:?}, CORS: {})",
        addr,
        analyzer.config().max_chunk_chars,
        config.timeout(),
        config.enable_cors
    );

    let state = Arc::new(ServerState::new(config, analyzer));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => log::info!("Received SIGTERM, shutting down..."),
    }
}
