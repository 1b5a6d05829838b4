//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (request ids, logging, compression, etc.)
//! - Tracing and Prometheus recorder installation
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{log_requests, request_id};
use crate::routes::{api_info, not_found};
use crate::routes::{health, matching, reports};
use crate::state::ServerState;
use crate::telemetry::{self, PrometheusMatchMetrics};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Middleware stack (outermost first):
/// 1. Tracing
/// 2. Request ID tracking
/// 3. Request logging
/// 4. CORS
/// 5. Compression
/// 6. Timeout handling
/// 7. Body size limit
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics));

    let report_routes = Router::new()
        .route(
            "/api/lost",
            post(reports::create_lost).get(reports::list_lost),
        )
        .route(
            "/api/lost/{id}",
            get(reports::get_lost).delete(reports::delete_lost),
        )
        .route(
            "/api/found",
            post(reports::create_found).get(reports::list_found),
        )
        .route(
            "/api/found/{id}",
            get(reports::get_found).delete(reports::delete_found),
        )
        .route("/api/stats", get(reports::stats));

    let match_routes = Router::new()
        .route("/api/matches/match", post(matching::run_matching))
        .route("/api/matches/match-details", post(matching::match_details))
        .route("/api/matches/send-email", post(matching::send_notification))
        .route("/api/matches/test-matching", post(matching::test_matching));

    Router::new()
        .merge(public_routes)
        .merge(report_routes)
        .merge(match_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the lost & found HTTP server
///
/// Installs JSON logging and (when enabled) the Prometheus recorder, builds
/// shared state from `config`, then serves until SIGTERM or Ctrl+C.
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    let mut state = ServerState::new(config.clone())?;
    if config.metrics_enabled {
        let handle = telemetry::install_prometheus()?;
        matcher::set_match_metrics(Some(Arc::new(PrometheusMatchMetrics)));
        state = state.with_metrics_handle(handle);
    }

    let app = build_router(Arc::new(state));

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!("Starting lost & found server on {}", addr);
    tracing::info!(
        "Timeout: {}s, Max body: {}MB",
        config.timeout_secs,
        config.max_body_size_mb
    );
    tracing::info!(
        "CORS: {}, Metrics: {}",
        config.enable_cors,
        config.metrics_enabled
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
