//! API route handlers
//!
//! - `health`: Health checks, readiness, and metrics
//! - `reports`: Lost and found report intake and lookup
//! - `matching`: Batch matching, notifications and the sample check

pub mod health;
pub mod matching;
pub mod reports;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Lost & Found Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/lost",
            "/api/found",
            "/api/stats",
            "/api/matches/match",
            "/api/matches/match-details",
            "/api/matches/send-email",
            "/api/matches/test-matching",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound("route".to_string())
}
