//! Health check routes
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /health | GET | none |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// healthy | degraded
    status: &'static str,
    version: &'static str,
    /// Live authorization cache entries
    cache_entries: usize,
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let status = match state.store.list_departments().await {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, "Health check: store unavailable");
            "degraded"
        }
    };
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        cache_entries: state.cache.len(),
    })
}
