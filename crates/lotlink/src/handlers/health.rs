//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Storage round-trip plus event history stats

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

/// Body of `/healthz`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub event_history_size: usize,
    pub oldest_event_id: u64,
    pub active_listeners: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /livez - Basic liveness probe.
///
/// Returns 200 immediately. Used to check if the server is accepting connections.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Storage check and event stats.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Response {
    let storage = state.dealer_repo.list_dealers().await;

    let status = HealthStatus {
        healthy: storage.is_ok(),
        event_history_size: state.event_history_len(),
        oldest_event_id: state.oldest_event_id(),
        active_listeners: state.active_listener_count(),
        error: storage.err().map(|e| e.to_string()),
    };

    if status.healthy {
        (StatusCode::OK, Json(status)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
    }
}
