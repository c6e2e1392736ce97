//! Root and health check handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::state::AppState;

/// `GET /` - service banner.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to CalorieQuest API" }))
}

/// `GET /healthz` - readiness check that pings the store.
///
/// Returns 503 Service Unavailable if the store cannot be reached.
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.health().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "db": "connected" })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "db": "error", "details": e.to_string() })),
            )
        }
    }
}
