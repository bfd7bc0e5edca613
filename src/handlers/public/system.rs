use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET / - liveness banner
pub async fn root() -> &'static str {
    "V-KYC Recordings Backend API is running!"
}

/// GET /health - readiness including a database round trip
///
/// ```json
/// { "status": "ok", "database": "ok", "timestamp": "2024-05-01T10:00:00Z" }
/// ```
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.repository.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "database": "ok",
                "timestamp": now
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "database": "unavailable",
                    "timestamp": now
                })),
            )
        }
    }
}
