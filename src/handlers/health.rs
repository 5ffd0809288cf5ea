use crate::db;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

/// Liveness plus a database ping.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match db::check_connection(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "status": "ok", "database": "up" })),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": false, "status": "degraded", "database": "down" })),
        ),
    }
}
