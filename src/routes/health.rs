use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::models::HealthResponse;
use crate::state::AppState;

pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

/// Sends a tiny prompt through the model list. Always 200; the body says
/// whether any model answered.
pub async fn ai_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = state.ai.health_check().await;
    Json(HealthResponse {
        success: report.success,
        model: report.model,
        error: report.error,
    })
}
