use axum::extract::State;
use axum::Json;

use crate::error::{ApiError, InputError};
use crate::models::{InsightsRequest, InsightsResponse};
use crate::routes::extract::AppJson;
use crate::state::AppState;

pub async fn generate_insights(
    State(state): State<AppState>,
    AppJson(req): AppJson<InsightsRequest>,
) -> Result<Json<InsightsResponse>, ApiError> {
    if req.note_content.trim().is_empty() {
        return Err(InputError::EmptyField("Note content").into());
    }

    let generated = state.ai.generate_insights(&req.note_content).await?;

    Ok(Json(InsightsResponse {
        insights: generated.text,
        model: generated.model,
    }))
}
