use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::ai::extract_json;
use crate::error::{ApiError, InputError};
use crate::models::{PlanRequest, PlanResponse};
use crate::routes::extract::AppJson;
use crate::state::AppState;

const MAX_HOURS_PER_DAY: u32 = 24;

pub async fn generate_plan(
    State(state): State<AppState>,
    AppJson(req): AppJson<PlanRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    validate(&req)?;

    info!(
        "🗓️  Plan request: \"{}\" ({}, {}h/day, {} days)",
        req.goal, req.speed, req.hours_per_day, req.duration_days
    );

    let generated = state
        .ai
        .generate_plan(req.goal.trim(), req.speed.trim(), req.hours_per_day, req.duration_days)
        .await?;

    // The model may wrap the JSON in prose or a code fence.
    let plan = extract_json(&generated.text)?;

    Ok(Json(PlanResponse {
        plan: plan.value,
        model: generated.model,
    }))
}

fn validate(req: &PlanRequest) -> Result<(), InputError> {
    if req.goal.trim().is_empty() {
        return Err(InputError::EmptyField("Goal"));
    }
    if req.speed.trim().is_empty() {
        return Err(InputError::EmptyField("Speed"));
    }
    if req.hours_per_day == 0 || req.hours_per_day > MAX_HOURS_PER_DAY {
        return Err(InputError::InvalidValue(format!(
            "hours_per_day must be between 1 and {}",
            MAX_HOURS_PER_DAY
        )));
    }
    if req.duration_days == 0 {
        return Err(InputError::InvalidValue(
            "duration_days must be at least 1".to_string(),
        ));
    }
    Ok(())
}
