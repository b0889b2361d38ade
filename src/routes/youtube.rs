use axum::extract::State;
use axum::Json;
use tracing::{info, warn};

use crate::error::{ApiError, TranscriptError};
use crate::models::{
    ServiceStatus, TranscriptProbeResponse, YouTubeNotesRequest, YouTubeNotesResponse,
};
use crate::routes::extract::{AppJson, AppPath};
use crate::state::AppState;
use crate::youtube::extract_video_id;

pub async fn generate_youtube_notes(
    State(state): State<AppState>,
    AppJson(req): AppJson<YouTubeNotesRequest>,
) -> Result<Json<YouTubeNotesResponse>, ApiError> {
    let video_url = req.video_url.trim().to_string();
    let video_id = extract_video_id(&video_url)?;
    info!("🎬 YouTube notes for video {}", video_id);

    let transcript = state.transcripts.fetch_transcript(&video_id).await?;
    if transcript.trim().is_empty() {
        return Err(TranscriptError::Empty.into());
    }
    info!("📜 Transcript: {} chars", transcript.chars().count());

    let generated = state.ai.generate_youtube_notes(&transcript).await?;

    Ok(Json(YouTubeNotesResponse {
        success: true,
        ai_notes: generated.text,
        video_url,
        video_id,
        model: generated.model,
        message: "YouTube notes generated successfully".to_string(),
    }))
}

pub async fn test_youtube_notes() -> Json<ServiceStatus> {
    Json(ServiceStatus::ready("YouTube notes service is running"))
}

/// Diagnostic probe: reports transcript availability without calling the model.
pub async fn test_transcript_fetch(
    State(state): State<AppState>,
    AppPath(video_id): AppPath<String>,
) -> Json<TranscriptProbeResponse> {
    match state.transcripts.fetch_transcript(&video_id).await {
        Ok(transcript) => Json(TranscriptProbeResponse {
            success: true,
            transcript_length: Some(transcript.chars().count()),
            error: None,
            message: format!("Transcript fetched for video {}", video_id),
            video_id,
        }),
        Err(e) => {
            warn!("Transcript probe for {} failed: {}", video_id, e);
            Json(TranscriptProbeResponse {
                success: false,
                transcript_length: None,
                error: Some(e.label().to_string()),
                message: e.to_string(),
                video_id,
            })
        }
    }
}
