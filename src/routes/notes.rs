use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

use crate::error::{ApiError, InputError};
use crate::export::DOCX_MIME;
use crate::models::{FileNotesResponse, TopicNotesRequest, TopicNotesResponse};
use crate::routes::extract::{AppJson, AppPath};
use crate::state::AppState;

/// Multipart upload (`file` field) → extracted text → notes → DOCX export.
pub async fn generate_notes_from_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FileNotesResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes.to_vec()));
    }

    let (filename, bytes) = upload.ok_or(InputError::EmptyField("File"))?;
    info!("📎 Upload: {} ({} bytes)", filename, bytes.len());

    let extractor = state.documents.clone();
    let name = filename.clone();
    let text = tokio::task::spawn_blocking(move || extractor.extract_text(&name, &bytes))
        .await
        .map_err(|e| ApiError::internal(format!("Text extraction task failed: {}", e)))??;

    let generated = state.ai.generate_notes(&text).await?;
    let exported = state.exporter.export_docx(&generated.text).await?;

    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename.as_str());

    Ok(Json(FileNotesResponse {
        notes: generated.text,
        docx_path: exported.file_name,
        filename: format!("AI_Notes_{}.docx", stem),
        model: generated.model,
    }))
}

pub async fn generate_notes_from_topic(
    State(state): State<AppState>,
    AppJson(req): AppJson<TopicNotesRequest>,
) -> Result<Json<TopicNotesResponse>, ApiError> {
    let topic = req.topic.trim();
    if topic.is_empty() {
        return Err(InputError::EmptyField("Topic").into());
    }

    let generated = state.ai.generate_topic_notes(topic, req.day, &req.tasks).await?;

    Ok(Json(TopicNotesResponse {
        notes: generated.text,
        topic: topic.to_string(),
        day: req.day,
        model: generated.model,
    }))
}

pub async fn download_notes(
    State(state): State<AppState>,
    AppPath(file): AppPath<String>,
) -> Result<Response, ApiError> {
    let bytes = state
        .exporter
        .take(&file)
        .await?
        .ok_or(InputError::NotFound("File"))?;

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file),
            ),
        ],
        bytes,
    )
        .into_response())
}
