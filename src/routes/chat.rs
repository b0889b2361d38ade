use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::error::{ApiError, InputError};
use crate::models::{ChatRequest, ChatResponse, ServiceStatus};
use crate::routes::extract::AppJson;
use crate::state::AppState;

pub const NO_NOTES_REPLY: &str = "I don't have any notes to reference yet. \
Select one or more notes (or generate some from a PDF, a topic or a YouTube video) \
and ask me again, and I'll answer based on them.";

pub async fn chat_with_notes(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let question = req.message.trim();
    if question.is_empty() {
        return Err(InputError::EmptyField("Message").into());
    }

    // No notes selected: answer without calling the model.
    if req.context.trim().is_empty() {
        return Ok(Json(ChatResponse {
            response: NO_NOTES_REPLY.to_string(),
            referenced_notes: Vec::new(),
        }));
    }

    info!(
        "💬 Chat question over {} note(s): \"{}\"",
        req.selected_notes.len(),
        question
    );

    let generated = state.ai.generate_chat_answer(question, &req.context).await?;

    Ok(Json(ChatResponse {
        response: generated.text,
        referenced_notes: req.selected_notes,
    }))
}

pub async fn test_chat() -> Json<ServiceStatus> {
    Json(ServiceStatus::ready("Chat service is running"))
}
