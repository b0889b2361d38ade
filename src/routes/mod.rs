use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

pub mod chat;
pub mod extract;
pub mod health;
pub mod insights;
pub mod notes;
pub mod plan;
pub mod youtube;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Every route of the service, with CORS restricted to `allowed_origins`.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ping", get(health::ping))
        .route("/health/ai", get(health::ai_health))
        .route("/generate-plan", post(plan::generate_plan))
        .route("/generate-notes", post(notes::generate_notes_from_file))
        .route("/generate-notes-from-topic", post(notes::generate_notes_from_topic))
        .route("/download-notes/:file", get(notes::download_notes))
        .route("/generate-insights", post(insights::generate_insights))
        .route("/generate-notes/youtube", post(youtube::generate_youtube_notes))
        .route("/youtube-notes/test", get(youtube::test_youtube_notes))
        .route(
            "/youtube-notes/test-transcript/:video_id",
            get(youtube::test_transcript_fetch),
        )
        .route("/chat-with-notes", post(chat::chat_with_notes))
        .route("/chat/test", get(chat::test_chat))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
