use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use study_backend::ai::GeminiClient;
use study_backend::config::GeminiConfig;
use study_backend::documents::DocumentReader;
use study_backend::error::{TranscriptError, OVERLOADED_MESSAGE};
use study_backend::export::{NotesExporter, DOCX_MIME};
use study_backend::routes::chat::NO_NOTES_REPLY;
use study_backend::routes::create_router;
use study_backend::state::AppState;
use study_backend::youtube::TranscriptSource;

const MODELS: [&str; 2] = ["model-a", "model-b"];

enum StubTranscript {
    Text(&'static str),
    Disabled,
}

#[async_trait]
impl TranscriptSource for StubTranscript {
    async fn fetch_transcript(&self, _video_id: &str) -> Result<String, TranscriptError> {
        match self {
            StubTranscript::Text(text) => Ok(text.to_string()),
            StubTranscript::Disabled => Err(TranscriptError::Disabled),
        }
    }
}

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(gemini_body(text))
}

fn gemini_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }]
    })
}

async fn mount(server: &MockServer, model: &str, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/models/{}:generateContent", model)))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

struct Harness {
    server: TestServer,
    // Held so the export directory outlives the test.
    _export_dir: tempfile::TempDir,
}

fn harness(gemini: &MockServer, transcript: StubTranscript) -> Harness {
    let export_dir = tempfile::tempdir().unwrap();
    let config = GeminiConfig::new("test-key", MODELS.iter().map(|m| m.to_string()).collect())
        .with_base_url(format!("{}/models", gemini.uri()))
        .with_timeout(Duration::from_millis(500));

    let state = AppState {
        ai: Arc::new(GeminiClient::new(config).unwrap()),
        transcripts: Arc::new(transcript),
        documents: Arc::new(DocumentReader),
        exporter: Arc::new(NotesExporter::new(export_dir.path())),
    };
    let app = create_router(state, &["http://localhost:3000".to_string()]);

    Harness {
        server: TestServer::new(app).unwrap(),
        _export_dir: export_dir,
    }
}

fn plan_request() -> Value {
    json!({
        "goal": "Learn Rust",
        "speed": "normal",
        "hours_per_day": 2,
        "duration_days": 7
    })
}

#[tokio::test]
async fn test_ping() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h.server.get("/ping").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"message": "pong"}));
}

#[tokio::test]
async fn test_plan_from_fenced_reply() {
    let gemini = MockServer::start().await;
    let reply_text = "Here is your plan:\n```json\n{\"totalDays\": 7, \"dailyPlan\": []}\n```";
    mount(&gemini, "model-a", reply(reply_text), 1).await;
    mount(&gemini, "model-b", reply("{}"), 0).await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h.server.post("/generate-plan").json(&plan_request()).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["plan"]["totalDays"], 7);
    assert_eq!(body["model"], "model-a");
}

#[tokio::test]
async fn test_plan_falls_back_to_second_model() {
    let gemini = MockServer::start().await;
    mount(&gemini, "model-a", ResponseTemplate::new(503), 1).await;
    mount(
        &gemini,
        "model-b",
        reply("{\"totalDays\": 7}"),
        1,
    )
    .await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h.server.post("/generate-plan").json(&plan_request()).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["model"], "model-b");
    assert_eq!(body["plan"]["totalDays"], 7);
}

#[tokio::test]
async fn test_plan_all_models_overloaded() {
    let gemini = MockServer::start().await;
    mount(&gemini, "model-a", ResponseTemplate::new(503), 1).await;
    mount(&gemini, "model-b", ResponseTemplate::new(503), 1).await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h.server.post("/generate-plan").json(&plan_request()).await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json::<Value>()["detail"], OVERLOADED_MESSAGE);
}

#[tokio::test]
async fn test_plan_auth_failure_skips_remaining_models() {
    let gemini = MockServer::start().await;
    mount(&gemini, "model-a", ResponseTemplate::new(401), 1).await;
    mount(&gemini, "model-b", reply("{}"), 0).await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h.server.post("/generate-plan").json(&plan_request()).await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_plan_without_json_is_bad_gateway() {
    let gemini = MockServer::start().await;
    mount(
        &gemini,
        "model-a",
        reply("Sorry, I cannot help with that."),
        1,
    )
    .await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h.server.post("/generate-plan").json(&plan_request()).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_plan_rejects_invalid_hours() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let mut request = plan_request();
    request["hours_per_day"] = json!(0);
    let response = h.server.post("/generate-plan").json(&request).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(gemini.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_without_context_skips_model() {
    let gemini = MockServer::start().await;
    mount(&gemini, "model-a", reply("x"), 0).await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/chat-with-notes")
        .json(&json!({"message": "What is ownership?", "context": "   "}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["response"], NO_NOTES_REPLY);
    assert_eq!(body["referenced_notes"], json!([]));
}

#[tokio::test]
async fn test_chat_answers_from_notes() {
    let gemini = MockServer::start().await;
    mount(
        &gemini,
        "model-a",
        reply("Ownership means one owner per value."),
        1,
    )
    .await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/chat-with-notes")
        .json(&json!({
            "message": "What is ownership?",
            "context": "Note 1: Rust ownership rules",
            "selected_notes": ["note-1"]
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["response"], "Ownership means one owner per value.");
    assert_eq!(body["referenced_notes"], json!(["note-1"]));
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/chat-with-notes")
        .json(&json!({"message": "", "context": "notes"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["detail"], "Message cannot be empty");
}

#[tokio::test]
async fn test_youtube_rejects_invalid_url() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Text("unused"));

    let response = h
        .server
        .post("/generate-notes/youtube")
        .json(&json!({"video_url": "https://example.com/watch"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["detail"], "Invalid YouTube URL format");
}

#[tokio::test]
async fn test_youtube_notes_from_transcript() {
    let gemini = MockServer::start().await;
    mount(
        &gemini,
        "model-a",
        reply("VIDEO NOTES"),
        1,
    )
    .await;
    let h = harness(&gemini, StubTranscript::Text("today we learn about lifetimes"));

    let response = h
        .server
        .post("/generate-notes/youtube")
        .json(&json!({"video_url": "https://youtu.be/dQw4w9WgXcQ"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["video_id"], "dQw4w9WgXcQ");
    assert_eq!(body["ai_notes"], "VIDEO NOTES");
    assert_eq!(body["model"], "model-a");
}

#[tokio::test]
async fn test_youtube_disabled_transcript() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/generate-notes/youtube")
        .json(&json!({"video_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(gemini.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transcript_probe_reports_label() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h.server.get("/youtube-notes/test-transcript/dQw4w9WgXcQ").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "TranscriptsDisabled");
}

#[tokio::test]
async fn test_upload_notes_then_download_once() {
    let gemini = MockServer::start().await;
    mount(
        &gemini,
        "model-a",
        reply("KEY POINTS\n- borrowing"),
        1,
    )
    .await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"Borrowing lets code use a value without owning it.".to_vec())
            .file_name("lecture.txt")
            .mime_type("text/plain"),
    );
    let response = h.server.post("/generate-notes").multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["notes"], "KEY POINTS\n- borrowing");
    assert_eq!(body["filename"], "AI_Notes_lecture.docx");
    let handle = body["docx_path"].as_str().unwrap().to_string();

    let download = h.server.get(&format!("/download-notes/{}", handle)).await;
    download.assert_status_ok();
    assert_eq!(
        download.headers().get(header::CONTENT_TYPE).unwrap(),
        DOCX_MIME
    );
    assert!(download.as_bytes().starts_with(b"PK"));

    let again = h.server.get(&format!("/download-notes/{}", handle)).await;
    again.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"\x89PNG".to_vec()).file_name("diagram.png"),
    );
    let response = h.server.post("/generate-notes").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(gemini.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h.server.get("/download-notes/..%2FCargo.toml").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_topic_notes_require_topic() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/generate-notes-from-topic")
        .json(&json!({"topic": " ", "day": 2}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["detail"], "Topic cannot be empty");
}

#[tokio::test]
async fn test_ai_health_reports_failure() {
    let gemini = MockServer::start().await;
    mount(&gemini, "model-a", ResponseTemplate::new(503), 1).await;
    mount(&gemini, "model-b", ResponseTemplate::new(503), 1).await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h.server.get("/health/ai").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], OVERLOADED_MESSAGE);
}

#[tokio::test]
async fn test_plan_malformed_body_uses_detail_shape() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let mut request = plan_request();
    request["hours_per_day"] = json!(-1);
    let response = h.server.post("/generate-plan").json(&request).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("hours_per_day"));
    assert!(gemini.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_missing_message_uses_detail_shape() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/chat-with-notes")
        .json(&json!({"context": "notes"}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("message"));
}

#[tokio::test]
async fn test_invalid_json_syntax_uses_detail_shape() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/generate-insights")
        .text("{not json")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["detail"].is_string());
}

#[tokio::test]
async fn test_upload_without_multipart_uses_detail_shape() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h.server.post("/generate-notes").json(&json!({"file": "x"})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["detail"].is_string());
}

#[tokio::test]
async fn test_insights_from_note() {
    let gemini = MockServer::start().await;
    mount(
        &gemini,
        "model-a",
        reply("KEY INSIGHTS\n- traits"),
        1,
    )
    .await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/generate-insights")
        .json(&json!({"note_content": "Traits define shared behaviour."}))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"insights": "KEY INSIGHTS\n- traits", "model": "model-a"})
    );
}

#[tokio::test]
async fn test_insights_require_note_content() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/generate-insights")
        .json(&json!({"note_content": "  "}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["detail"], "Note content cannot be empty");
    assert!(gemini.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_topic_notes_carry_day_and_tasks() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/model-a:generateContent"))
        .and(body_string_contains("Day: 3"))
        .and(body_string_contains("Tasks: Read chapter 4, Write a CLI"))
        .respond_with(reply("TOPIC NOTES"))
        .expect(1)
        .mount(&gemini)
        .await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/generate-notes-from-topic")
        .json(&json!({
            "topic": " Error handling ",
            "day": 3,
            "tasks": ["Read chapter 4", "Write a CLI"]
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"notes": "TOPIC NOTES", "topic": "Error handling", "day": 3, "model": "model-a"})
    );
}

#[tokio::test]
async fn test_topic_notes_default_to_day_one() {
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/model-a:generateContent"))
        .and(body_string_contains("Day: 1"))
        .and(body_string_contains("No specific tasks provided"))
        .respond_with(reply("TOPIC NOTES"))
        .expect(1)
        .mount(&gemini)
        .await;
    let h = harness(&gemini, StubTranscript::Disabled);

    let response = h
        .server
        .post("/generate-notes-from-topic")
        .json(&json!({"topic": "Closures"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["day"], 1);
    assert_eq!(body["topic"], "Closures");
}

#[tokio::test]
async fn test_readiness_routes() {
    let gemini = MockServer::start().await;
    let h = harness(&gemini, StubTranscript::Disabled);

    for route in ["/youtube-notes/test", "/chat/test"] {
        let response = h.server.get(route).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true, "route {}", route);
        assert_eq!(body["status"], "ready", "route {}", route);
        assert!(body["message"].is_string(), "route {}", route);
    }
}
