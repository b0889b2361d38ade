use serde::{Deserialize, Serialize};
use serde_json::Value;

// ===== STUDY PLAN =====

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub goal: String,
    pub speed: String,
    pub hours_per_day: u32,
    pub duration_days: u32,
}

/// `plan` is whatever JSON the model produced; its shape is only
/// prescribed by the prompt.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: Value,
    pub model: String,
}

// ===== NOTES =====

#[derive(Debug, Serialize)]
pub struct FileNotesResponse {
    pub notes: String,
    /// Handle for `/download-notes/{docx_path}`.
    pub docx_path: String,
    pub filename: String,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct TopicNotesRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default = "default_day")]
    pub day: u32,
    #[serde(default)]
    pub tasks: Vec<String>,
}

fn default_day() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct TopicNotesResponse {
    pub notes: String,
    pub topic: String,
    pub day: u32,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    pub note_content: String,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: String,
    pub model: String,
}

// ===== YOUTUBE =====

#[derive(Debug, Deserialize)]
pub struct YouTubeNotesRequest {
    pub video_url: String,
}

#[derive(Debug, Serialize)]
pub struct YouTubeNotesResponse {
    pub success: bool,
    pub ai_notes: String,
    pub video_url: String,
    pub video_id: String,
    pub model: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptProbeResponse {
    pub success: bool,
    pub video_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

// ===== CHAT =====

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub selected_notes: Vec<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    pub referenced_notes: Vec<String>,
}

// ===== SERVICE STATUS =====

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub success: bool,
    pub message: String,
    pub status: String,
}

impl ServiceStatus {
    pub fn ready(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            status: "ready".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
