use std::fmt;

use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

// ===== USER-FACING MESSAGES =====

pub const AUTH_FAILED_MESSAGE: &str =
    "Authentication failed: Check your Gemini API key and API enablement in Google Cloud.";
pub const OVERLOADED_MESSAGE: &str =
    "The Gemini model is currently overloaded. Please try again later.";
pub const QUOTA_MESSAGE: &str = "You have exceeded your Gemini API quota. Please check your plan and billing details at https://ai.google.dev/gemini-api/docs/rate-limits.";
pub const TIMEOUT_MESSAGE: &str = "The Gemini API request timed out. Please try again later.";
pub const EXHAUSTED_MESSAGE: &str =
    "All Gemini models failed. Check API key, billing, and API enablement.";

// ===== PER-ATTEMPT FAILURES =====

/// Why a single candidate model failed. Classified once, where the HTTP
/// status or transport error is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Authentication,
    Overloaded,
    QuotaExceeded,
    Timeout,
    MalformedResponse,
    EmptyResponse,
    Upstream(u16),
    Network,
}

impl FailureKind {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => FailureKind::Authentication,
            429 => FailureKind::QuotaExceeded,
            503 => FailureKind::Overloaded,
            other => FailureKind::Upstream(other),
        }
    }

    /// Classify a transport-level failure (no HTTP status available).
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_decode() {
            FailureKind::MalformedResponse
        } else {
            FailureKind::Network
        }
    }

    /// Whether the fallback loop may move on to the next candidate.
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, FailureKind::Authentication)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Authentication => write!(f, "authentication"),
            FailureKind::Overloaded => write!(f, "overloaded"),
            FailureKind::QuotaExceeded => write!(f, "quota exceeded"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::EmptyResponse => write!(f, "empty response"),
            FailureKind::Upstream(status) => write!(f, "upstream status {}", status),
            FailureKind::Network => write!(f, "network"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub model: String,
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.model, self.kind, self.message)
    }
}

// ===== GENERATION =====

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Prompt cannot be empty")]
    EmptyPrompt,

    #[error("Authentication failed for model {model}: {message}")]
    Authentication { model: String, message: String },

    #[error("All {} Gemini models failed: {}", .failures.len(), summarize(.failures))]
    Exhausted { failures: Vec<AttemptFailure> },
}

fn summarize(failures: &[AttemptFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl GenerationError {
    /// The failure kind that best explains an exhausted fallback list.
    pub fn dominant_kind(&self) -> Option<FailureKind> {
        match self {
            GenerationError::EmptyPrompt => None,
            GenerationError::Authentication { .. } => Some(FailureKind::Authentication),
            GenerationError::Exhausted { failures } => {
                if failures.is_empty() {
                    None
                } else if failures.iter().any(|f| f.kind == FailureKind::QuotaExceeded) {
                    Some(FailureKind::QuotaExceeded)
                } else if failures.iter().all(|f| f.kind == FailureKind::Overloaded) {
                    Some(FailureKind::Overloaded)
                } else if failures.iter().all(|f| f.kind == FailureKind::Timeout) {
                    Some(FailureKind::Timeout)
                } else {
                    None
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match (self, self.dominant_kind()) {
            (GenerationError::EmptyPrompt, _) => StatusCode::BAD_REQUEST,
            (_, Some(FailureKind::Authentication)) => StatusCode::FORBIDDEN,
            (_, Some(FailureKind::QuotaExceeded)) => StatusCode::TOO_MANY_REQUESTS,
            (_, Some(FailureKind::Overloaded)) => StatusCode::SERVICE_UNAVAILABLE,
            (_, Some(FailureKind::Timeout)) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn user_message(&self) -> String {
        match (self, self.dominant_kind()) {
            (GenerationError::EmptyPrompt, _) => self.to_string(),
            (_, Some(FailureKind::Authentication)) => AUTH_FAILED_MESSAGE.to_string(),
            (_, Some(FailureKind::QuotaExceeded)) => QUOTA_MESSAGE.to_string(),
            (_, Some(FailureKind::Overloaded)) => OVERLOADED_MESSAGE.to_string(),
            (_, Some(FailureKind::Timeout)) => TIMEOUT_MESSAGE.to_string(),
            _ => EXHAUSTED_MESSAGE.to_string(),
        }
    }
}

// ===== JSON EXTRACTION =====

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("No JSON object or array found in the response text.")]
    NoJsonFound,

    #[error("Failed to parse JSON. Raw text was: '{text}'. Error: {message}")]
    Parse { text: String, message: String },
}

// ===== CLIENT INPUT =====

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("{0}")]
    InvalidValue(String),

    #[error("Invalid YouTube URL format")]
    InvalidUrl,

    #[error("The uploaded file is empty.")]
    EmptyUpload,

    #[error("Unsupported file type: .{0}. Please upload a PDF, DOCX, or TXT file.")]
    UnsupportedFileType(String),

    #[error("Could not extract text from the file. It might be empty or scanned.")]
    EmptyText,

    #[error("Could not read the file: {0}")]
    Unreadable(String),

    #[error("{0} not found")]
    NotFound(&'static str),
}

// ===== TRANSCRIPTS =====

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Transcripts are disabled for this video. The video owner has turned off captions/subtitles.")]
    Disabled,

    #[error("No transcript found for this video. The video may not have any captions or subtitles available.")]
    NotFound,

    #[error("This video is unavailable or does not exist.")]
    VideoUnavailable,

    #[error("Transcript is empty or unavailable for this video.")]
    Empty,

    #[error("Failed to fetch the transcript: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Transcript service returned status {0}")]
    Status(u16),
}

impl TranscriptError {
    /// Short machine-readable label used by the transcript test route.
    pub fn label(&self) -> &'static str {
        match self {
            TranscriptError::Disabled => "TranscriptsDisabled",
            TranscriptError::NotFound => "NoTranscriptFound",
            TranscriptError::VideoUnavailable => "VideoUnavailable",
            TranscriptError::Empty => "EmptyTranscript",
            TranscriptError::Request(_) | TranscriptError::Status(_) => "UnexpectedError",
        }
    }
}

// ===== NOTES EXPORT =====

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOCX packaging error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

// ===== CONFIGURATION =====

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not found in .env file or environment variables")]
    MissingVar(&'static str),

    #[error("{0} must list at least one model")]
    NoModels(&'static str),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

// ===== HTTP MAPPING =====

/// The single error type route handlers return. Renders as
/// `{"detail": "..."}` with the carried status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.message }))).into_response()
    }
}

// Extractor rejections keep axum's status but use the `detail` body.

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        tracing::error!(error = %err, "generation failed");
        Self::new(err.status(), err.user_message())
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        tracing::error!(error = %err, "could not extract JSON from model output");
        let message = match err {
            ExtractionError::NoJsonFound => {
                "The AI response did not contain a study plan. Please try again."
            }
            ExtractionError::Parse { .. } => {
                "The AI returned a study plan that could not be read. Please try again."
            }
        };
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        let status = match err {
            InputError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl From<TranscriptError> for ApiError {
    fn from(err: TranscriptError) -> Self {
        let status = match err {
            TranscriptError::Disabled | TranscriptError::NotFound | TranscriptError::Empty => {
                StatusCode::BAD_REQUEST
            }
            TranscriptError::VideoUnavailable => StatusCode::NOT_FOUND,
            TranscriptError::Request(_) | TranscriptError::Status(_) => {
                tracing::error!(error = %err, "transcript fetch failed");
                return Self::new(
                    StatusCode::BAD_GATEWAY,
                    "An unexpected error occurred while fetching the transcript. Please try again later.",
                );
            }
        };
        Self::new(status, err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        tracing::error!(error = %err, "notes export failed");
        Self::internal("Failed to create the notes document.")
    }
}
