use serde_json::json;
use tracing::{error, info, warn};

use super::parsing::{extract_ai_text, truncate_for_log, GeminiResponse};
use super::prompts::{
    build_chat_prompt, build_notes_prompt, build_study_plan_prompt, build_topic_notes_prompt,
    build_youtube_notes_prompt,
};
use crate::config::GeminiConfig;
use crate::error::{AttemptFailure, ConfigError, FailureKind, GenerationError};

const HEALTH_CHECK_PROMPT: &str = "Say hello.";

/// What kind of reply the caller expects. `Json` asks the endpoint for a
/// JSON mime type; the reply still goes through the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub shape: ResponseShape,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            shape: ResponseShape::Text,
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            shape: ResponseShape::Json,
        }
    }
}

/// A successful generation and the candidate that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub model: String,
    /// Number of candidates tried, the winner included.
    pub attempts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub success: bool,
    pub model: Option<String>,
    pub error: Option<String>,
}

/// Gemini client with sequential model fallback.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ConfigError> {
        if config.models.is_empty() {
            return Err(ConfigError::NoModels("GEMINI_MODELS"));
        }

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Candidate models in the order they are tried.
    pub fn models(&self) -> &[String] {
        &self.config.models
    }

    // ===== SINGLE ATTEMPT =====

    /// One request to one model. Every failure comes back classified; this
    /// never retries.
    pub async fn call_model(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, AttemptFailure> {
        let fail = |kind: FailureKind, message: String| AttemptFailure {
            model: model.to_string(),
            kind,
            message,
        };

        let url = format!("{}/{}:generateContent", self.config.base_url, model);

        let mut body = json!({
            "contents": [{"parts": [{"text": request.prompt}]}]
        });
        if request.shape == ResponseShape::Json {
            body["generationConfig"] = json!({ "responseMimeType": "application/json" });
        }

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| fail(FailureKind::from_transport(&e), e.without_url().to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(fail(
                FailureKind::from_status(status),
                format!("HTTP {}: {}", status.as_u16(), truncate_for_log(&error_text, 200)),
            ));
        }

        let raw = response
            .text()
            .await
            .map_err(|e| fail(FailureKind::from_transport(&e), e.without_url().to_string()))?;

        let gemini_response: GeminiResponse = serde_json::from_str(&raw).map_err(|e| {
            fail(
                FailureKind::MalformedResponse,
                format!("Failed to deserialize: {}", e),
            )
        })?;

        let ai_text = extract_ai_text(&gemini_response).ok_or_else(|| {
            fail(
                FailureKind::MalformedResponse,
                format!(
                    "Gemini API returned unexpected structure: {}",
                    truncate_for_log(&raw, 200)
                ),
            )
        })?;

        if ai_text.trim().is_empty() {
            return Err(fail(
                FailureKind::EmptyResponse,
                "Gemini returned empty text".to_string(),
            ));
        }

        Ok(ai_text)
    }

    // ===== FALLBACK LOOP =====

    /// Try each candidate in order; the first success wins and no further
    /// candidate is contacted. Authentication failures stop the loop at
    /// once, every other failure moves on to the next model.
    pub async fn generate(&self, request: GenerationRequest) -> Result<Generated, GenerationError> {
        if request.prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        let total = self.config.models.len();
        let mut failures = Vec::with_capacity(total);

        info!(
            prompt = %truncate_for_log(&request.prompt, 60),
            shape = ?request.shape,
            "🤖 AI processing"
        );

        for (index, model) in self.config.models.iter().enumerate() {
            info!("🔄 Model: {} (attempt {}/{})", model, index + 1, total);

            match self.call_model(model, &request).await {
                Ok(text) => {
                    info!(
                        "✅ Generated content with {} ({})",
                        model,
                        truncate_for_log(&text, 60)
                    );
                    return Ok(Generated {
                        text,
                        model: model.clone(),
                        attempts: index + 1,
                    });
                }
                Err(failure) if !failure.kind.allows_fallback() => {
                    error!(
                        "❌ Authentication failed for {}: {}. Check the API key and that the Gemini API is enabled.",
                        model, failure.message
                    );
                    return Err(GenerationError::Authentication {
                        model: failure.model,
                        message: failure.message,
                    });
                }
                Err(failure) => {
                    warn!(
                        kind = %failure.kind,
                        "❌ {} failed: {}. Trying next model in fallback list.",
                        model,
                        failure.message
                    );
                    failures.push(failure);
                }
            }
        }

        error!("All {} Gemini models in the fallback list failed", total);
        Err(GenerationError::Exhausted { failures })
    }

    // ===== DOMAIN OPERATIONS =====

    pub async fn generate_plan(
        &self,
        goal: &str,
        speed: &str,
        hours_per_day: u32,
        duration_days: u32,
    ) -> Result<Generated, GenerationError> {
        let prompt = build_study_plan_prompt(goal, speed, hours_per_day, duration_days);
        self.generate(GenerationRequest::json(prompt)).await
    }

    pub async fn generate_notes(&self, text: &str) -> Result<Generated, GenerationError> {
        self.generate(GenerationRequest::text(build_notes_prompt(text))).await
    }

    /// Insights over an existing note use the notes template.
    pub async fn generate_insights(
        &self,
        note_content: &str,
    ) -> Result<Generated, GenerationError> {
        self.generate_notes(note_content).await
    }

    pub async fn generate_topic_notes(
        &self,
        topic: &str,
        day: u32,
        tasks: &[String],
    ) -> Result<Generated, GenerationError> {
        let prompt = build_topic_notes_prompt(topic, day, tasks);
        self.generate(GenerationRequest::text(prompt)).await
    }

    pub async fn generate_youtube_notes(
        &self,
        transcript: &str,
    ) -> Result<Generated, GenerationError> {
        let prompt = build_youtube_notes_prompt(transcript);
        self.generate(GenerationRequest::text(prompt)).await
    }

    pub async fn generate_chat_answer(
        &self,
        question: &str,
        notes_context: &str,
    ) -> Result<Generated, GenerationError> {
        let prompt = build_chat_prompt(notes_context, question);
        self.generate(GenerationRequest::text(prompt)).await
    }

    /// Minimal round trip through the fallback list.
    pub async fn health_check(&self) -> HealthReport {
        match self.generate(GenerationRequest::text(HEALTH_CHECK_PROMPT)).await {
            Ok(generated) => HealthReport {
                success: true,
                model: Some(generated.model),
                error: None,
            },
            Err(e) => HealthReport {
                success: false,
                model: None,
                error: Some(e.user_message()),
            },
        }
    }
}
