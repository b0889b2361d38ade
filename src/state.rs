use std::sync::Arc;
use std::time::Duration;

use crate::ai::GeminiClient;
use crate::config::AppConfig;
use crate::documents::{DocumentReader, TextExtractor};
use crate::error::ConfigError;
use crate::export::NotesExporter;
use crate::youtube::{TranscriptSource, YouTubeTranscriptClient};

const TRANSCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared, read-only collaborators of every handler.
#[derive(Clone)]
pub struct AppState {
    pub ai: Arc<GeminiClient>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub documents: Arc<dyn TextExtractor>,
    pub exporter: Arc<NotesExporter>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let ai = GeminiClient::new(config.gemini.clone())?;
        let transcript_http = reqwest::Client::builder()
            .timeout(TRANSCRIPT_TIMEOUT)
            .build()?;
        let transcripts = YouTubeTranscriptClient::new(transcript_http, &config.youtube_base_url);

        Ok(Self {
            ai: Arc::new(ai),
            transcripts: Arc::new(transcripts),
            documents: Arc::new(DocumentReader),
            exporter: Arc::new(NotesExporter::new(&config.export_dir)),
        })
    }
}
