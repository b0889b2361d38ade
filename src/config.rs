use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

// ===== DEFAULTS =====

/// Gemini models to try, in order of preference.
pub const DEFAULT_GEMINI_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-1.5-flash-latest",
];

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];

/// Everything the generation client needs. Built once, never mutated.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub models: Vec<String>,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>, models: Vec<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            models,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub gemini: GeminiConfig,
    pub youtube_base_url: String,
    pub allowed_origins: Vec<String>,
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// Read configuration from the process environment. Call after
    /// `dotenvy::dotenv()` so `.env` values are visible.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] but over an arbitrary lookup, so
    /// parsing can be tested without touching process state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::MissingVar("GEMINI_API_KEY"))?;

        let models = match get("GEMINI_MODELS") {
            Some(raw) => split_list(&raw),
            None => DEFAULT_GEMINI_MODELS.iter().map(|m| m.to_string()).collect(),
        };
        if models.is_empty() {
            return Err(ConfigError::NoModels("GEMINI_MODELS"));
        }

        let timeout = match get("GEMINI_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "GEMINI_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let gemini = GeminiConfig::new(api_key, models)
            .with_base_url(
                get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            )
            .with_timeout(timeout);

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                warn!("Invalid PORT='{}', falling back to {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(raw) => split_list(&raw),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let export_dir = get("NOTES_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("study-notes"));

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            gemini,
            youtube_base_url: get("YOUTUBE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_YOUTUBE_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            allowed_origins,
            export_dir,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
