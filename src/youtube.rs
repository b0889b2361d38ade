use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::documents::decode_entities;
use crate::error::{InputError, TranscriptError};

// ===== VIDEO ID =====

// Tried in order; the first match wins.
static VIDEO_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#/]+)",
        r"youtube\.com/watch\?.*?\bv=([^&\n?#]+)",
        r"youtu\.be/([^&\n?#/]+)",
        r"youtube\.com/embed/([^&\n?#/]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("video id pattern is valid"))
    .collect()
});

static TIMEDTEXT_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<text[^>]*>([\s\S]*?)</text>").expect("segment pattern is valid"));

static INLINE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Pull the video id out of a watch, short or embed link.
pub fn extract_video_id(url: &str) -> Result<String, InputError> {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(InputError::InvalidUrl)
}

// ===== TRANSCRIPTS =====

#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// The full transcript of a video as one space-joined string.
    async fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError>;
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode", default)]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

/// Reads the caption track list embedded in the watch page and downloads
/// the preferred track as timedtext XML.
pub struct YouTubeTranscriptClient {
    http: reqwest::Client,
    base_url: String,
}

impl YouTubeTranscriptClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TranscriptSource for YouTubeTranscriptClient {
    async fn fetch_transcript(&self, video_id: &str) -> Result<String, TranscriptError> {
        info!("📺 Fetching transcript for video {}", video_id);

        let response = self
            .http
            .get(format!("{}/watch", self.base_url))
            .query(&[("v", video_id)])
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => {}
            reqwest::StatusCode::NOT_FOUND => return Err(TranscriptError::VideoUnavailable),
            s => return Err(TranscriptError::Status(s.as_u16())),
        }

        let page = response.text().await?;
        let tracks = parse_caption_tracks(&page)?;
        let track = pick_track(&tracks).ok_or(TranscriptError::NotFound)?;
        debug!(language = %track.language_code, kind = ?track.kind, "selected caption track");

        let response = self.http.get(&track.base_url).send().await?;
        if !response.status().is_success() {
            return Err(TranscriptError::Status(response.status().as_u16()));
        }
        let xml = response.text().await?;

        let transcript = parse_timedtext(&xml);
        if transcript.is_empty() {
            return Err(TranscriptError::Empty);
        }

        info!("📺 Transcript has {} characters", transcript.chars().count());
        Ok(transcript)
    }
}

fn parse_caption_tracks(page: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
    const MARKER: &str = "\"captionTracks\":";

    let Some(index) = page.find(MARKER) else {
        let unavailable = page.contains("\"playabilityStatus\":{\"status\":\"ERROR\"")
            || page.contains("\"playabilityStatus\":{\"status\":\"LOGIN_REQUIRED\"");
        return Err(if unavailable {
            TranscriptError::VideoUnavailable
        } else {
            TranscriptError::Disabled
        });
    };

    let rest = &page[index + MARKER.len()..];
    serde_json::Deserializer::from_str(rest)
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .and_then(Result::ok)
        .ok_or(TranscriptError::NotFound)
}

/// Manual English captions first, then any English track, then whatever
/// comes first.
fn pick_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    let english = |t: &&CaptionTrack| t.language_code.starts_with("en");
    let manual = |t: &&CaptionTrack| t.kind.as_deref() != Some("asr");

    tracks
        .iter()
        .filter(english)
        .find(manual)
        .or_else(|| tracks.iter().find(english))
        .or_else(|| tracks.first())
}

fn parse_timedtext(xml: &str) -> String {
    TIMEDTEXT_SEGMENT
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            // Timedtext is escaped twice: once as XML, once as HTML inside it.
            let decoded = decode_entities(m.as_str());
            let stripped = INLINE_TAG.replace_all(&decoded, "");
            let text = decode_entities(&stripped);
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
