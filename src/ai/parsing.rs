use serde::Deserialize;
use serde_json::Value;

use crate::error::ExtractionError;

const FENCE: &str = "```";

// ===== API RESPONSE STRUCTURES =====

// Every level is optional so a structurally incomplete reply deserializes
// and is reported as malformed instead of failing inside serde.
#[derive(Debug, Default, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

// ===== RESPONSE EXTRACTORS =====

/// Text of the first candidate, joining its text parts. `None` when the
/// expected `candidates[0].content.parts[*].text` nesting is absent.
pub fn extract_ai_text(response: &GeminiResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let texts: Vec<&str> = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    }
}

/// A JSON value pulled out of a larger model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub value: Value,
    /// Character offset into the original text where the value starts.
    pub offset: usize,
}

/// Locate and parse the JSON object or array embedded in a model reply.
///
/// A reply wrapped entirely in a fenced code block is unwrapped first. The
/// value then starts at the earliest `{` or `[`; anything after the first
/// complete value (a closing fence, trailing prose) is ignored. Never
/// returns a guessed or empty structure.
pub fn extract_json(text: &str) -> Result<ExtractedDocument, ExtractionError> {
    let (body, base) = strip_code_fence(text);

    let start = match (body.find('{'), body.find('[')) {
        (None, None) => return Err(ExtractionError::NoJsonFound),
        (Some(brace), None) => brace,
        (None, Some(bracket)) => bracket,
        (Some(brace), Some(bracket)) => brace.min(bracket),
    };

    let mut values = serde_json::Deserializer::from_str(&body[start..]).into_iter::<Value>();
    match values.next() {
        Some(Ok(value)) => Ok(ExtractedDocument {
            value,
            offset: text[..base + start].chars().count(),
        }),
        Some(Err(e)) => Err(ExtractionError::Parse {
            text: body.to_string(),
            message: e.to_string(),
        }),
        None => Err(ExtractionError::Parse {
            text: body.to_string(),
            message: "unexpected end of input".to_string(),
        }),
    }
}

/// Returns the fenced body (without an optional language tag) and its byte
/// offset into `text`, or `text` untouched when it is not fully fenced.
fn strip_code_fence(text: &str) -> (&str, usize) {
    let lead = text.len() - text.trim_start().len();
    let trimmed = text.trim();

    if trimmed.len() < FENCE.len() * 2 || !trimmed.starts_with(FENCE) || !trimmed.ends_with(FENCE) {
        return (text, 0);
    }

    let inner = &trimmed[FENCE.len()..trimmed.len() - FENCE.len()];
    let tag_len = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(inner.len());
    let tag_ends_line = inner[tag_len..].starts_with(char::is_whitespace) || tag_len == inner.len();
    let skip = if tag_ends_line { tag_len } else { 0 };

    let body = &inner[skip..];
    let body_start = body.len() - body.trim_start().len();

    (body.trim(), lead + FENCE.len() + skip + body_start)
}

// ===== HELPERS =====

/// Truncate text for logging, on a character boundary.
pub fn truncate_for_log(text: &str, max_len: usize) -> String {
    let clean_text = text.replace('\n', " ");
    if clean_text.chars().count() <= max_len {
        clean_text
    } else {
        let head: String = clean_text.chars().take(max_len).collect();
        format!("{}...", head)
    }
}
