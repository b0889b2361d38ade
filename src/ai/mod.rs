mod client;
mod parsing;
mod prompts;

// ===== PUBLIC API =====

pub use client::{GeminiClient, Generated, GenerationRequest, HealthReport, ResponseShape};
pub use parsing::{extract_json, truncate_for_log, ExtractedDocument};
pub use prompts::{
    build_chat_prompt, build_notes_prompt, build_study_plan_prompt, build_topic_notes_prompt,
    build_youtube_notes_prompt,
};
