//! Language-model clients and prompt contracts.
//!
//! The engine talks to one chat model through the [`LlmClient`] trait. Every
//! call type (consultation, boundary analysis, quiz generation) sends exactly
//! one fixed system instruction from [`prompts`] plus caller-built messages,
//! with the sampling temperature pinned near zero so repeated runs over the
//! same corpus stay stable.

/// Core chat client trait and message types.
pub mod client;
/// OpenAI-compatible chat client (DeepSeek, OpenAI, OpenRouter, ...).
pub mod openai;
/// Fixed prompt texts. Opaque compatibility contract; do not edit.
pub mod prompts;

pub use client::{ChatMessage, ChatRole, LlmClient, SAMPLING_TEMPERATURE};
pub use openai::OpenAiClient;
pub use prompts::{CONSULTATION_PROMPT, QUIZ_GENERATION_PROMPT, SECTION_ANALYSIS_PROMPT};

/// Strip a leading/trailing markdown code fence from a model response.
///
/// Models routinely wrap structured output in a triple-backtick fence even
/// when told not to. Only a fence on the very first and very last line is
/// removed; anything else is returned as-is (trimmed).
pub fn strip_code_fence(content: &str) -> &str {
    let mut content = content.trim();
    if content.starts_with("```") {
        content = match content.find('\n') {
            Some(idx) => content[idx + 1..].trim(),
            None => return "",
        };
        if let Some(idx) = content.rfind('\n') {
            if content[idx + 1..].trim_start().starts_with("```") {
                content = content[..idx].trim();
            }
        } else if content.starts_with("```") {
            content = "";
        }
    }
    content
}
