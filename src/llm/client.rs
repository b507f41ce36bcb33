use crate::types::Result;
use async_trait::async_trait;

/// Sampling temperature used for every model call.
///
/// Pinned near zero so segmentation and answers are deterministic-leaning;
/// bit-identical output is not guaranteed.
pub const SAMPLING_TEMPERATURE: f32 = 0.01;

/// Role of one chat message. The engine only ever sends `system` and `user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// Instruction or context supplied by the engine.
    System,
    /// The end user's question or the chunk under analysis.
    User,
}

/// One message in a chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Message role.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Chat-model client trait.
///
/// Implementations return the first choice's text with surrounding
/// whitespace trimmed, and surface transport problems as
/// [`crate::types::AppError::Llm`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a message sequence and return the trimmed response text.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Model identifier this client talks to.
    fn model_name(&self) -> &str;
}
