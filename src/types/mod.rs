//! Core types shared across the engine.
//!
//! Everything here is either part of the vector-store point schema (which
//! must stay stable for the lifetime of a collection) or one of the ephemeral
//! values that flow through a single processing or consultation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title attached to sections of a document whose leading pages did not
/// yield a recognizable `<META>` block. The literal value is part of the
/// stored payload contract and must not be translated.
pub const UNKNOWN_DOCUMENT_TITLE: &str = "Неизвестный документ";

// ============= Document Types =============

/// Processing status of an uploaded document.
///
/// The document record itself is owned by the external document store (see
/// [`crate::stores`]); the engine only drives the status transitions
/// `pending -> processing -> {processed | error}`. Returning an `error`
/// document to `pending` is a manual operation outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Uploaded, waiting to be scheduled.
    Pending,
    /// A processing task is currently running for this document.
    Processing,
    /// Sections are segmented and indexed.
    Processed,
    /// Processing failed; the error message is kept on the record.
    Error,
}

impl DocumentStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Reindexing re-enters `Processing` from both terminal states, which is
    /// why `Processed -> Processing` and `Error -> Processing` are allowed.
    pub fn can_transition(self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Processing, Processed)
                | (Processing, Error)
                | (Processed, Processing)
                | (Error, Processing)
                | (Error, Pending)
        )
    }
}

/// Title and publication year extracted once per document from its leading
/// text window, attached to every section of that document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Document title as reported by the model.
    pub title: String,
    /// Publication year, when the model reported a numeric one.
    pub year: Option<i32>,
}

impl Default for DocumentMeta {
    fn default() -> Self {
        Self {
            title: UNKNOWN_DOCUMENT_TITLE.to_string(),
            year: None,
        }
    }
}

/// A final assembled text span representing one coherent topic.
///
/// Sections are never persisted on their own; they exist between assembly
/// and indexing, where each becomes one embedding point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section body text.
    pub text: String,
    /// Metadata of the owning document.
    pub meta: DocumentMeta,
}

// ============= Vector Store Point Schema =============

/// Payload stored alongside every vector point.
///
/// This schema is fixed for the lifetime of a collection: all points of one
/// document share `document_id` and are removable as a unit by an equality
/// filter on that field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    /// Full section text.
    pub text: String,
    /// Title of the owning document.
    pub title: String,
    /// Publication year of the owning document, if known.
    pub year: Option<i32>,
    /// Opaque id of the owning document.
    pub document_id: String,
}

/// One embedding point ready for upsert.
#[derive(Debug, Clone)]
pub struct SectionPoint {
    /// Unique opaque point id (uuid v4 hex).
    pub id: String,
    /// Embedding vector; length equals the embedder's fixed dimension.
    pub vector: Vec<f32>,
    /// Stored payload.
    pub payload: PointPayload,
}

/// A point returned by similarity search, with its score.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    /// Stored payload of the hit.
    pub payload: PointPayload,
    /// Similarity score (cosine).
    pub score: f32,
}

/// A point returned by an unranked sample (no score).
#[derive(Debug, Clone)]
pub struct StoredPoint {
    /// Point id.
    pub id: String,
    /// Stored payload.
    pub payload: PointPayload,
}

// ============= Consultation Types =============

/// One cited source of a consultation answer.
///
/// `index` is the zero-based label the synthesizer saw as `[index]`, so a
/// citation `[i]` in the answer text refers to `sources[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Zero-based label assigned after re-sorting by descending score.
    pub index: usize,
    /// Title of the owning document.
    pub title: String,
    /// Publication year, if known.
    pub year: Option<i32>,
    /// Id of the owning document.
    pub document_id: String,
    /// Similarity score of the hit.
    pub score: f32,
    /// Section text truncated to 200 characters (with `...` when truncated).
    pub text_preview: String,
}

/// Result of one consultation query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationResult {
    /// Synthesized answer text, trimmed.
    pub response: String,
    /// Sources the answer may cite, ordered by label.
    pub sources: Vec<Source>,
}

/// A consultation entry handed to the external history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationRecord {
    /// Original query text.
    pub query: String,
    /// Synthesized answer.
    pub response: String,
    /// Cited sources.
    pub sources: Vec<Source>,
    /// Wall-clock time of the query in seconds.
    pub response_time: f64,
    /// When the consultation happened.
    pub created_at: DateTime<Utc>,
}

// ============= Quiz Types =============

/// One generated multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    /// Question text.
    pub question: String,
    /// Answer options; at least two.
    pub options: Vec<String>,
    /// Zero-based index of the correct option.
    pub correct: usize,
}

impl GeneratedQuestion {
    /// A question is usable when it offers at least two options and the
    /// correct index points at one of them.
    pub fn is_valid(&self) -> bool {
        self.options.len() >= 2 && self.correct < self.options.len()
    }
}

/// A generated quiz handed to the external test store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTest {
    /// Number of questions in the quiz.
    pub questions_count: usize,
    /// The questions themselves.
    pub questions: Vec<GeneratedQuestion>,
    /// When the quiz was generated.
    pub created_at: DateTime<Utc>,
}

// ============= Error Types =============

/// Error type covering every failure domain of the engine.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing credentials or invalid settings; raised at startup, never
    /// per-request.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Language-model call failed (network, auth, quota) or returned
    /// nothing usable.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding call failed or produced a vector of the wrong dimension.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector-store operation failed.
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Text extraction from an uploaded file failed, for any file type.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Caller supplied an unusable argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A processing task for this document id is already in flight.
    #[error("Document {0} is already being processed")]
    AlreadyProcessing(String),

    /// Anything that should not happen.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;
