//! External persistence seams.
//!
//! Document records, consultation history and generated quizzes live in
//! whatever application database embeds the engine; the engine only needs the
//! narrow operations captured by these traits. The in-memory implementations
//! back the tests and the standalone CLI, where nothing outlives the process.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::types::{
    AppError, ConsultationRecord, DocumentMeta, DocumentStatus, GeneratedTest, Result,
};

// ============================================================================
// Traits
// ============================================================================

/// Access to document records owned by the embedding application.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the extracted text of a document.
    async fn fetch_text(&self, document_id: &str) -> Result<String>;

    /// Record a status transition, with the error message for
    /// [`DocumentStatus::Error`].
    async fn set_status(
        &self,
        document_id: &str,
        status: DocumentStatus,
        error: Option<String>,
    ) -> Result<()>;

    /// Write back the title and year extracted during processing.
    async fn set_meta(&self, document_id: &str, meta: &DocumentMeta) -> Result<()>;
}

/// Sink for finished consultations.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist one consultation record.
    async fn record(&self, record: ConsultationRecord) -> Result<()>;
}

/// Sink for generated quizzes.
#[async_trait]
pub trait TestStore: Send + Sync {
    /// Persist one generated quiz.
    async fn record(&self, test: GeneratedTest) -> Result<()>;
}

// ============================================================================
// In-Memory Implementations
// ============================================================================

#[derive(Debug, Clone)]
struct DocumentRecord {
    text: String,
    status: DocumentStatus,
    error: Option<String>,
    meta: Option<DocumentMeta>,
}

/// In-memory document store.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    records: Mutex<HashMap<String, DocumentRecord>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document with its extracted text, in `Pending` status.
    pub fn insert(&self, document_id: &str, text: &str) {
        self.records.lock().insert(
            document_id.to_string(),
            DocumentRecord {
                text: text.to_string(),
                status: DocumentStatus::Pending,
                error: None,
                meta: None,
            },
        );
    }

    /// Current status of a document, if registered.
    pub fn status(&self, document_id: &str) -> Option<DocumentStatus> {
        self.records.lock().get(document_id).map(|r| r.status)
    }

    /// Last recorded error of a document.
    pub fn error(&self, document_id: &str) -> Option<String> {
        self.records
            .lock()
            .get(document_id)
            .and_then(|r| r.error.clone())
    }

    /// Extracted metadata of a document, once processing wrote it back.
    pub fn meta(&self, document_id: &str) -> Option<DocumentMeta> {
        self.records
            .lock()
            .get(document_id)
            .and_then(|r| r.meta.clone())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn fetch_text(&self, document_id: &str) -> Result<String> {
        self.records
            .lock()
            .get(document_id)
            .map(|r| r.text.clone())
            .ok_or_else(|| AppError::NotFound(format!("Document '{}' not found", document_id)))
    }

    async fn set_status(
        &self,
        document_id: &str,
        status: DocumentStatus,
        error: Option<String>,
    ) -> Result<()> {
        let mut records = self.records.lock();
        let record = records
            .get_mut(document_id)
            .ok_or_else(|| AppError::NotFound(format!("Document '{}' not found", document_id)))?;
        if !record.status.can_transition(status) {
            tracing::warn!(document_id, from = ?record.status, to = ?status, "Unexpected status transition");
        }
        record.status = status;
        record.error = error;
        Ok(())
    }

    async fn set_meta(&self, document_id: &str, meta: &DocumentMeta) -> Result<()> {
        let mut records = self.records.lock();
        let record = records
            .get_mut(document_id)
            .ok_or_else(|| AppError::NotFound(format!("Document '{}' not found", document_id)))?;
        record.meta = Some(meta.clone());
        Ok(())
    }
}

/// In-memory consultation history.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    records: Mutex<Vec<ConsultationRecord>>,
}

impl InMemoryHistoryStore {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded consultations, oldest first.
    pub fn entries(&self) -> Vec<ConsultationRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn record(&self, record: ConsultationRecord) -> Result<()> {
        self.records.lock().push(record);
        Ok(())
    }
}

/// In-memory quiz store.
#[derive(Default)]
pub struct InMemoryTestStore {
    tests: Mutex<Vec<GeneratedTest>>,
}

impl InMemoryTestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded quizzes, oldest first.
    pub fn entries(&self) -> Vec<GeneratedTest> {
        self.tests.lock().clone()
    }
}

#[async_trait]
impl TestStore for InMemoryTestStore {
    async fn record(&self, test: GeneratedTest) -> Result<()> {
        self.tests.lock().push(test);
        Ok(())
    }
}
