//! Document ingestion pipeline.
//!
//! Processing a document runs in four stages: word-window chunking
//! ([`splitter`]), model-driven boundary analysis per chunk ([`boundary`]),
//! assembly of per-chunk bodies into document-wide sections ([`assembler`]),
//! and embedding plus upsert into the vector store ([`indexer`]).
//! [`DocumentProcessor`] drives the stages; chunk analysis calls run
//! concurrently but their results are folded back strictly in document
//! order, so segmentation never depends on response timing.

pub mod assembler;
pub mod boundary;
pub mod indexer;
pub mod splitter;

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::llm::{ChatMessage, LlmClient, SECTION_ANALYSIS_PROMPT};
use crate::types::{AppError, DocumentMeta, Result};

use assembler::SectionAssembler;
use boundary::MetaYear;
use indexer::SectionIndexer;

/// Outcome of processing one document.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    /// Number of section points written to the vector store.
    pub sections_indexed: usize,
    /// Title and year extracted from the document's leading pages.
    pub meta: DocumentMeta,
}

/// Runs the full ingestion pipeline for one document at a time.
pub struct DocumentProcessor {
    llm: Arc<dyn LlmClient>,
    indexer: SectionIndexer,
    chunk_concurrency: usize,
}

impl DocumentProcessor {
    /// Create a processor.
    pub fn new(llm: Arc<dyn LlmClient>, indexer: SectionIndexer, chunk_concurrency: usize) -> Self {
        Self {
            llm,
            indexer,
            chunk_concurrency: chunk_concurrency.max(1),
        }
    }

    /// Segment, embed and index a document's text.
    ///
    /// An empty or whitespace-only document indexes zero sections without
    /// touching the model or the store.
    pub async fn process(&self, document_id: &str, text: &str) -> Result<ProcessedDocument> {
        let words = splitter::words(text);
        if words.is_empty() {
            tracing::warn!(document_id, "Document contains no text, nothing to index");
            return Ok(ProcessedDocument {
                sections_indexed: 0,
                meta: DocumentMeta::default(),
            });
        }

        let meta = self.extract_meta(&splitter::meta_window(&words)).await;
        tracing::info!(document_id, title = %meta.title, year = ?meta.year, "Extracted document metadata");

        let chunk_texts: Vec<String> = splitter::chunks(&words).collect();
        let chunk_count = chunk_texts.len();

        let analyzed: Vec<(String, Vec<String>)> = stream::iter(chunk_texts)
            .map(|chunk| async move {
                let bodies = self.analyze_chunk(&chunk).await?;
                Ok::<_, AppError>((chunk, bodies))
            })
            .buffered(self.chunk_concurrency)
            .try_collect()
            .await?;

        let mut assembler = SectionAssembler::new();
        for (chunk, bodies) in analyzed {
            assembler.fold(&chunk, bodies);
        }

        let sections = assembler.finish(&meta);
        tracing::info!(
            document_id,
            chunks = chunk_count,
            sections = sections.len(),
            "Segmentation complete"
        );

        let sections_indexed = self.indexer.index(document_id, &sections).await?;

        Ok(ProcessedDocument {
            sections_indexed,
            meta,
        })
    }

    /// Drop a document's existing points and process it from scratch.
    pub async fn reindex(&self, document_id: &str, text: &str) -> Result<ProcessedDocument> {
        self.indexer.remove(document_id).await?;
        self.process(document_id, text).await
    }

    /// Remove a document's points without reprocessing.
    pub async fn remove(&self, document_id: &str) -> Result<()> {
        self.indexer.remove(document_id).await
    }

    /// Ask the model for section boundaries inside one chunk and decode the
    /// answer into section bodies.
    async fn analyze_chunk(&self, chunk: &str) -> Result<Vec<String>> {
        let messages = [
            ChatMessage::system(SECTION_ANALYSIS_PROMPT),
            ChatMessage::user(chunk),
        ];
        let response = self.llm.chat(&messages).await?;
        Ok(boundary::parse_sections(&response, chunk))
    }

    /// Ask the model for the document title and year from its leading text
    /// window. Degrades to the unknown-document defaults when the model
    /// reports nothing usable or the call fails.
    async fn extract_meta(&self, window: &str) -> DocumentMeta {
        let messages = [
            ChatMessage::system(SECTION_ANALYSIS_PROMPT),
            ChatMessage::user(window),
        ];

        let response = match self.llm.chat(&messages).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Metadata extraction failed, using defaults");
                return DocumentMeta::default();
            }
        };

        let Some(parsed) = boundary::parse_meta(&response) else {
            return DocumentMeta::default();
        };

        let mut meta = DocumentMeta::default();
        if let Some(title) = parsed.title {
            if !title.is_empty() {
                meta.title = title;
            }
        }
        meta.year = match parsed.year {
            Some(MetaYear::Year(year)) => Some(year),
            Some(MetaYear::Text(text)) => {
                tracing::warn!(year = %text, "Non-numeric year in metadata, dropping");
                None
            }
            None => None,
        };
        meta
    }
}
