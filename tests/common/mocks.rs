//! Hand-rolled mocks for the external seams: chat model, embedder, and
//! configuration. The vector store side uses the real in-memory backend.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use norma::embedding::Embedder;
use norma::llm::{ChatMessage, LlmClient};
use norma::types::{AppError, Result};
use norma::utils::config::{Config, EmbeddingConfig, IngestConfig, LlmConfig, VectorConfig};

/// Collection name used by the test configuration.
pub const TEST_COLLECTION: &str = "test_collection";

/// Chat mock that replays a fixed script of responses in call order and
/// records every request it saw.
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlm {
    /// Build a mock from the response script.
    pub fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every request the mock received, in call order.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.lock().push(messages.to_vec());
        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| AppError::Llm("Scripted responses exhausted".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Vocabulary the keyword embedder projects onto.
const KEYWORDS: [&str; 4] = ["инструктаж", "огнетушитель", "высота", "шум"];

/// Deterministic embedder: one dimension per vocabulary keyword (occurrence
/// count) plus a constant baseline so no vector is ever zero. Texts sharing
/// a keyword land close under cosine similarity, which is all retrieval
/// tests need.
pub struct KeywordEmbedder;

/// Output dimension of [`KeywordEmbedder`].
pub const KEYWORD_DIMENSION: usize = KEYWORDS.len() + 1;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut vector = Vec::with_capacity(KEYWORD_DIMENSION);
        for keyword in KEYWORDS {
            vector.push(lower.matches(keyword).count() as f32);
        }
        vector.push(0.1);
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        KEYWORD_DIMENSION
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Configuration for engines built from mock parts. The endpoint fields are
/// never dialed.
pub fn test_config() -> Config {
    Config {
        llm: LlmConfig {
            api_key: "test-key".to_string(),
            api_base: "http://localhost:9".to_string(),
            model: "scripted".to_string(),
        },
        embedding: EmbeddingConfig {
            api_key: "test-key".to_string(),
            api_base: "http://localhost:9".to_string(),
            model: "keyword".to_string(),
            dimension: KEYWORD_DIMENSION,
        },
        vector: VectorConfig {
            url: "http://localhost:9".to_string(),
            api_key: None,
            collection: TEST_COLLECTION.to_string(),
        },
        ingest: IngestConfig {
            chunk_concurrency: 1,
            workers: 1,
        },
    }
}
