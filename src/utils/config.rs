use serde::Deserialize;
use std::env;

use crate::types::{AppError, Result};

/// Engine configuration, loaded once at process start.
///
/// Everything except the LLM API key has a sensible default, so a local
/// setup only needs `LLM_API_KEY` in the environment or a `.env` file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// LLM endpoint settings.
    pub llm: LlmConfig,
    /// Embedding endpoint settings.
    pub embedding: EmbeddingConfig,
    /// Vector store settings.
    pub vector: VectorConfig,
    /// Ingestion settings.
    pub ingest: IngestConfig,
}

/// OpenAI-compatible chat endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API key; required.
    pub api_key: String,
    /// Base URL of the chat endpoint.
    pub api_base: String,
    /// Model identifier.
    pub model: String,
}

/// OpenAI-compatible embeddings endpoint settings.
///
/// The dimension is pinned here and enforced against both the collection
/// and every vector the endpoint returns; a mismatch is a configuration
/// error, never something to paper over at request time.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// API key; falls back to the LLM key when unset.
    pub api_key: String,
    /// Base URL of the embeddings endpoint.
    pub api_base: String,
    /// Embedding model identifier.
    pub model: String,
    /// Fixed output dimension of the embedding model.
    pub dimension: usize,
}

/// Qdrant connection and collection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorConfig {
    /// Qdrant server URL.
    pub url: String,
    /// Optional Qdrant API key.
    pub api_key: Option<String>,
    /// Collection name. Existing corpora depend on the default; change it
    /// only together with a full reindex.
    pub collection: String,
}

/// Ingestion tuning knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// How many chunk boundary-analysis calls may run concurrently per
    /// document. Results are folded back in document order regardless.
    pub chunk_concurrency: usize,
    /// Number of background ingestion workers.
    pub workers: usize,
}

impl Config {
    /// Load configuration from the environment (and `.env`, if present).
    ///
    /// Fails fast when `LLM_API_KEY` is missing; everything else defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let llm_api_key = env::var("LLM_API_KEY").map_err(|_| {
            AppError::Configuration(
                "LLM_API_KEY not set. Add it to the environment or a .env file.".to_string(),
            )
        })?;

        let embedding_api_key =
            env::var("EMBEDDING_API_KEY").unwrap_or_else(|_| llm_api_key.clone());

        Ok(Config {
            llm: LlmConfig {
                api_key: llm_api_key,
                api_base: env::var("LLM_API_BASE")
                    .unwrap_or_else(|_| "https://api.deepseek.com/v1".to_string()),
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "deepseek-chat".to_string()),
            },
            embedding: EmbeddingConfig {
                api_key: embedding_api_key,
                api_base: env::var("EMBEDDING_API_BASE")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
                dimension: env::var("EMBEDDING_DIMENSION")
                    .unwrap_or_else(|_| "1536".to_string())
                    .parse()
                    .map_err(|e| {
                        AppError::Configuration(format!("Invalid EMBEDDING_DIMENSION: {}", e))
                    })?,
            },
            vector: VectorConfig {
                url: env::var("QDRANT_URL")
                    .unwrap_or_else(|_| "http://localhost:6334".to_string()),
                api_key: env::var("QDRANT_API_KEY").ok(),
                collection: env::var("QDRANT_COLLECTION")
                    .unwrap_or_else(|_| "rag_collection".to_string()),
            },
            ingest: IngestConfig {
                chunk_concurrency: env::var("CHUNK_CONCURRENCY")
                    .unwrap_or_else(|_| "4".to_string())
                    .parse()
                    .map_err(|e| {
                        AppError::Configuration(format!("Invalid CHUNK_CONCURRENCY: {}", e))
                    })?,
                workers: env::var("INGEST_WORKERS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .map_err(|e| {
                        AppError::Configuration(format!("Invalid INGEST_WORKERS: {}", e))
                    })?,
            },
        })
    }
}
