//! Text embeddings.
//!
//! One embedding function serves the whole corpus: queries and sections go
//! through the same model with the same fixed output dimension for the
//! lifetime of a collection. The dimension is part of the configuration and
//! every returned vector is checked against it; a mismatch means the
//! configuration no longer matches the collection and must not be tolerated
//! silently.

use async_openai::{
    config::OpenAIConfig,
    types::embeddings::{CreateEmbeddingRequestArgs, EmbeddingInput},
    Client,
};
use async_trait::async_trait;

use crate::types::{AppError, Result};

/// Embedding provider trait.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts. Default implementation calls [`Embedder::embed`]
    /// sequentially; providers with a batch API should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Fixed output dimension.
    fn dimension(&self) -> usize;

    /// Model identifier.
    fn name(&self) -> &str;
}

/// Embedder backed by an OpenAI-compatible embeddings endpoint.
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    /// Create an embedder against the given endpoint.
    pub fn new(api_key: String, api_base: String, model: String, dimension: usize) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model,
            dimension,
        }
    }

    async fn request(&self, input: EmbeddingInput, expected: usize) -> Result<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(input)
            .build()
            .map_err(|e| AppError::Embedding(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| AppError::Embedding(format!("Embeddings API error: {}", e)))?;

        if response.data.len() != expected {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                expected,
                response.data.len()
            )));
        }

        // The API documents response order as matching the input, but the
        // index field is authoritative.
        let mut data = response.data;
        data.sort_by_key(|e| e.index);

        let mut vectors = Vec::with_capacity(data.len());
        for item in data {
            if item.embedding.len() != self.dimension {
                return Err(AppError::Embedding(format!(
                    "Model '{}' returned a {}-dimensional vector, configured dimension is {}",
                    self.model,
                    item.embedding.len(),
                    self.dimension
                )));
            }
            vectors.push(item.embedding);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self
            .request(EmbeddingInput::String(text.to_string()), 1)
            .await?;
        Ok(vectors.remove(0))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(EmbeddingInput::StringArray(texts.to_vec()), texts.len())
            .await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}
