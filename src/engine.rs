//! Engine context.
//!
//! One [`Engine`] value owns the configuration and the three external
//! clients (chat model, embedder, vector store) and hands out the services
//! built on top of them. Everything is passed explicitly; there is no global
//! state, so tests and embedding applications can build as many independent
//! engines as they want.

use std::sync::Arc;

use crate::consult::{ConsultationEngine, ConsultationService};
use crate::db::{QdrantStore, VectorStore};
use crate::embedding::{Embedder, OpenAiEmbedder};
use crate::ingest::{indexer::SectionIndexer, DocumentProcessor};
use crate::llm::{LlmClient, OpenAiClient};
use crate::quiz::{QuizGenerator, QuizService};
use crate::scheduler::IngestScheduler;
use crate::stores::{DocumentStore, HistoryStore, TestStore};
use crate::utils::Config;
use crate::types::Result;

/// Shared context for every service of the engine.
pub struct Engine {
    config: Config,
    llm: Arc<dyn LlmClient>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Engine {
    /// Build an engine with production clients from the configuration.
    pub fn connect(config: Config) -> Result<Self> {
        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(
            config.llm.api_key.clone(),
            config.llm.api_base.clone(),
            config.llm.model.clone(),
        ));
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(
            config.embedding.api_key.clone(),
            config.embedding.api_base.clone(),
            config.embedding.model.clone(),
            config.embedding.dimension,
        ));
        let store: Arc<dyn VectorStore> = Arc::new(QdrantStore::new(
            &config.vector.url,
            config.vector.api_key.clone(),
        )?);

        tracing::info!(
            llm = llm.model_name(),
            embedder = embedder.name(),
            store = store.provider_name(),
            "Engine connected"
        );

        Ok(Self {
            config,
            llm,
            embedder,
            store,
        })
    }

    /// Build an engine from explicit parts. This is the seam tests and
    /// embedding applications use to swap in their own clients.
    pub fn with_parts(
        config: Config,
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            config,
            llm,
            embedder,
            store,
        }
    }

    /// Create the collection if needed and verify its dimension matches the
    /// configured embedder. Call once at startup.
    pub async fn ensure_ready(&self) -> Result<()> {
        self.store
            .ensure_collection(
                &self.config.vector.collection,
                self.config.embedding.dimension,
            )
            .await
    }

    /// Engine configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a document processor.
    pub fn processor(&self) -> DocumentProcessor {
        let indexer = SectionIndexer::new(
            self.embedder.clone(),
            self.store.clone(),
            self.config.vector.collection.clone(),
        );
        DocumentProcessor::new(
            self.llm.clone(),
            indexer,
            self.config.ingest.chunk_concurrency,
        )
    }

    /// Start a background ingestion scheduler over the given document store.
    pub fn scheduler(&self, documents: Arc<dyn DocumentStore>) -> IngestScheduler {
        IngestScheduler::start(
            self.config.ingest.workers,
            Arc::new(self.processor()),
            documents,
        )
    }

    /// Build a consultation service recording into the given history store.
    pub fn consultation(&self, history: Arc<dyn HistoryStore>) -> ConsultationService {
        let engine = ConsultationEngine::new(
            self.llm.clone(),
            self.embedder.clone(),
            self.store.clone(),
            self.config.vector.collection.clone(),
        );
        ConsultationService::new(engine, history)
    }

    /// Build a quiz service recording into the given test store.
    pub fn quiz(&self, tests: Arc<dyn TestStore>) -> QuizService {
        let generator = QuizGenerator::new(
            self.llm.clone(),
            self.store.clone(),
            self.config.vector.collection.clone(),
        );
        QuizService::new(generator, tests)
    }
}
