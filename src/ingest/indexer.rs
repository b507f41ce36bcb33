//! Section indexing into the vector store.

use std::sync::Arc;

use crate::db::VectorStore;
use crate::embedding::Embedder;
use crate::types::{PointPayload, Result, Section, SectionPoint};

/// Turns assembled sections into embedding points and writes them.
///
/// Point ids are fresh uuids, so indexing never overwrites points of other
/// documents; removing or replacing a document's points goes through the
/// `document_id` payload field instead.
pub struct SectionIndexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl SectionIndexer {
    /// Create an indexer writing into the given collection.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        collection: String,
    ) -> Self {
        Self {
            embedder,
            store,
            collection,
        }
    }

    /// Embed and upsert sections of one document. Returns the number of
    /// points written; an empty section list writes nothing.
    pub async fn index(&self, document_id: &str, sections: &[Section]) -> Result<usize> {
        if sections.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = sections.iter().map(|s| s.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let points: Vec<SectionPoint> = sections
            .iter()
            .zip(vectors)
            .map(|(section, vector)| SectionPoint {
                id: uuid::Uuid::new_v4().simple().to_string(),
                vector,
                payload: PointPayload {
                    text: section.text.clone(),
                    title: section.meta.title.clone(),
                    year: section.meta.year,
                    document_id: document_id.to_string(),
                },
            })
            .collect();

        let written = self.store.upsert(&self.collection, points).await?;
        tracing::debug!(document_id, points = written, "Indexed sections");
        Ok(written)
    }

    /// Remove every point belonging to a document.
    pub async fn remove(&self, document_id: &str) -> Result<()> {
        self.store
            .delete_by_document(&self.collection, document_id)
            .await
    }
}
