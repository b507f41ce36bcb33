use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{AppError, Result, ScoredPoint, SectionPoint, StoredPoint};

// ============================================================================
// Vector Store Trait
// ============================================================================

/// Abstract trait for vector store operations.
///
/// All vectors in a collection share one fixed dimension and are compared
/// with cosine similarity. Points carry the payload schema from
/// [`crate::types::PointPayload`]; the `document_id` payload field is the
/// unit of bulk deletion.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the name of this vector store backend.
    fn provider_name(&self) -> &'static str;

    /// Create the collection if it does not exist yet.
    ///
    /// When the collection already exists its dimension must equal
    /// `dimensions`; a mismatch is a fatal configuration error, reported at
    /// startup rather than on the first degenerate search.
    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Upsert a batch of points. Returns the number of points written.
    async fn upsert(&self, collection: &str, points: Vec<SectionPoint>) -> Result<usize>;

    /// Similarity search, returning up to `limit` scored points.
    ///
    /// Callers must not rely on a strict ordering of the result; the
    /// retrieval engine re-sorts defensively.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>>;

    /// Delete every point whose payload `document_id` equals the given id.
    ///
    /// Deleting a document with no points is a no-op, which makes
    /// reindexing safe to retry.
    async fn delete_by_document(&self, collection: &str, document_id: &str) -> Result<()>;

    /// Return up to `limit` points without any ranking, for quiz sampling.
    async fn sample(&self, collection: &str, limit: usize) -> Result<Vec<StoredPoint>>;

    /// Count points in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;
}

// ============================================================================
// In-Memory Vector Store (for testing)
// ============================================================================

/// In-memory vector store.
///
/// Data is not persisted and is lost when the process exits. Uses cosine
/// similarity, like the production backend.
pub struct InMemoryVectorStore {
    collections: Arc<RwLock<HashMap<String, InMemoryCollection>>>,
}

struct InMemoryCollection {
    dimensions: usize,
    points: Vec<SectionPoint>,
}

impl InMemoryVectorStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write();
        if let Some(existing) = collections.get(name) {
            if existing.dimensions != dimensions {
                return Err(AppError::Configuration(format!(
                    "Collection '{}' has dimension {}, configured embedder produces {}",
                    name, existing.dimensions, dimensions
                )));
            }
            return Ok(());
        }
        collections.insert(
            name.to_string(),
            InMemoryCollection {
                dimensions,
                points: Vec::new(),
            },
        );
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<SectionPoint>) -> Result<usize> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::NotFound(format!("Collection '{}' not found", collection)))?;

        for point in &points {
            if point.vector.len() != col.dimensions {
                return Err(AppError::VectorStore(format!(
                    "Point '{}' has dimension {}, collection expects {}",
                    point.id,
                    point.vector.len(),
                    col.dimensions
                )));
            }
        }

        let count = points.len();
        for point in points {
            col.points.retain(|p| p.id != point.id);
            col.points.push(point);
        }

        Ok(count)
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| AppError::NotFound(format!("Collection '{}' not found", collection)))?;

        let mut results: Vec<ScoredPoint> = col
            .points
            .iter()
            .map(|point| ScoredPoint {
                payload: point.payload.clone(),
                score: Self::cosine_similarity(embedding, &point.vector),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn delete_by_document(&self, collection: &str, document_id: &str) -> Result<()> {
        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::NotFound(format!("Collection '{}' not found", collection)))?;

        col.points.retain(|p| p.payload.document_id != document_id);
        Ok(())
    }

    async fn sample(&self, collection: &str, limit: usize) -> Result<Vec<StoredPoint>> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| AppError::NotFound(format!("Collection '{}' not found", collection)))?;

        Ok(col
            .points
            .iter()
            .take(limit)
            .map(|point| StoredPoint {
                id: point.id.clone(),
                payload: point.payload.clone(),
            })
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| AppError::NotFound(format!("Collection '{}' not found", collection)))?;
        Ok(col.points.len())
    }
}

// ============================================================================
// Tests
// ============================================================================
