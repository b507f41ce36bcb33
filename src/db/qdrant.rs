use async_trait::async_trait;
use qdrant_client::{
    qdrant::{
        vectors_config::Config as VectorsConfig, Condition, CountPointsBuilder,
        CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
        ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value,
        VectorParamsBuilder,
    },
    Qdrant,
};
use std::collections::HashMap;

use super::vectorstore::VectorStore;
use crate::types::{
    AppError, PointPayload, Result, ScoredPoint, SectionPoint, StoredPoint,
    UNKNOWN_DOCUMENT_TITLE,
};

/// Qdrant vector store backend.
///
/// Requires a running Qdrant instance. Collections use cosine distance and
/// the fixed point payload schema; bulk deletion is an equality filter on
/// the `document_id` payload field.
pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    /// Connect to a Qdrant server.
    pub fn new(url: &str, api_key: Option<String>) -> Result<Self> {
        let client = if let Some(key) = api_key {
            Qdrant::from_url(url)
                .api_key(key)
                .build()
                .map_err(|e| AppError::VectorStore(format!("Failed to create Qdrant client: {}", e)))?
        } else {
            Qdrant::from_url(url)
                .build()
                .map_err(|e| AppError::VectorStore(format!("Failed to create Qdrant client: {}", e)))?
        };

        Ok(Self { client })
    }

    async fn collection_dimensions(&self, name: &str) -> Result<Option<usize>> {
        let info = self
            .client
            .collection_info(name)
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to get collection info: {}", e)))?;

        Ok(info.result.and_then(|r| {
            r.config
                .and_then(|c| c.params)
                .and_then(|p| p.vectors_config)
                .and_then(|v| match v.config {
                    Some(VectorsConfig::Params(p)) => Some(p.size as usize),
                    _ => None,
                })
        }))
    }

    fn build_payload(payload: &PointPayload) -> HashMap<String, Value> {
        let mut map: HashMap<String, Value> = HashMap::new();
        map.insert("text".to_string(), payload.text.clone().into());
        map.insert("title".to_string(), payload.title.clone().into());
        if let Some(year) = payload.year {
            map.insert("year".to_string(), i64::from(year).into());
        }
        map.insert(
            "document_id".to_string(),
            payload.document_id.clone().into(),
        );
        map
    }

    fn parse_payload(payload: &HashMap<String, Value>) -> Option<PointPayload> {
        let text = payload.get("text")?.as_str()?.to_string();
        let document_id = payload.get("document_id")?.as_str()?.to_string();
        let title = payload
            .get("title")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| UNKNOWN_DOCUMENT_TITLE.to_string());
        let year = payload
            .get("year")
            .and_then(|v| v.as_integer())
            .map(|y| y as i32);

        Some(PointPayload {
            text,
            title,
            year,
            document_id,
        })
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    fn provider_name(&self) -> &'static str {
        "qdrant"
    }

    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to list collections: {}", e)))?;

        let exists = collections.collections.iter().any(|c| c.name == name);

        if exists {
            match self.collection_dimensions(name).await? {
                Some(existing) if existing != dimensions => {
                    return Err(AppError::Configuration(format!(
                        "Collection '{}' has dimension {}, configured embedder produces {}",
                        name, existing, dimensions
                    )));
                }
                _ => return Ok(()),
            }
        }

        tracing::info!(collection = name, dimensions, "Creating Qdrant collection");
        self.client
            .create_collection(CreateCollectionBuilder::new(name).vectors_config(
                VectorParamsBuilder::new(dimensions as u64, Distance::Cosine),
            ))
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to create collection: {}", e)))?;

        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<SectionPoint>) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }

        let qdrant_points: Vec<PointStruct> = points
            .into_iter()
            .map(|point| {
                let payload = Self::build_payload(&point.payload);
                PointStruct::new(point.id, point.vector, payload)
            })
            .collect();

        let count = qdrant_points.len();
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, qdrant_points).wait(true))
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to upsert points: {}", e)))?;

        Ok(count)
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let search_builder =
            SearchPointsBuilder::new(collection, embedding.to_vec(), limit as u64)
                .with_payload(true);

        let response = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to search: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|hit| {
                Some(ScoredPoint {
                    payload: Self::parse_payload(&hit.payload)?,
                    score: hit.score,
                })
            })
            .collect())
    }

    async fn delete_by_document(&self, collection: &str, document_id: &str) -> Result<()> {
        let filter = Filter::must([Condition::matches(
            "document_id",
            document_id.to_string(),
        )]);

        self.client
            .delete_points(
                DeletePointsBuilder::new(collection)
                    .points(filter)
                    .wait(true),
            )
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to delete points: {}", e)))?;

        Ok(())
    }

    async fn sample(&self, collection: &str, limit: usize) -> Result<Vec<StoredPoint>> {
        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(collection)
                    .limit(limit as u32)
                    .with_payload(true)
                    .with_vectors(false),
            )
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to scroll points: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(|point| {
                use qdrant_client::qdrant::point_id::PointIdOptions;

                let id = match point.id?.point_id_options? {
                    PointIdOptions::Num(num) => num.to_string(),
                    PointIdOptions::Uuid(uuid) => uuid,
                };
                Some(StoredPoint {
                    id,
                    payload: Self::parse_payload(&point.payload)?,
                })
            })
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(|e| AppError::VectorStore(format!("Failed to count points: {}", e)))?;

        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }
}
