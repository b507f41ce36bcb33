//! Retrieval and answer synthesis.
//!
//! A consultation embeds the question, retrieves the closest section points,
//! and asks the chat model to answer strictly from those sections. Each
//! retrieved section is presented to the model as its own system message
//! labelled `[i]`, so citations in the answer line up with the returned
//! source list by index.

use std::sync::Arc;
use std::time::Instant;

use crate::db::VectorStore;
use crate::embedding::Embedder;
use crate::llm::{ChatMessage, LlmClient, CONSULTATION_PROMPT};
use crate::stores::HistoryStore;
use crate::types::{
    AppError, ConsultationRecord, ConsultationResult, Result, ScoredPoint, Source,
};

/// Sections retrieved per question unless the caller asks otherwise.
pub const DEFAULT_SEARCH_LIMIT: usize = 15;

/// Characters of section text kept in a source preview.
const PREVIEW_CHARS: usize = 200;

/// Stateless retrieval-and-synthesis core.
pub struct ConsultationEngine {
    llm: Arc<dyn LlmClient>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl ConsultationEngine {
    /// Create a consultation engine over the given collection.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        collection: String,
    ) -> Self {
        Self {
            llm,
            embedder,
            store,
            collection,
        }
    }

    /// Answer a question from the indexed corpus.
    ///
    /// An empty corpus or a question with no close sections still goes to
    /// the model with zero source messages; the system instruction makes it
    /// answer that it does not know.
    pub async fn consult(&self, question: &str, limit: usize) -> Result<ConsultationResult> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidInput("Question is empty".to_string()));
        }

        let embedding = self.embedder.embed(question).await?;
        let hits = self
            .store
            .search(&self.collection, &embedding, limit)
            .await?;
        let hits = rank(hits);

        tracing::debug!(question, hits = hits.len(), "Retrieved sections");

        let mut messages = Vec::with_capacity(hits.len() + 2);
        messages.push(ChatMessage::system(CONSULTATION_PROMPT));
        for (index, hit) in hits.iter().enumerate() {
            messages.push(ChatMessage::system(format!(
                "[{}] {}",
                index, hit.payload.text
            )));
        }
        messages.push(ChatMessage::user(question));

        let response = self.llm.chat(&messages).await?;

        let sources = hits
            .into_iter()
            .enumerate()
            .map(|(index, hit)| Source {
                index,
                title: hit.payload.title,
                year: hit.payload.year,
                document_id: hit.payload.document_id,
                score: hit.score,
                text_preview: preview(&hit.payload.text),
            })
            .collect();

        Ok(ConsultationResult { response, sources })
    }
}

/// Sort hits by descending score. Backends usually return them ordered
/// already, but the labels shown to the model must not depend on that.
fn rank(mut hits: Vec<ScoredPoint>) -> Vec<ScoredPoint> {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits
}

/// Truncate section text to a character-bounded preview.
fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", truncated)
}

/// Consultation front door: runs the engine, times the call and records the
/// result in the history store.
pub struct ConsultationService {
    engine: ConsultationEngine,
    history: Arc<dyn HistoryStore>,
}

impl ConsultationService {
    /// Create a service.
    pub fn new(engine: ConsultationEngine, history: Arc<dyn HistoryStore>) -> Self {
        Self { engine, history }
    }

    /// Answer a question and persist the consultation record.
    pub async fn ask(&self, question: &str, limit: usize) -> Result<ConsultationResult> {
        let started = Instant::now();
        let result = self.engine.consult(question, limit).await?;
        let response_time = started.elapsed().as_secs_f64();

        self.history
            .record(ConsultationRecord {
                query: question.trim().to_string(),
                response: result.response.clone(),
                sources: result.sources.clone(),
                response_time,
                created_at: chrono::Utc::now(),
            })
            .await?;

        tracing::info!(
            question,
            sources = result.sources.len(),
            response_time,
            "Consultation complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryVectorStore;
    use crate::stores::InMemoryHistoryStore;
    use crate::types::{PointPayload, SectionPoint};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    fn scored(text: &str, score: f32) -> ScoredPoint {
        ScoredPoint {
            payload: PointPayload {
                text: text.to_string(),
                title: "Документ".to_string(),
                year: Some(2020),
                document_id: "doc1".to_string(),
            },
            score,
        }
    }

    #[test]
    fn test_rank_sorts_by_descending_score() {
        let hits = rank(vec![scored("a", 0.9), scored("b", 0.3), scored("c", 0.7)]);

        assert_eq!(hits[0].score, 0.9);
        assert_eq!(hits[1].score, 0.7);
        assert_eq!(hits[2].score, 0.3);
    }

    #[test]
    fn test_preview_truncates_by_characters() {
        let short = "короткий текст";
        assert_eq!(preview(short), short);

        let long = "ы".repeat(PREVIEW_CHARS + 50);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));

        let exact = "я".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);
    }

    struct RecordingLlm {
        seen: Mutex<Vec<ChatMessage>>,
        answer: String,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
            *self.seen.lock() = messages.to_vec();
            Ok(self.answer.clone())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    struct AxisEmbedder;

    #[async_trait]
    impl Embedder for AxisEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            // Deterministic unit vector pinned to one axis by text length.
            let mut v = vec![0.0; 4];
            v[text.chars().count() % 4] = 1.0;
            Ok(v)
        }

        fn dimension(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "axis"
        }
    }

    fn point(id: &str, text: &str, vector: Vec<f32>) -> SectionPoint {
        SectionPoint {
            id: id.to_string(),
            vector,
            payload: PointPayload {
                text: text.to_string(),
                title: "Правила".to_string(),
                year: None,
                document_id: "doc1".to_string(),
            },
        }
    }

    async fn engine_with(
        answer: &str,
        points: Vec<SectionPoint>,
    ) -> (ConsultationEngine, Arc<RecordingLlm>) {
        let store = Arc::new(InMemoryVectorStore::new());
        store.ensure_collection("test", 4).await.unwrap();
        store.upsert("test", points).await.unwrap();

        let llm = Arc::new(RecordingLlm {
            seen: Mutex::new(Vec::new()),
            answer: answer.to_string(),
        });
        let engine = ConsultationEngine::new(
            llm.clone(),
            Arc::new(AxisEmbedder),
            store,
            "test".to_string(),
        );
        (engine, llm)
    }

    #[tokio::test]
    async fn test_message_layout_and_source_labels() {
        // "вопрос" is 6 characters, so the query lands on axis 2.
        let points = vec![
            point("p1", "релевантный раздел", vec![0.0, 0.0, 1.0, 0.0]),
            point("p2", "посторонний раздел", vec![1.0, 0.0, 0.0, 0.0]),
        ];
        let (engine, llm) = engine_with("Ответ [0]", points).await;

        let result = engine.consult("вопрос", 10).await.unwrap();

        let seen = llm.seen.lock().clone();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0].content, CONSULTATION_PROMPT);
        assert_eq!(seen[1].content, "[0] релевантный раздел");
        assert_eq!(seen[2].content, "[1] посторонний раздел");
        assert_eq!(seen[3].content, "вопрос");

        assert_eq!(result.response, "Ответ [0]");
        assert_eq!(result.sources.len(), 2);
        assert_eq!(result.sources[0].index, 0);
        assert!(result.sources[0].text_preview.starts_with("релевантный"));
        assert!(result.sources[0].score > result.sources[1].score);
    }

    #[tokio::test]
    async fn test_empty_corpus_still_asks_the_model() {
        let (engine, llm) = engine_with("Не знаю", Vec::new()).await;

        let result = engine.consult("вопрос", 10).await.unwrap();

        let seen = llm.seen.lock().clone();
        assert_eq!(seen.len(), 2);
        assert!(result.sources.is_empty());
        assert_eq!(result.response, "Не знаю");
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let (engine, _llm) = engine_with("x", Vec::new()).await;

        let result = engine.consult("   ", 10).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_service_records_history() {
        let (engine, _llm) = engine_with("Ответ", Vec::new()).await;
        let history = Arc::new(InMemoryHistoryStore::new());
        let service = ConsultationService::new(engine, history.clone());

        service.ask("  вопрос  ", 5).await.unwrap();

        let entries = history.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "вопрос");
        assert_eq!(entries[0].response, "Ответ");
        assert!(entries[0].response_time >= 0.0);
    }
}
