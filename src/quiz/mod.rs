//! Quiz generation from the indexed corpus.
//!
//! Quiz questions are grounded the same way consultations are: sampled
//! section texts go to the model as labelled system messages and the model
//! answers with a JSON array of question objects. Model JSON is treated as
//! hostile input: fenced output is unwrapped, surrounding prose is cut away,
//! and structurally broken questions are dropped one by one rather than
//! failing the whole quiz.

use std::sync::Arc;

use crate::db::VectorStore;
use crate::llm::{strip_code_fence, ChatMessage, LlmClient, QUIZ_GENERATION_PROMPT};
use crate::stores::TestStore;
use crate::types::{AppError, GeneratedQuestion, GeneratedTest, Result};

/// Questions per quiz unless the caller asks otherwise.
pub const DEFAULT_QUESTION_COUNT: usize = 10;

/// Hard cap on questions per quiz; requests beyond it are clamped.
pub const MAX_QUESTION_COUNT: usize = 20;

/// Generates multiple-choice questions from sampled sections.
pub struct QuizGenerator {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl QuizGenerator {
    /// Create a generator over the given collection.
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn VectorStore>, collection: String) -> Self {
        Self {
            llm,
            store,
            collection,
        }
    }

    /// Generate up to `count` questions (clamped to `1..=20`).
    ///
    /// Fails with [`AppError::InvalidInput`] when the corpus holds no
    /// sections to ask about, and with [`AppError::Llm`] when the model
    /// produced no usable question at all.
    pub async fn generate(&self, count: usize) -> Result<Vec<GeneratedQuestion>> {
        let count = count.clamp(1, MAX_QUESTION_COUNT);

        let sections = self.store.sample(&self.collection, count).await?;
        if sections.is_empty() {
            return Err(AppError::InvalidInput(
                "No indexed documents to generate questions from".to_string(),
            ));
        }

        let mut messages = Vec::with_capacity(sections.len() + 2);
        messages.push(ChatMessage::system(QUIZ_GENERATION_PROMPT));
        for (index, section) in sections.iter().enumerate() {
            messages.push(ChatMessage::system(format!(
                "[{}] {}",
                index, section.payload.text
            )));
        }
        messages.push(ChatMessage::user(format!(
            "Составь {} вопросов по предоставленным фрагментам.",
            count
        )));

        let response = self.llm.chat(&messages).await?;
        let parsed = parse_questions(&response)?;

        let mut questions = Vec::with_capacity(parsed.len());
        for question in parsed {
            if question.is_valid() {
                questions.push(question);
            } else {
                tracing::warn!(question = %question.question, "Dropping malformed question");
            }
        }

        if questions.is_empty() {
            return Err(AppError::Llm(
                "Model produced no valid questions".to_string(),
            ));
        }

        questions.truncate(count);
        Ok(questions)
    }
}

/// Decode the model's question array, tolerating a code fence and
/// surrounding prose.
fn parse_questions(response: &str) -> Result<Vec<GeneratedQuestion>> {
    let content = strip_code_fence(response);

    if let Ok(questions) = serde_json::from_str::<Vec<GeneratedQuestion>>(content) {
        return Ok(questions);
    }

    // Second try: cut away anything outside the outermost brackets.
    let start = content.find('[');
    let end = content.rfind(']');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            return serde_json::from_str(&content[start..=end]).map_err(|e| {
                AppError::Llm(format!("Model returned malformed question JSON: {}", e))
            });
        }
    }

    Err(AppError::Llm(
        "Model response contains no question array".to_string(),
    ))
}

/// Quiz front door: runs the generator and persists the result.
pub struct QuizService {
    generator: QuizGenerator,
    tests: Arc<dyn TestStore>,
}

impl QuizService {
    /// Create a service.
    pub fn new(generator: QuizGenerator, tests: Arc<dyn TestStore>) -> Self {
        Self { generator, tests }
    }

    /// Generate a quiz and persist it.
    pub async fn generate(&self, count: usize) -> Result<GeneratedTest> {
        let questions = self.generator.generate(count).await?;
        let test = GeneratedTest {
            questions_count: questions.len(),
            questions,
            created_at: chrono::Utc::now(),
        };

        self.tests.record(test.clone()).await?;
        tracing::info!(questions = test.questions_count, "Quiz generated");
        Ok(test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryVectorStore;
    use crate::stores::InMemoryTestStore;
    use crate::types::{PointPayload, SectionPoint};
    use async_trait::async_trait;

    const GOOD_JSON: &str = r#"[
        {"question": "Кто проводит инструктаж?", "options": ["Работодатель", "Работник"], "correct": 0},
        {"question": "Как часто?", "options": ["Раз в год", "Раз в месяц", "Никогда"], "correct": 0}
    ]"#;

    struct FixedLlm(String);

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn chat(&self, _messages: &[ChatMessage]) -> Result<String> {
            Ok(self.0.clone())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    async fn generator_with(answer: &str, indexed: usize) -> QuizGenerator {
        let store = Arc::new(InMemoryVectorStore::new());
        store.ensure_collection("test", 2).await.unwrap();

        let points: Vec<SectionPoint> = (0..indexed)
            .map(|i| SectionPoint {
                id: format!("p{}", i),
                vector: vec![1.0, 0.0],
                payload: PointPayload {
                    text: format!("раздел {}", i),
                    title: "Правила".to_string(),
                    year: None,
                    document_id: "doc1".to_string(),
                },
            })
            .collect();
        store.upsert("test", points).await.unwrap();

        QuizGenerator::new(
            Arc::new(FixedLlm(answer.to_string())),
            store,
            "test".to_string(),
        )
    }

    #[test]
    fn test_parse_plain_array() {
        let questions = parse_questions(GOOD_JSON).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].options.len(), 2);
    }

    #[test]
    fn test_parse_fenced_array() {
        let fenced = format!("```json\n{}\n```", GOOD_JSON);
        assert_eq!(parse_questions(&fenced).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_array_wrapped_in_prose() {
        let wrapped = format!("Вот вопросы:\n{}\nУдачи!", GOOD_JSON);
        assert_eq!(parse_questions(&wrapped).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_questions("Не могу составить вопросы."),
            Err(AppError::Llm(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_returns_valid_questions() {
        let generator = generator_with(GOOD_JSON, 3).await;
        let questions = generator.generate(10).await.unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_corpus_is_invalid_input() {
        let generator = generator_with(GOOD_JSON, 0).await;
        assert!(matches!(
            generator.generate(5).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_questions_are_dropped() {
        let mixed = r#"[
            {"question": "ок", "options": ["а", "б"], "correct": 1},
            {"question": "один вариант", "options": ["а"], "correct": 0},
            {"question": "индекс мимо", "options": ["а", "б"], "correct": 5}
        ]"#;
        let generator = generator_with(mixed, 3).await;

        let questions = generator.generate(10).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "ок");
    }

    #[tokio::test]
    async fn test_all_invalid_questions_is_an_llm_error() {
        let bad = r#"[{"question": "x", "options": ["а"], "correct": 0}]"#;
        let generator = generator_with(bad, 3).await;

        assert!(matches!(generator.generate(5).await, Err(AppError::Llm(_))));
    }

    #[tokio::test]
    async fn test_result_is_truncated_to_requested_count() {
        let generator = generator_with(GOOD_JSON, 3).await;
        let questions = generator.generate(1).await.unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[tokio::test]
    async fn test_service_persists_the_quiz() {
        let generator = generator_with(GOOD_JSON, 3).await;
        let tests = Arc::new(InMemoryTestStore::new());
        let service = QuizService::new(generator, tests.clone());

        let quiz = service.generate(10).await.unwrap();

        assert_eq!(quiz.questions_count, 2);
        let entries = tests.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].questions.len(), 2);
    }
}
