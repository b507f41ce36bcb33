//! End-to-end tests over mock model clients and the in-memory vector store:
//! multi-chunk segmentation, background scheduling, consultation, and quiz
//! generation, wired through the engine context the way the binary wires it.

mod common;

use std::sync::Arc;

use common::mocks::{test_config, KeywordEmbedder, ScriptedLlm, TEST_COLLECTION};
use norma::db::{InMemoryVectorStore, VectorStore};
use norma::engine::Engine;
use norma::ingest::splitter::CHUNK_SIZE;
use norma::llm::{ChatRole, CONSULTATION_PROMPT, SECTION_ANALYSIS_PROMPT};
use norma::scheduler::IngestJob;
use norma::stores::{InMemoryDocumentStore, InMemoryHistoryStore, InMemoryTestStore};
use norma::types::{AppError, DocumentStatus};

fn engine_with(llm: Arc<ScriptedLlm>) -> (Engine, Arc<InMemoryVectorStore>) {
    let store = Arc::new(InMemoryVectorStore::new());
    let engine = Engine::with_parts(
        test_config(),
        llm,
        Arc::new(KeywordEmbedder),
        store.clone(),
    );
    (engine, store)
}

/// A chunk's worth of words opening with a unique anchor word.
fn chunk_words(anchor: &str, total: usize) -> Vec<String> {
    let mut words = vec![anchor.to_string()];
    words.extend(std::iter::repeat("слово".to_string()).take(total - 1));
    words
}

#[tokio::test]
async fn test_section_spanning_three_chunks() {
    // Chunk 1 opens a section that stays open, chunk 2 is pure continuation
    // (no boundaries), chunk 3 carries the section tail and a new section.
    let chunk1 = chunk_words("начало-раздела", CHUNK_SIZE).join(" ");
    let chunk2 = chunk_words("продолжение-текста", CHUNK_SIZE).join(" ");
    let mut tail = chunk_words("хвост-раздела", 51);
    tail.extend(chunk_words("новый-раздел", 51));
    let chunk3 = tail.join(" ");

    let document = format!("{} {} {}", chunk1, chunk2, chunk3);

    let llm = ScriptedLlm::new(&[
        "<META>\nTITLE: Приказ № 1н\nYEAR: 2024\n</META>",
        "<RESULT>\n0001:section startfrom начало-раздела\n</RESULT>",
        "<NO RESULT/>",
        "<RESULT>\n0001:section startfrom хвост-раздела\n0002:section startfrom новый-раздел\n</RESULT>",
    ]);
    let (engine, store) = engine_with(llm.clone());
    engine.ensure_ready().await.unwrap();

    let result = engine
        .processor()
        .process("doc-span", &document)
        .await
        .unwrap();

    assert_eq!(result.sections_indexed, 3);
    assert_eq!(result.meta.title, "Приказ № 1н");
    assert_eq!(result.meta.year, Some(2024));

    let points = store.sample(TEST_COLLECTION, 10).await.unwrap();
    assert_eq!(points.len(), 3);
    assert!(points
        .iter()
        .all(|p| p.payload.document_id == "doc-span" && p.payload.title == "Приказ № 1н"));

    // The spanning section is chunk 1 plus all of chunk 2, space-joined.
    let spanning = points
        .iter()
        .find(|p| p.payload.text.starts_with("начало-раздела"))
        .unwrap();
    assert_eq!(spanning.payload.text, format!("{} {}", chunk1, chunk2));

    let tail_section = points
        .iter()
        .find(|p| p.payload.text.starts_with("хвост-раздела"))
        .unwrap();
    assert!(!tail_section.payload.text.contains("новый-раздел"));

    assert!(points
        .iter()
        .any(|p| p.payload.text.starts_with("новый-раздел")));

    // One metadata call plus one boundary call per chunk, each carrying the
    // analysis instruction and the chunk as the user message.
    let requests = llm.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[1][0].content, SECTION_ANALYSIS_PROMPT);
    assert_eq!(requests[1][1].role, ChatRole::User);
    assert_eq!(requests[1][1].content, chunk1);
    assert_eq!(requests[3][1].content, chunk3);
}

#[tokio::test]
async fn test_rubbish_gap_and_merge_scenario() {
    // Chunk 1 opens section A and closes it at rubbish anchor B, chunk 2 has
    // no boundaries and merges into A, chunk 3 opens section C mid-chunk.
    let mut first = chunk_words("тема-а", 100);
    first.extend(chunk_words("мусор-б", CHUNK_SIZE - 100));
    let chunk1 = first.join(" ");
    let chunk2 = chunk_words("продолжение-а", CHUNK_SIZE).join(" ");
    let mut third = chunk_words("шапка-страницы", 10);
    third.extend(chunk_words("тема-с", 50));
    let chunk3 = third.join(" ");

    let document = format!("{} {} {}", chunk1, chunk2, chunk3);

    let llm = ScriptedLlm::new(&[
        "<NO RESULT/>",
        "<RESULT>\n0001:section startfrom тема-а\n0002:rubbish skipfrom мусор-б\n</RESULT>",
        "<NO RESULT/>",
        "<RESULT>\n0001:section startfrom тема-с\n</RESULT>",
    ]);
    let (engine, store) = engine_with(llm);
    engine.ensure_ready().await.unwrap();

    let result = engine
        .processor()
        .process("doc-gap", &document)
        .await
        .unwrap();
    assert_eq!(result.sections_indexed, 2);

    let points = store.sample(TEST_COLLECTION, 10).await.unwrap();

    // Section A is the span up to the rubbish anchor with all of chunk 2
    // merged in; chunk 2's text is never lost.
    let a_body = &chunk1[..chunk1.find("мусор-б").unwrap()];
    let merged = points
        .iter()
        .find(|p| p.payload.text.starts_with("тема-а"))
        .unwrap();
    assert_eq!(merged.payload.text, format!("{} {}", a_body, chunk2));

    let section_c = points
        .iter()
        .find(|p| p.payload.text.starts_with("тема-с"))
        .unwrap();
    assert!(section_c.payload.text.ends_with("слово"));
    assert!(!section_c.payload.text.contains("шапка-страницы"));
}

#[tokio::test]
async fn test_consultation_over_ingested_corpus() {
    let instructing = format!("инструктаж {}", "проводится работодателем ".repeat(10));
    let extinguisher = format!("огнетушитель {}", "размещается на видном месте ".repeat(10));

    let llm = ScriptedLlm::new(&[
        // Document 1: metadata + one chunk.
        "<META>\nTITLE: Правила инструктажа\nYEAR: 2021\n</META>",
        "<RESULT>\n0001:section startfrom инструктаж\n</RESULT>",
        // Document 2: metadata + one chunk.
        "<NO RESULT/>",
        "<RESULT>\n0001:section startfrom огнетушитель\n</RESULT>",
        // The consultation answer.
        "Инструктаж проводит работодатель [0].",
    ]);
    let (engine, _store) = engine_with(llm.clone());
    engine.ensure_ready().await.unwrap();

    let processor = engine.processor();
    processor.process("doc-instr", &instructing).await.unwrap();
    processor.process("doc-fire", &extinguisher).await.unwrap();

    let history = Arc::new(InMemoryHistoryStore::new());
    let consultation = engine.consultation(history.clone());

    let result = consultation
        .ask("Кто проводит инструктаж на предприятии?", 15)
        .await
        .unwrap();

    assert_eq!(result.response, "Инструктаж проводит работодатель [0].");
    assert_eq!(result.sources.len(), 2);
    // The section sharing the question's keyword ranks first.
    assert!(result.sources[0].text_preview.starts_with("инструктаж"));
    assert!(result.sources[0].score > result.sources[1].score);
    assert_eq!(result.sources[0].title, "Правила инструктажа");
    assert_eq!(result.sources[0].year, Some(2021));
    assert_eq!(result.sources[0].document_id, "doc-instr");

    // Message layout: instruction, one labelled system message per source,
    // then the question.
    let consult_request = llm.requests().last().unwrap().clone();
    assert_eq!(consult_request.len(), 4);
    assert_eq!(consult_request[0].content, CONSULTATION_PROMPT);
    assert!(consult_request[1].content.starts_with("[0] инструктаж"));
    assert!(consult_request[2].content.starts_with("[1] огнетушитель"));
    assert_eq!(
        consult_request[3].content,
        "Кто проводит инструктаж на предприятии?"
    );

    let entries = history.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].query, "Кто проводит инструктаж на предприятии?");
    assert!(entries[0].response_time >= 0.0);
}

#[tokio::test]
async fn test_scheduler_drives_status_and_metadata() {
    let text = format!("инструктаж {}", "вводный и повторный ".repeat(10));

    let llm = ScriptedLlm::new(&[
        "<META>\nTITLE: Порядок обучения\nYEAR: 2019\n</META>",
        "<RESULT>\n0001:section startfrom инструктаж\n</RESULT>",
    ]);
    let (engine, store) = engine_with(llm);
    engine.ensure_ready().await.unwrap();

    let documents = Arc::new(InMemoryDocumentStore::new());
    documents.insert("doc1", &text);

    let scheduler = engine.scheduler(documents.clone());
    scheduler
        .submit(IngestJob::Process {
            document_id: "doc1".to_string(),
        })
        .unwrap();
    scheduler.shutdown().await;

    assert_eq!(documents.status("doc1"), Some(DocumentStatus::Processed));
    let meta = documents.meta("doc1").unwrap();
    assert_eq!(meta.title, "Порядок обучения");
    assert_eq!(meta.year, Some(2019));
    assert_eq!(store.count(TEST_COLLECTION).await.unwrap(), 1);
}

#[tokio::test]
async fn test_quiz_generation_over_indexed_corpus() {
    let text = format!("огнетушитель {}", "проверяется ежегодно ".repeat(10));

    let quiz_json = r#"[
        {"question": "Как часто проверяется огнетушитель?",
         "options": ["Ежегодно", "Раз в пять лет"], "correct": 0}
    ]"#;

    let llm = ScriptedLlm::new(&[
        "<NO RESULT/>",
        "<RESULT>\n0001:section startfrom огнетушитель\n</RESULT>",
        quiz_json,
    ]);
    let (engine, _store) = engine_with(llm);
    engine.ensure_ready().await.unwrap();

    engine
        .processor()
        .process("doc-fire", &text)
        .await
        .unwrap();

    let tests = Arc::new(InMemoryTestStore::new());
    let quiz = engine.quiz(tests.clone());

    let generated = quiz.generate(5).await.unwrap();
    assert_eq!(generated.questions_count, 1);
    assert_eq!(
        generated.questions[0].question,
        "Как часто проверяется огнетушитель?"
    );

    assert_eq!(tests.entries().len(), 1);
}

#[tokio::test]
async fn test_quiz_on_empty_corpus_is_rejected() {
    let llm = ScriptedLlm::new(&[]);
    let (engine, _store) = engine_with(llm);
    engine.ensure_ready().await.unwrap();

    let quiz = engine.quiz(Arc::new(InMemoryTestStore::new()));
    let result = quiz.generate(5).await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_remove_then_consult_finds_nothing() {
    let text = format!("высота {}", "работы на высоте требуют допуска ".repeat(5));

    let llm = ScriptedLlm::new(&[
        "<NO RESULT/>",
        "<RESULT>\n0001:section startfrom высота\n</RESULT>",
        "Не знаю.",
    ]);
    let (engine, store) = engine_with(llm);
    engine.ensure_ready().await.unwrap();

    let processor = engine.processor();
    processor.process("doc-height", &text).await.unwrap();
    assert_eq!(store.count(TEST_COLLECTION).await.unwrap(), 1);

    processor.remove("doc-height").await.unwrap();
    assert_eq!(store.count(TEST_COLLECTION).await.unwrap(), 0);

    let consultation = engine.consultation(Arc::new(InMemoryHistoryStore::new()));
    let result = consultation.ask("Что требуется для работ на высоте?", 15).await.unwrap();
    assert!(result.sources.is_empty());
    assert_eq!(result.response, "Не знаю.");
}
