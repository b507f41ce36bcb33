//! # NORMA - Normative Retrieval and Consultation Engine
//!
//! A retrieval-augmented consultation engine over occupational-safety
//! regulatory documents. Documents are segmented into semantically coherent
//! sections by an LLM-driven boundary analysis, embedded and indexed into a
//! vector store, and then served three ways: cited question answering,
//! quiz generation, and background (re)indexing.
//!
//! ## Overview
//!
//! NORMA can be used in two ways:
//!
//! 1. **As a standalone tool** - run the `norma` binary against a Qdrant
//!    instance and an OpenAI-compatible API
//! 2. **As a library** - embed the engine into an application that owns the
//!    document records, consultation history and quiz storage (see
//!    [`stores`])
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use norma::{engine::Engine, utils::Config};
//! use norma::stores::InMemoryHistoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = Engine::connect(Config::from_env()?)?;
//!     engine.ensure_ready().await?;
//!
//!     let processor = engine.processor();
//!     processor.process("prikaz-782n", "текст документа...").await?;
//!
//!     let consultation = engine.consultation(Arc::new(InMemoryHistoryStore::new()));
//!     let answer = consultation.ask("Кто проводит инструктаж?", 15).await?;
//!     println!("{}", answer.response);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`ingest`] - chunking, boundary analysis, section assembly, indexing
//! - [`consult`] - retrieval and cited answer synthesis
//! - [`quiz`] - multiple-choice question generation from the corpus
//! - [`scheduler`] - background worker pool with single-flight per document
//! - [`llm`] / [`embedding`] / [`db`] - the three external client seams
//! - [`engine`] - the context object tying it all together

#![warn(missing_docs)]

pub mod cli;
pub mod consult;
pub mod db;
pub mod embedding;
pub mod engine;
pub mod extract;
pub mod ingest;
pub mod llm;
pub mod quiz;
pub mod scheduler;
pub mod stores;
pub mod types;
pub mod utils;

pub use engine::Engine;
pub use types::{AppError, Result};
pub use utils::Config;
