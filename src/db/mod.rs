//! Vector store backends.
//!
//! The engine stores one embedding point per section and needs four
//! operations from a backend: batch upsert, cosine similarity search,
//! delete-by-document, and an unranked sample for quiz generation. The
//! [`VectorStore`] trait captures exactly that; [`QdrantStore`] is the
//! production backend and [`InMemoryVectorStore`] backs the tests.

mod qdrant;
mod vectorstore;

pub use qdrant::QdrantStore;
pub use vectorstore::{InMemoryVectorStore, VectorStore};
