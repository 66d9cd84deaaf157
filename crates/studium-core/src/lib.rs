//! Owner-scoped retrieval-augmented generation core
//!
//! Turns uploaded text into searchable, owner-scoped chunks and answers
//! natural-language questions by retrieving the most relevant chunks and
//! grounding a generated answer in them.
//!
//! The moving parts:
//! - [`chunker`]: sliding-window word chunking of raw text
//! - [`store`]: the [`store::VectorStore`] trait with LanceDB-backed and
//!   in-memory implementations
//! - [`pipeline`]: the [`pipeline::RagEngine`] ingestion / query / deletion
//!   pipelines over injected providers
//!
//! Embedding and generation models live behind the traits in
//! `studium-providers`; this crate never talks to a model directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use studium_core::{chunker::ChunkConfig, pipeline::RagEngine, store::LanceDbStore};
//!
//! let store = Arc::new(LanceDbStore::connect("/var/lib/studium/lancedb").await?);
//! let engine = RagEngine::new(embedder, generator, store);
//!
//! let receipt = engine
//!     .ingest_text("user-17", &raw_text, "syllabus.txt", &ChunkConfig::default())
//!     .await?;
//! let answer = engine.answer("user-17", "When is assignment 2 due?").await?;
//! ```

pub mod chunker;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod prompt;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use chunker::{chunk_text, ChunkConfig};
pub use error::RagError;
pub use filter::{Filter, MetadataField, Predicate};
pub use pipeline::{EngineHealth, RagEngine};
pub use store::{MemoryStore, StoreError, VectorStore};
pub use types::{ChunkMetadata, IngestReceipt, RagAnswer, RetrievedChunk, VectorRecord};

#[cfg(feature = "lancedb-store")]
pub use store::LanceDbStore;
