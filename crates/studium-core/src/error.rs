//! Error types for RAG pipeline operations

use studium_providers::ProviderError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can cross the core boundary.
///
/// Generation failures never appear here: the query pipeline downgrades them
/// to a fallback answer internally.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid caller input: empty question, bad chunker parameters
    #[error("validation error: {0}")]
    Validation(String),

    /// Embedding failed while ingesting the chunk at `index`
    #[error("embedding failed for chunk {index}: {source}")]
    ChunkEmbedding {
        index: usize,
        #[source]
        source: ProviderError,
    },

    /// Embedding failed outside of ingestion (e.g. embedding a question)
    #[error("embedding failed: {0}")]
    Embedding(#[from] ProviderError),

    /// Vector store failure on upsert, query, or delete
    #[error("vector store error: {0}")]
    Store(#[from] StoreError),
}
