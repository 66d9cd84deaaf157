//! Vector storage: a persistent similarity index with metadata filtering
//!
//! One logical collection holds all owners' chunks; isolation between owners
//! is enforced purely by the owner predicate carried in every [`Filter`],
//! never by separate per-owner collections.

pub mod memory;

#[cfg(feature = "lancedb-store")]
pub mod lancedb;

use async_trait::async_trait;

use crate::filter::Filter;
use crate::types::{ChunkMetadata, RetrievedChunk, VectorRecord};

pub use memory::MemoryStore;

#[cfg(feature = "lancedb-store")]
pub use lancedb::LanceDbStore;

/// Error types for vector store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("index error: {0}")]
    Index(String),

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistent similarity index keyed by chunk id.
///
/// Batch mutations are atomic from the caller's perspective: a failed
/// `upsert` or `delete_by_ids` must not leave a partially committed state
/// observable to subsequent queries.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite a batch of records in one commit.
    ///
    /// Existing ids are overwritten. All embeddings in the batch must share
    /// one dimensionality.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), StoreError>;

    /// Nearest-neighbor query restricted to records matching `filter`,
    /// ranked by cosine similarity descending, at most `k` results.
    /// Tie-break between equal similarities is store-defined.
    async fn query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: &Filter,
    ) -> Result<Vec<RetrievedChunk>, StoreError>;

    /// All (id, metadata) pairs matching `filter`, used to resolve a
    /// deletion set before deleting
    async fn get_by_filter(
        &self,
        filter: &Filter,
    ) -> Result<Vec<(String, ChunkMetadata)>, StoreError>;

    /// Remove records by id. Deleting a nonexistent id is a no-op.
    async fn delete_by_ids(&self, ids: &[String]) -> Result<(), StoreError>;
}

/// Verify that every record in a batch shares one embedding dimension
pub(crate) fn check_uniform_dimension(records: &[VectorRecord]) -> Result<usize, StoreError> {
    let expected = records.first().map(|r| r.vector.len()).unwrap_or(0);
    for record in records {
        if record.vector.len() != expected {
            return Err(StoreError::DimensionMismatch {
                expected,
                got: record.vector.len(),
            });
        }
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;

    fn record(id: &str, dim: usize) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            vector: vec![0.5; dim],
            text: "text".to_string(),
            metadata: ChunkMetadata {
                owner_id: "o".to_string(),
                source_name: "s".to_string(),
                chunk_index: 0,
                total_chunks: 1,
                ingested_at: "2026-03-01T12:00:00Z".to_string(),
            },
        }
    }

    #[test]
    fn uniform_dimension_accepted() {
        let records = vec![record("a", 4), record("b", 4)];
        assert_eq!(check_uniform_dimension(&records).unwrap(), 4);
    }

    #[test]
    fn mixed_dimensions_rejected() {
        let records = vec![record("a", 4), record("b", 3)];
        let err = check_uniform_dimension(&records).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch { expected: 4, got: 3 }
        ));
    }

    #[test]
    fn trait_is_object_safe() {
        fn _assert(_: &dyn VectorStore) {}
    }
}
