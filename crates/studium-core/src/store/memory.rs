//! In-memory vector store
//!
//! Brute-force cosine scan over a guarded map. Fast enough for tens of
//! thousands of chunks and has no external dependencies, which makes it the
//! store of choice for tests and small single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{check_uniform_dimension, StoreError, VectorStore};
use crate::filter::Filter;
use crate::types::{ChunkMetadata, RetrievedChunk, VectorRecord};

/// Volatile store backed by a `RwLock<HashMap>`
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all owners (test/diagnostic helper)
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

/// Dot product; inputs are unit vectors, so this is cosine similarity
fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), StoreError> {
        check_uniform_dimension(&records)?;
        // Staged above any observable mutation: the write lock is taken only
        // after the batch has validated, and the map insert cannot fail.
        let mut map = self.records.write();
        for record in records {
            map.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: &Filter,
    ) -> Result<Vec<RetrievedChunk>, StoreError> {
        let map = self.records.read();
        let mut scored = Vec::new();
        for r in map.values().filter(|r| filter.matches(&r.metadata)) {
            // A mismatched query would silently truncate the dot product.
            if r.vector.len() != embedding.len() {
                return Err(StoreError::DimensionMismatch {
                    expected: r.vector.len(),
                    got: embedding.len(),
                });
            }
            scored.push(RetrievedChunk {
                text: r.text.clone(),
                metadata: r.metadata.clone(),
                similarity: cosine(embedding, &r.vector),
            });
        }

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }

    async fn get_by_filter(
        &self,
        filter: &Filter,
    ) -> Result<Vec<(String, ChunkMetadata)>, StoreError> {
        let map = self.records.read();
        Ok(map
            .values()
            .filter(|r| filter.matches(&r.metadata))
            .map(|r| (r.id.clone(), r.metadata.clone()))
            .collect())
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<(), StoreError> {
        let mut map = self.records.write();
        for id in ids {
            map.remove(id);
        }
        Ok(())
    }
}
