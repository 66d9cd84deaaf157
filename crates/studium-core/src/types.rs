//! Data types shared by the pipelines and stores

use serde::{Deserialize, Serialize};

/// Metadata stored alongside every chunk vector.
///
/// `owner_id` and `source_name` together are the unit of deletion scoping;
/// every record always carries both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Opaque owner identifier (supplied pre-verified by the caller)
    pub owner_id: String,
    /// Name of the source document (e.g. the uploaded filename)
    pub source_name: String,
    /// 0-based position of this chunk within its document
    pub chunk_index: u32,
    /// Chunk count for the document this chunk belongs to
    pub total_chunks: u32,
    /// Ingestion time, RFC 3339
    pub ingested_at: String,
}

/// A chunk as persisted in the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Deterministic chunk id: `{owner_id}_{timestamp}_chunk_{index}`
    pub id: String,
    /// Unit-normalized embedding
    pub vector: Vec<f32>,
    /// The chunk text itself
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// A chunk returned from a similarity query, ranked by descending similarity
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity to the query embedding
    pub similarity: f32,
}

/// Result of ingesting one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReceipt {
    /// Logical document id: `{owner_id}_{timestamp}`
    pub document_id: String,
    pub chunks_created: usize,
}

/// Result of answering a question
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    /// Markdown prose answer (generated, or the degraded/no-documents text)
    pub answer: String,
    /// Distinct source names across retrieved chunks, in order of first
    /// appearance. Only ever contains names present in retrieved metadata.
    pub sources: Vec<String>,
    /// Number of chunks retrieved for grounding
    pub chunk_count: usize,
}

/// Build the deterministic chunk id for (document, index)
pub(crate) fn chunk_id(document_id: &str, index: usize) -> String {
    format!("{}_chunk_{}", document_id, index)
}

/// Build the logical document id for (owner, ingestion timestamp)
pub(crate) fn document_id(owner_id: &str, timestamp_millis: i64) -> String {
    format!("{}_{}", owner_id, timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_reconstructable_from_parts() {
        let doc = document_id("user-1", 1700000000123);
        assert_eq!(doc, "user-1_1700000000123");
        assert_eq!(chunk_id(&doc, 0), "user-1_1700000000123_chunk_0");
        assert_eq!(chunk_id(&doc, 41), "user-1_1700000000123_chunk_41");
    }

    #[test]
    fn metadata_serde_roundtrip() {
        let meta = ChunkMetadata {
            owner_id: "user-1".to_string(),
            source_name: "syllabus.txt".to_string(),
            chunk_index: 2,
            total_chunks: 5,
            ingested_at: "2026-03-01T12:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&meta).unwrap();
        let back: ChunkMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, back);
    }
}
