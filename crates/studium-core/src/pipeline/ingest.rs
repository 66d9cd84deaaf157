//! Ingestion pipeline: chunk strings in, owner-scoped vectors out

use chrono::Utc;
use futures_util::stream::{self, StreamExt};

use super::{RagEngine, EMBED_CONCURRENCY};
use crate::chunker::{chunk_text, ChunkConfig};
use crate::error::RagError;
use crate::types::{chunk_id, document_id, ChunkMetadata, IngestReceipt, VectorRecord};

impl RagEngine {
    /// Persist a document's chunks for `owner_id` under `source_name`.
    ///
    /// Embeds every chunk (bounded fan-out, reassembled in chunk-index
    /// order), then commits the whole batch in a single upsert. Any
    /// embedding failure aborts before anything is written, so a partially
    /// ingested document is never observable.
    ///
    /// Re-ingesting the same `source_name` accumulates a new chunk set under
    /// a fresh document id; prior chunks stay until an explicit
    /// [`RagEngine::delete`].
    pub async fn ingest(
        &self,
        owner_id: &str,
        chunks: Vec<String>,
        source_name: &str,
    ) -> Result<IngestReceipt, RagError> {
        if owner_id.trim().is_empty() {
            return Err(RagError::Validation("owner_id must not be empty".to_string()));
        }
        if source_name.trim().is_empty() {
            return Err(RagError::Validation("source_name must not be empty".to_string()));
        }

        let now = Utc::now();
        let doc_id = document_id(owner_id, now.timestamp_millis());
        let ingested_at = now.to_rfc3339();
        let total_chunks = chunks.len();

        log::info!(
            "Ingesting {} chunks for owner {} from {}",
            total_chunks,
            owner_id,
            source_name
        );

        // Fan out per-chunk embedding with bounded concurrency. `buffered`
        // yields in submission order, so position i in `embedded` is chunk i.
        let embedded: Vec<(usize, String, Vec<f32>)> = stream::iter(
            chunks.into_iter().enumerate().map(|(index, text)| {
                let embedder = self.embedder.clone();
                async move {
                    let vector = embedder
                        .embed(&text)
                        .await
                        .map_err(|source| RagError::ChunkEmbedding { index, source })?;
                    Ok::<_, RagError>((index, text, vector))
                }
            }),
        )
        .buffered(EMBED_CONCURRENCY)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_, _>>()?;

        let records: Vec<VectorRecord> = embedded
            .into_iter()
            .map(|(index, text, vector)| VectorRecord {
                id: chunk_id(&doc_id, index),
                vector,
                text,
                metadata: ChunkMetadata {
                    owner_id: owner_id.to_string(),
                    source_name: source_name.to_string(),
                    chunk_index: index as u32,
                    total_chunks: total_chunks as u32,
                    ingested_at: ingested_at.clone(),
                },
            })
            .collect();

        // One batch, no partial commits.
        self.store.upsert(records).await?;

        log::info!("Ingested document {} ({} chunks)", doc_id, total_chunks);
        Ok(IngestReceipt {
            document_id: doc_id,
            chunks_created: total_chunks,
        })
    }

    /// Chunk raw text with `config`, then ingest the chunks
    pub async fn ingest_text(
        &self,
        owner_id: &str,
        text: &str,
        source_name: &str,
        config: &ChunkConfig,
    ) -> Result<IngestReceipt, RagError> {
        let chunks = chunk_text(text, config)?;
        self.ingest(owner_id, chunks, source_name).await
    }
}
