//! LanceDB-backed vector store
//!
//! Persistent storage in a single `chunks` table. Embeddings are stored as
//! fixed-size `Float32` lists; similarity queries run with cosine distance
//! and are converted back to similarity (`1 - distance`) at the boundary.
//!
//! Upsert runs as a merge-insert keyed on `id` in one LanceDB commit, so
//! readers either see the whole batch or none of it, and rows for ids not
//! in the batch are never disturbed.

use std::sync::Arc;

use arrow_array::types::Float32Type;
use arrow_array::{
    ArrayRef, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::DistanceType;

use super::{check_uniform_dimension, StoreError, VectorStore};
use crate::filter::Filter;
use crate::types::{ChunkMetadata, RetrievedChunk, VectorRecord};

/// Table name for chunk records
pub const CHUNKS_TABLE_NAME: &str = "chunks";

impl From<lancedb::Error> for StoreError {
    fn from(e: lancedb::Error) -> Self {
        StoreError::Index(e.to_string())
    }
}

/// Vector store backed by an on-disk LanceDB database
pub struct LanceDbStore {
    db: lancedb::Connection,
}

impl LanceDbStore {
    /// Connect to (or create) a LanceDB database at `path`
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        log::info!("Connecting to LanceDB at: {}", path);
        let db = lancedb::connect(path)
            .execute()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { db })
    }

    async fn open_table(&self) -> Result<Option<lancedb::Table>, StoreError> {
        let names = self.db.table_names().execute().await?;
        if !names.contains(&CHUNKS_TABLE_NAME.to_string()) {
            return Ok(None);
        }
        Ok(Some(self.db.open_table(CHUNKS_TABLE_NAME).execute().await?))
    }

    /// Number of stored records (diagnostic helper)
    pub async fn count_rows(&self) -> Result<usize, StoreError> {
        match self.open_table().await? {
            Some(table) => Ok(table.count_rows(None).await?),
            None => Ok(0),
        }
    }
}

/// Arrow schema for the chunks table
fn create_schema(embedding_dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("owner_id", DataType::Utf8, false),
        Field::new("source_name", DataType::Utf8, false),
        Field::new("chunk_index", DataType::Int32, false),
        Field::new("total_chunks", DataType::Int32, false),
        Field::new("ingested_at", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                embedding_dim,
            ),
            false,
        ),
    ]))
}

/// Convert a record batch of chunks into an Arrow `RecordBatch`
fn records_to_record_batch(
    records: &[VectorRecord],
    embedding_dim: i32,
) -> Result<RecordBatch, StoreError> {
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    let owner_ids: Vec<&str> = records.iter().map(|r| r.metadata.owner_id.as_str()).collect();
    let source_names: Vec<&str> = records
        .iter()
        .map(|r| r.metadata.source_name.as_str())
        .collect();
    let chunk_indices: Vec<i32> = records.iter().map(|r| r.metadata.chunk_index as i32).collect();
    let total_chunks: Vec<i32> = records.iter().map(|r| r.metadata.total_chunks as i32).collect();
    let ingested_ats: Vec<&str> = records
        .iter()
        .map(|r| r.metadata.ingested_at.as_str())
        .collect();
    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();

    let vectors_array = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
        records
            .iter()
            .map(|r| Some(r.vector.iter().copied().map(Some).collect::<Vec<_>>())),
        embedding_dim,
    );

    let schema = create_schema(embedding_dim);

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)) as ArrayRef,
            Arc::new(StringArray::from(owner_ids)) as ArrayRef,
            Arc::new(StringArray::from(source_names)) as ArrayRef,
            Arc::new(Int32Array::from(chunk_indices)) as ArrayRef,
            Arc::new(Int32Array::from(total_chunks)) as ArrayRef,
            Arc::new(StringArray::from(ingested_ats)) as ArrayRef,
            Arc::new(StringArray::from(texts)) as ArrayRef,
            Arc::new(vectors_array) as ArrayRef,
        ],
    )
    .map_err(|e| StoreError::Index(format!("failed to create RecordBatch: {}", e)))
}

/// Extract a string column from a RecordBatch
fn get_string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, StoreError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| StoreError::Index(format!("missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| StoreError::Index(format!("{} column has wrong type", name)))
}

/// Extract an i32 column from a RecordBatch
fn get_i32_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int32Array, StoreError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| StoreError::Index(format!("missing {} column", name)))?
        .as_any()
        .downcast_ref::<Int32Array>()
        .ok_or_else(|| StoreError::Index(format!("{} column has wrong type", name)))
}

/// Extract an f32 column from a RecordBatch
fn get_f32_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float32Array, StoreError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| StoreError::Index(format!("missing {} column", name)))?
        .as_any()
        .downcast_ref::<Float32Array>()
        .ok_or_else(|| StoreError::Index(format!("{} column has wrong type", name)))
}

fn metadata_at(batch: &RecordBatch, i: usize) -> Result<ChunkMetadata, StoreError> {
    Ok(ChunkMetadata {
        owner_id: get_string_col(batch, "owner_id")?.value(i).to_string(),
        source_name: get_string_col(batch, "source_name")?.value(i).to_string(),
        chunk_index: get_i32_col(batch, "chunk_index")?.value(i) as u32,
        total_chunks: get_i32_col(batch, "total_chunks")?.value(i) as u32,
        ingested_at: get_string_col(batch, "ingested_at")?.value(i).to_string(),
    })
}

/// Render an `id IN (...)` predicate for a batch of ids
fn ids_predicate(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("'{}'", id.replace('\'', "''")))
        .collect();
    format!("id IN ({})", quoted.join(", "))
}

#[async_trait]
impl VectorStore for LanceDbStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        let dim = check_uniform_dimension(&records)? as i32;
        let batch = records_to_record_batch(&records, dim)?;
        let schema = create_schema(dim);

        match self.open_table().await? {
            Some(table) => {
                // Overwrite semantics in a single commit: matched ids are
                // replaced, everything else is inserted.
                let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);
                let mut merge = table.merge_insert(&["id"]);
                merge
                    .when_matched_update_all(None)
                    .when_not_matched_insert_all();
                merge.execute(Box::new(batches)).await?;
            }
            None => {
                log::info!("Creating LanceDB table with {} vectors ({}D)", records.len(), dim);
                let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);
                self.db
                    .create_table(CHUNKS_TABLE_NAME, Box::new(batches))
                    .execute()
                    .await?;
            }
        }
        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: &Filter,
    ) -> Result<Vec<RetrievedChunk>, StoreError> {
        let Some(table) = self.open_table().await? else {
            return Ok(Vec::new());
        };

        let mut results = table
            .vector_search(embedding.to_vec())?
            .distance_type(DistanceType::Cosine)
            .only_if(filter.to_sql())
            .limit(k)
            .execute()
            .await?;

        let mut chunks = Vec::new();
        while let Some(batch) = results.try_next().await? {
            let texts = get_string_col(&batch, "text")?;
            let distances = get_f32_col(&batch, "_distance")?;
            for i in 0..batch.num_rows() {
                chunks.push(RetrievedChunk {
                    text: texts.value(i).to_string(),
                    metadata: metadata_at(&batch, i)?,
                    // Cosine distance back to similarity.
                    similarity: 1.0 - distances.value(i),
                });
            }
        }
        Ok(chunks)
    }

    async fn get_by_filter(
        &self,
        filter: &Filter,
    ) -> Result<Vec<(String, ChunkMetadata)>, StoreError> {
        let Some(table) = self.open_table().await? else {
            return Ok(Vec::new());
        };

        let mut results = table.query().only_if(filter.to_sql()).execute().await?;

        let mut matches = Vec::new();
        while let Some(batch) = results.try_next().await? {
            let ids = get_string_col(&batch, "id")?;
            for i in 0..batch.num_rows() {
                matches.push((ids.value(i).to_string(), metadata_at(&batch, i)?));
            }
        }
        Ok(matches)
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let Some(table) = self.open_table().await? else {
            return Ok(());
        };
        table.delete(&ids_predicate(ids)).await?;
        Ok(())
    }
}
