//! The RAG pipelines: ingestion, query, and deletion
//!
//! [`RagEngine`] holds the three injected capabilities (embedding provider,
//! generation provider, vector store) and exposes one method per pipeline.
//! Providers are constructed once at process startup and passed in; the
//! engine keeps no global or lazily initialized state of its own. Requests
//! may run concurrently; the vector store is the only shared mutable
//! resource.

mod delete;
mod ingest;
mod query;

use std::sync::Arc;

use serde::Serialize;
use studium_providers::{EmbeddingProvider, GenerationProvider};

use crate::store::VectorStore;

/// Number of chunks retrieved to ground an answer
pub(crate) const DEFAULT_TOP_K: usize = 5;

/// Bounded concurrency for per-chunk embedding during ingestion.
/// Results are reassembled in chunk-index order before the single upsert.
pub(crate) const EMBED_CONCURRENCY: usize = 4;

/// Orchestrates the ingestion, query, and deletion pipelines
pub struct RagEngine {
    pub(crate) embedder: Arc<dyn EmbeddingProvider>,
    pub(crate) generator: Arc<dyn GenerationProvider>,
    pub(crate) store: Arc<dyn VectorStore>,
    pub(crate) top_k: usize,
}

impl RagEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            embedder,
            generator,
            store,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override how many chunks are retrieved per question
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Reachability of the two model providers
    pub async fn health_check(&self) -> EngineHealth {
        EngineHealth {
            embedder_available: self.embedder.health_check().await,
            generator_available: self.generator.health_check().await,
        }
    }
}

/// Provider reachability snapshot
#[derive(Debug, Clone, Serialize)]
pub struct EngineHealth {
    pub embedder_available: bool,
    pub generator_available: bool,
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared mock providers for pipeline tests

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use studium_providers::{EmbeddingProvider, GenerationProvider, ProviderError};

    use super::RagEngine;
    use crate::store::MemoryStore;

    /// Deterministic embedder: hashes the text into a fixed-dimension unit
    /// vector. Not semantically meaningful, but stable and normalized.
    pub struct HashEmbedder {
        pub calls: AtomicUsize,
        /// When set, fail on the nth call (0-based)
        pub fail_on_call: Option<usize>,
    }

    impl HashEmbedder {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on_call: None,
            }
        }

        pub fn failing_on(call: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on_call: Some(call),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for HashEmbedder {
        fn name(&self) -> &'static str {
            "hash-embedder"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_call == Some(call) {
                return Err(ProviderError::Unreachable("mock failure".to_string()));
            }
            if text.trim().is_empty() {
                return Err(ProviderError::EmptyInput);
            }

            let mut vector = vec![0.0f32; 8];
            for (i, byte) in text.bytes().enumerate() {
                vector[i % 8] += byte as f32;
            }
            studium_providers::normalize_in_place(&mut vector)?;
            Ok(vector)
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    /// Generator that counts calls and either answers or always fails
    pub struct MockGenerator {
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    impl MockGenerator {
        pub fn answering() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationProvider for MockGenerator {
        fn name(&self) -> &'static str {
            "mock-generator"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ProviderError::Api {
                    status: 503,
                    message: "mock outage".to_string(),
                })
            } else {
                Ok("The deadline is March 5, per syllabus.txt.".to_string())
            }
        }

        async fn health_check(&self) -> bool {
            !self.fail
        }
    }

    /// Capture pipeline log output in tests (`RUST_LOG=debug cargo test`)
    fn init_test_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Engine over a fresh memory store, with handles to the mocks
    pub fn engine_with(
        embedder: HashEmbedder,
        generator: MockGenerator,
    ) -> (RagEngine, Arc<HashEmbedder>, Arc<MockGenerator>, Arc<MemoryStore>) {
        init_test_logging();
        let embedder = Arc::new(embedder);
        let generator = Arc::new(generator);
        let store = Arc::new(MemoryStore::new());
        let engine = RagEngine::new(embedder.clone(), generator.clone(), store.clone());
        (engine, embedder, generator, store)
    }

    pub fn default_engine() -> (RagEngine, Arc<HashEmbedder>, Arc<MockGenerator>, Arc<MemoryStore>)
    {
        engine_with(HashEmbedder::new(), MockGenerator::answering())
    }
}
