//! Pluggable model providers for the studium RAG core
//!
//! This library provides a unified interface over the two external model
//! capabilities the pipelines consume:
//! - **Embedding**: text to fixed-dimension unit vector
//! - **Generation**: prompt to natural-language text
//!
//! Backends are HTTP-based and selected by feature:
//! - `backend-openai`: any OpenAI-compatible server (llama.cpp, vLLM, OpenAI)
//! - `backend-ollama`: the Ollama daemon's native API
//!
//! Providers are constructed once at startup and passed into the pipelines;
//! there is no implicit global client state.
//!
//! # Example
//!
//! ```rust,ignore
//! use studium_providers::{OpenAiConfig, OpenAiEmbedding, OpenAiGeneration};
//! use std::sync::Arc;
//!
//! let config = OpenAiConfig::new("http://127.0.0.1:8081");
//! let embedder = Arc::new(OpenAiEmbedding::new(config.clone())?);
//! let generator = Arc::new(OpenAiGeneration::new(config)?);
//! ```

pub mod embedding;
pub mod error;
pub mod generation;

#[cfg(feature = "backend-openai")]
pub mod openai;

#[cfg(feature = "backend-ollama")]
pub mod ollama;

// Re-exports for convenience
pub use embedding::{normalize_in_place, EmbeddingProvider};
pub use error::ProviderError;
pub use generation::GenerationProvider;

#[cfg(feature = "backend-openai")]
pub use openai::{OpenAiConfig, OpenAiEmbedding, OpenAiGeneration};

#[cfg(feature = "backend-ollama")]
pub use ollama::{OllamaConfig, OllamaEmbedding, OllamaGeneration};
