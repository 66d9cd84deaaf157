//! Ollama backend
//!
//! Talks to a local Ollama daemon via its native API (`/api/embeddings`,
//! `/api/generate`). The daemon manages model loading internally, so there
//! is no model autodetection here; the model name is part of the config.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::embedding::{normalize_in_place, EmbeddingProvider};
use crate::error::ProviderError;
use crate::generation::GenerationProvider;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
const EMBED_TIMEOUT: Duration = Duration::from_secs(30);
const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the Ollama daemon
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the daemon
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model name (e.g. "nomic-embed-text" or "llama3.2")
    pub model: String,
    /// Request timeout in seconds, overriding the per-operation default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl OllamaConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            model: model.into(),
            timeout_secs: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::Config("model must not be empty".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(ProviderError::Config("base_url must not be empty".to_string()));
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn build_client(
    config: &OllamaConfig,
    default_timeout: Duration,
) -> Result<reqwest::Client, ProviderError> {
    config.validate()?;
    let timeout = config
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(default_timeout);
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ProviderError::Http)
}

/// Daemon availability check via `/api/tags`
async fn check_daemon(http: &reqwest::Client, config: &OllamaConfig) -> bool {
    match http.get(config.endpoint("/api/tags")).send().await {
        Ok(resp) => resp.status().is_success(),
        Err(e) => {
            log::debug!("Ollama health check failed: {}", e);
            false
        }
    }
}

async fn api_error(resp: reqwest::Response) -> ProviderError {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
    ProviderError::Api { status, message }
}

/// Embedding provider backed by `/api/embeddings`
pub struct OllamaEmbedding {
    http: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaEmbedding {
    pub fn new(config: OllamaConfig) -> Result<Self, ProviderError> {
        let http = build_client(&config, EMBED_TIMEOUT)?;
        Ok(Self { http, config })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbedding {
    fn name(&self) -> &'static str {
        "ollama-embedding"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        #[derive(Deserialize)]
        struct EmbeddingsResponse {
            embedding: Vec<f32>,
        }

        let body = json!({
            "model": self.config.model,
            "prompt": text,
        });
        let resp = self
            .http
            .post(self.config.endpoint("/api/embeddings"))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let parsed: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("invalid embeddings response: {e}")))?;
        let mut vector = parsed.embedding;
        if vector.is_empty() {
            return Err(ProviderError::Parse("daemon returned empty embedding".to_string()));
        }
        normalize_in_place(&mut vector)?;
        Ok(vector)
    }

    async fn health_check(&self) -> bool {
        check_daemon(&self.http, &self.config).await
    }
}

/// Generation provider backed by `/api/generate` (non-streaming)
pub struct OllamaGeneration {
    http: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaGeneration {
    pub fn new(config: OllamaConfig) -> Result<Self, ProviderError> {
        let http = build_client(&config, GENERATE_TIMEOUT)?;
        Ok(Self { http, config })
    }
}

#[async_trait::async_trait]
impl GenerationProvider for OllamaGeneration {
    fn name(&self) -> &'static str {
        "ollama-generation"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        if prompt.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        #[derive(Deserialize)]
        struct GenerateResponse {
            response: String,
        }

        let body = json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
        });
        let resp = self
            .http
            .post(self.config.endpoint("/api/generate"))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("invalid generate response: {e}")))?;
        Ok(parsed.response)
    }

    async fn health_check(&self) -> bool {
        check_daemon(&self.http, &self.config).await
    }
}
