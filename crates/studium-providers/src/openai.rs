//! OpenAI-compatible backend
//!
//! Works against any server exposing the OpenAI REST surface: a local
//! llama.cpp server running an embedding model (e.g. Qwen3-Embedding-0.6B),
//! vLLM, or the hosted OpenAI API. Embedding and generation are separate
//! provider values so they can point at different servers.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;

use crate::embedding::{normalize_in_place, EmbeddingProvider};
use crate::error::ProviderError;
use crate::generation::GenerationProvider;

/// Default request timeout for embedding calls
const EMBED_TIMEOUT: Duration = Duration::from_secs(30);

/// Default request timeout for generation calls (completions are slow)
const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for an OpenAI-compatible server
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OpenAiConfig {
    /// Base URL of the server (e.g. "http://127.0.0.1:8081")
    pub base_url: String,
    /// API key. Local servers typically don't require auth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier. When `None`, the first model reported by
    /// `/v1/models` is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Request timeout in seconds, overriding the per-operation default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl OpenAiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            model: None,
            timeout_secs: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Base URL with a guaranteed `/v1` suffix for endpoint routing
    fn v1_base(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            base.to_string()
        } else {
            format!("{}/v1", base)
        }
    }
}

/// Shared HTTP plumbing for the embedding and generation providers
struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
    /// Model name resolved from `/v1/models` on first use. Concurrent first
    /// callers race through the `OnceCell`; a single winner performs the
    /// lookup and the rest reuse its result.
    model: OnceCell<String>,
}

impl OpenAiClient {
    fn new(config: OpenAiConfig, default_timeout: Duration) -> Result<Self, ProviderError> {
        if config.base_url.trim().is_empty() {
            return Err(ProviderError::Config("base_url must not be empty".to_string()));
        }
        let timeout = config
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(default_timeout);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Http)?;
        Ok(Self {
            http,
            config,
            model: OnceCell::new(),
        })
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    /// Resolve the model name, querying `/v1/models` at most once
    async fn model_name(&self) -> Result<&str, ProviderError> {
        if let Some(name) = &self.config.model {
            return Ok(name);
        }
        self.model
            .get_or_try_init(|| self.detect_model())
            .await
            .map(|s| s.as_str())
    }

    async fn detect_model(&self) -> Result<String, ProviderError> {
        #[derive(Deserialize)]
        struct ModelsResponse {
            data: Vec<ModelInfo>,
        }

        #[derive(Deserialize)]
        struct ModelInfo {
            id: String,
        }

        let url = format!("{}/models", self.config.v1_base());
        log::debug!("Detecting model name from: {}", url);

        let resp = self.apply_auth(self.http.get(&url)).send().await?;
        if !resp.status().is_success() {
            return Err(ProviderError::Api {
                status: resp.status().as_u16(),
                message: format!("model listing failed at {}", url),
            });
        }
        let models: ModelsResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("invalid /v1/models response: {e}")))?;
        let model = models
            .data
            .first()
            .map(|m| m.id.clone())
            .ok_or_else(|| ProviderError::Parse("server reports no models".to_string()))?;
        log::info!("Detected model: {}", model);
        Ok(model)
    }

    /// Check server availability: `/health` first (llama.cpp standard),
    /// then `/v1/models` (OpenAI standard).
    async fn check_server(&self) -> bool {
        let base = self.config.base_url.trim_end_matches('/');

        let health_url = format!("{}/health", base);
        if let Ok(resp) = self.http.get(&health_url).send().await {
            if resp.status().is_success() {
                return true;
            }
        }

        let models_url = format!("{}/models", self.config.v1_base());
        match self.apply_auth(self.http.get(&models_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                log::debug!("health check failed for {}: {}", models_url, e);
                false
            }
        }
    }

    async fn error_for(&self, resp: reqwest::Response) -> ProviderError {
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
        ProviderError::Api { status, message }
    }
}

/// Embedding provider backed by `/v1/embeddings`
pub struct OpenAiEmbedding {
    client: OpenAiClient,
}

impl OpenAiEmbedding {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: OpenAiClient::new(config, EMBED_TIMEOUT)?,
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    fn name(&self) -> &'static str {
        "openai-embedding"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        #[derive(Deserialize)]
        struct EmbeddingsResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let model = self.client.model_name().await?.to_string();
        let url = format!("{}/embeddings", self.client.config.v1_base());
        let body = json!({
            "model": model,
            "input": text,
        });

        let resp = self
            .client
            .apply_auth(self.client.http.post(&url))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(self.client.error_for(resp).await);
        }

        let parsed: EmbeddingsResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("invalid embeddings response: {e}")))?;
        let mut vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::Parse("embeddings response has no data".to_string()))?;

        normalize_in_place(&mut vector)?;
        Ok(vector)
    }

    async fn health_check(&self) -> bool {
        self.client.check_server().await
    }
}

/// Generation provider backed by `/v1/chat/completions` (non-streaming)
pub struct OpenAiGeneration {
    client: OpenAiClient,
}

impl OpenAiGeneration {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: OpenAiClient::new(config, GENERATE_TIMEOUT)?,
        })
    }
}

#[async_trait::async_trait]
impl GenerationProvider for OpenAiGeneration {
    fn name(&self) -> &'static str {
        "openai-generation"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        if prompt.trim().is_empty() {
            return Err(ProviderError::EmptyInput);
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }

        #[derive(Deserialize)]
        struct Message {
            content: String,
        }

        let model = self.client.model_name().await?.to_string();
        let url = format!("{}/chat/completions", self.client.config.v1_base());
        let body = json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
        });

        let resp = self
            .client
            .apply_auth(self.client.http.post(&url))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(self.client.error_for(resp).await);
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("invalid chat response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::Parse("chat response has no choices".to_string()))
    }

    async fn health_check(&self) -> bool {
        self.client.check_server().await
    }
}
