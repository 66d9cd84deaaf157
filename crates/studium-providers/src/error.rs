//! Error types for provider operations

/// Errors that can occur when calling an embedding or generation backend
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("provider not reachable: {0}")]
    Unreachable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Whether the operation may succeed if retried (transient failures)
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Http(e) => e.is_timeout() || e.is_connect(),
            ProviderError::Unreachable(_) => true,
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
