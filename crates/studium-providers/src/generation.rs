//! Text-generation provider abstraction
//!
//! A generation provider turns a fully assembled prompt into natural-language
//! text. The query pipeline treats generation failures as recoverable and
//! falls back to a degraded answer, so implementations should surface errors
//! rather than retry internally.

use async_trait::async_trait;

use crate::error::ProviderError;

/// The trait all generation backends implement
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &'static str;

    /// Generate a completion for the given prompt.
    ///
    /// Returns the full response text (non-streaming).
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Health check - verify the backend is responding
    async fn health_check(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_object_safe() {
        fn _assert(_: &dyn GenerationProvider) {}
    }

    #[test]
    fn trait_object_is_send_sync() {
        fn _assert<T: Send + Sync>() {}
        _assert::<Box<dyn GenerationProvider>>();
    }
}
