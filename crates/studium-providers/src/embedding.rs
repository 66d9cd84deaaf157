//! Embedding provider abstraction
//!
//! An embedding provider converts text into a fixed-dimension unit vector.
//! Vectors are unit-normalized before being returned, so cosine similarity
//! between any two of them reduces to a dot product. All implementations
//! must embed queries and documents in the same vector space.

use async_trait::async_trait;

use crate::error::ProviderError;

/// The trait all embedding backends implement.
///
/// Backends are HTTP-based and may be called concurrently; implementations
/// must be `Send + Sync` so the pipelines can fan out per-chunk embedding
/// across tasks.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &'static str;

    /// Embed a single text into a unit-normalized vector.
    ///
    /// Fails with [`ProviderError::EmptyInput`] when `text` is empty or
    /// whitespace-only, and with a transport/API error when the backing
    /// model cannot be invoked.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Health check - verify the backend is responding
    async fn health_check(&self) -> bool;
}

/// Scale `vector` to unit length in place.
///
/// Returns an error for zero-length or all-zero vectors, which cannot be
/// normalized and would poison cosine ranking downstream.
pub fn normalize_in_place(vector: &mut [f32]) -> Result<(), ProviderError> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return Err(ProviderError::Parse(format!(
            "embedding cannot be normalized (norm = {norm})"
        )));
    }
    for x in vector.iter_mut() {
        *x /= norm;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_produces_unit_vector() {
        let mut v = vec![3.0, 4.0];
        normalize_in_place(&mut v).unwrap();
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_rejects_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        assert!(normalize_in_place(&mut v).is_err());
    }

    #[test]
    fn normalize_rejects_empty_vector() {
        let mut v: Vec<f32> = Vec::new();
        assert!(normalize_in_place(&mut v).is_err());
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut v = vec![1.0, 2.0, 2.0];
        normalize_in_place(&mut v).unwrap();
        let first = v.clone();
        normalize_in_place(&mut v).unwrap();
        for (a, b) in first.iter().zip(v.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn trait_is_object_safe() {
        fn _assert(_: &dyn EmbeddingProvider) {}
    }
}
