//! Text chunking module for splitting raw text into embeddable windows
//!
//! Splits on whitespace and slides a fixed-size word window with overlap, so
//! consecutive chunks share context at their boundaries. The window start
//! advances by `chunk_size - overlap` tokens per step; the final window may
//! hold fewer than `chunk_size` tokens.

use crate::error::RagError;

/// Configuration for chunking behavior
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Window size in whitespace-delimited tokens
    pub chunk_size: usize,
    /// Tokens shared between consecutive windows; must be < `chunk_size`
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 100,
        }
    }
}

impl ChunkConfig {
    /// Validate that the window makes progress on every step.
    ///
    /// `overlap >= chunk_size` would mean a step of zero (or underflow) and
    /// an infinite loop, so it is rejected up front.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_size == 0 {
            return Err(RagError::Validation(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(RagError::Validation(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Split `text` into overlapping word windows.
///
/// Tokens are rejoined with single spaces, so original whitespace runs are
/// not preserved. Output order is significant: a chunk's position in the
/// returned sequence becomes its index at ingestion.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Result<Vec<String>, RagError> {
    config.validate()?;

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();

    let mut start = 0;
    while start < tokens.len() {
        let end = (start + config.chunk_size).min(tokens.len());
        chunks.push(tokens[start..end].join(" "));
        start += config.step();
    }

    Ok(chunks)
}
