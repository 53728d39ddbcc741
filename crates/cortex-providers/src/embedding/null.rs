//! Null Embedding Provider
//!
//! Embeds every text as a zero vector. Used for wiring without a model
//! server and as a deterministic stand-in for tests.

use std::time::Duration;

use async_trait::async_trait;

use cortex_domain::constants::EMBEDDING_DIMENSION;
use cortex_domain::error::Result;
use cortex_domain::ports::providers::EmbeddingProvider;

/// Embedding provider that returns zero vectors
pub struct NullEmbeddingProvider {
    dimension: usize,
}

impl NullEmbeddingProvider {
    pub fn new() -> Self {
        Self {
            dimension: EMBEDDING_DIMENSION,
        }
    }

    /// Null provider with a custom dimensionality
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for NullEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for NullEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.0; self.dimension]).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn wait_ready(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}
