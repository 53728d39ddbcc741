//! Embedding Provider Port
//!
//! Contract for turning chunk texts into fixed-dimension vectors. The
//! production implementation talks HTTP to the embedded model server; tests
//! substitute a deterministic stub.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Port for the external embedding service
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts.
    ///
    /// Returns one vector per input text, each of length [`dimension`].
    /// The call succeeds or fails atomically: on any transport or service
    /// failure the whole call fails with `Error::Embedding` and the caller
    /// must not persist partial results.
    ///
    /// [`dimension`]: EmbeddingProvider::dimension
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Fixed dimensionality of every vector this provider produces
    fn dimension(&self) -> usize;

    /// Poll the service until it reports ready or the timeout elapses
    async fn wait_ready(&self, timeout: Duration) -> Result<()>;
}
