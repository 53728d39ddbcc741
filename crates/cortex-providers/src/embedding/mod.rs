//! Embedding provider implementations
//!
//! Implements the `EmbeddingProvider` port. The production path talks HTTP
//! to the embedded model server; the null provider embeds everything as a
//! zero vector for wiring and tests.

mod http;
mod null;

pub use http::HttpEmbeddingProvider;
pub use null::NullEmbeddingProvider;
