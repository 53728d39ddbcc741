//! Provider ports

mod chunk_store;
mod embedding;
mod extraction;

pub use chunk_store::ChunkStore;
pub use embedding::EmbeddingProvider;
pub use extraction::ExtractionProvider;
