//! Chunk store implementations
//!
//! Implements the `ChunkStore` port over a local sqlite file in WAL mode,
//! one store per branch.

mod sqlite;

pub use sqlite::{embedding_from_bytes, embedding_to_bytes, SqliteChunkStore};
