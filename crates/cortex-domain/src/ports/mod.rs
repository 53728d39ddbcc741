//! Domain ports
//!
//! Contracts implemented outside the domain: providers (embedding service,
//! chunk store) and infrastructure (source control, post-write hooks).

pub mod infrastructure;
pub mod providers;

pub use infrastructure::{PostWriteHook, SourceControl};
pub use providers::{ChunkStore, EmbeddingProvider, ExtractionProvider};
