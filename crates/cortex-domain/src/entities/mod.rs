//! Domain entities
//!
//! Owning value types moved through the indexing pipeline and persisted to
//! the per-branch store.

mod changeset;
mod chunk;
mod extraction;
mod file;
mod stats;

pub use changeset::ChangeSet;
pub use chunk::{Chunk, ChunkType};
pub use extraction::{
    DataSymbol, Definition, Extraction, FunctionSymbol, SymbolKind, TypeSymbol,
};
pub use file::{FileMeta, LineCounts};
pub use stats::IndexStats;
