//! Cortex domain layer
//!
//! Core business types for the indexing engine: file metadata, chunks,
//! extractions, changesets, the error type, and the ports implemented by
//! providers and infrastructure. This crate has no I/O of its own.

pub mod constants;
pub mod entities;
pub mod error;
pub mod hash;
pub mod ports;
pub mod value_objects;

pub use entities::{
    ChangeSet, Chunk, ChunkType, DataSymbol, Definition, Extraction, FileMeta, FunctionSymbol,
    IndexStats, LineCounts, SymbolKind, TypeSymbol,
};
pub use error::{Error, Result};
pub use value_objects::Language;
