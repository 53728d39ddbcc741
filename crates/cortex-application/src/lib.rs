//! Cortex application layer
//!
//! The domain services that make up one index call - file discovery, change
//! detection, chunking - and the orchestrator that wires them to the
//! provider ports.

pub mod change;
pub mod chunking;
pub mod discovery;
pub mod indexing;

pub use change::ChangeDetector;
pub use chunking::{ChunkDraft, Chunker};
pub use discovery::{DiscoveredFile, FileClass, FileDiscovery};
pub use indexing::{Indexer, IndexerOptions};
