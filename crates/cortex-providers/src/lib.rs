//! # Cortex - Provider Implementations
//!
//! Implementations of the ports defined in `cortex-domain`:
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Language | `Extractor` | Go, TypeScript, JavaScript, Python, Rust, C/C++, Java, PHP, Ruby |
//! | Embedding | `EmbeddingProvider` | Http, Null |
//! | Store | `ChunkStore` | Sqlite |
//!
//! Each language grammar sits behind a feature flag so minimal builds can
//! drop grammars they never dispatch to; the default enables all of them.

pub use cortex_domain::error::{Error, Result};
pub use cortex_domain::ports::providers::{ChunkStore, EmbeddingProvider};

/// Provider-specific constants
pub mod constants;

/// Language extractor implementations
pub mod language;

/// Embedding provider implementations
pub mod embedding;

/// Chunk store implementations
pub mod store;
