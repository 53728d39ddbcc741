//! Domain layer constants
//!
//! Constants that are part of the indexing domain logic and shared by the
//! application layer. Infrastructure-specific defaults live with the
//! configuration types.

// ============================================================================
// EMBEDDING DOMAIN CONSTANTS
// ============================================================================

/// Dimensionality of chunk embeddings stored in a branch store
pub const EMBEDDING_DIMENSION: usize = 384;

/// Maximum number of texts sent to the embedding service in one request
pub const EMBEDDING_BATCH_MAX_TEXTS: usize = 32;

/// Maximum total payload bytes per embedding request
pub const EMBEDDING_BATCH_MAX_BYTES: usize = 256 * 1024;

/// Concurrent in-flight embedding requests
pub const EMBEDDING_MAX_CONCURRENCY: usize = 4;

// ============================================================================
// CHUNKING DOMAIN CONSTANTS
// ============================================================================

/// Target byte size for a single doc chunk
pub const DOC_CHUNK_TARGET_BYTES: usize = 2048;

/// Overlap carried between consecutive doc chunks
pub const DOC_CHUNK_OVERLAP_BYTES: usize = 256;

/// Number of hex characters kept from the chunk-id digest
pub const CHUNK_ID_LENGTH: usize = 16;

// ============================================================================
// STORE DOMAIN CONSTANTS
// ============================================================================

/// Current branch store schema version
pub const SCHEMA_VERSION: i64 = 2;

// ============================================================================
// INDEXING DOMAIN CONSTANTS
// ============================================================================

/// Default number of parallel file workers in one index call
pub const INDEXING_WORKERS: usize = 8;

/// Fraction of per-file failures tolerated before an index call aborts
pub const INDEXING_FAILURE_TOLERANCE: f64 = 1.0;

/// Default debounce window for the filesystem watcher, in milliseconds
pub const WATCH_DEBOUNCE_MS: u64 = 500;
