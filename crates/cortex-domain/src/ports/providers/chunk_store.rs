//! Chunk Store Port
//!
//! Transactional writer/reader over one per-branch store. Implementations
//! expose a single-writer discipline; readers may proceed concurrently.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Chunk, FileMeta};
use crate::error::Result;

/// Port for the per-branch chunk store
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Create tables and record the current schema version. Idempotent.
    async fn init_schema(&self) -> Result<()>;

    /// Read the store's recorded schema version
    async fn schema_version(&self) -> Result<i64>;

    /// Insert or replace one File row. A non-null `content` replaces any
    /// previous content; `None` marks the file binary.
    async fn upsert_file(&self, meta: &FileMeta, content: Option<&str>) -> Result<()>;

    /// Replace the chunks of every file present in the batch, inside one
    /// transaction: delete existing rows per file, insert the new ones, and
    /// advance the files' `indexed_at`. A failure rolls the whole batch back.
    async fn upsert_chunks(&self, chunks: &[Chunk]) -> Result<()>;

    /// Delete the File row; chunk rows cascade
    async fn delete_file(&self, path: &str) -> Result<()>;

    /// Read one file's metadata
    async fn read_file_meta(&self, path: &str) -> Result<Option<FileMeta>>;

    /// Read one file's stored content; `Ok(Some(None))` is a binary file
    async fn read_content(&self, path: &str) -> Result<Option<Option<String>>>;

    /// List metadata for every tracked file
    async fn list_files(&self) -> Result<Vec<FileMeta>>;

    /// Read the chunks of one file, ordered by chunk id
    async fn read_chunks(&self, path: &str) -> Result<Vec<Chunk>>;

    /// Refresh a file's last-modified timestamp without touching content,
    /// hash, or chunks (the mtime-drift path)
    async fn refresh_mtime(&self, path: &str, mtime: DateTime<Utc>) -> Result<()>;

    /// Copy File rows and all their Chunk rows verbatim from an ancestor
    /// store for every path in `paths`, inside one transaction in this
    /// store. Chunk `updated_at` is bumped; `created_at` is preserved.
    /// Returns the number of files copied.
    async fn copy_matching_from(&self, ancestor_db: &Path, paths: &[String]) -> Result<usize>;
}
