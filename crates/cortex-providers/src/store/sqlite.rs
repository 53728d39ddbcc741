//! Sqlite Chunk Store
//!
//! One sqlite file per branch, WAL journal, single writer. Embeddings live
//! in a fixed-dimension vector column packed as little-endian f32; the
//! `chunks → files` foreign key cascades deletes so a file removal cannot
//! leave orphan chunks.
//!
//! All sqlite work runs on the blocking pool; the connection is guarded by a
//! mutex, which is the store's single-writer discipline.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use cortex_domain::constants::SCHEMA_VERSION;
use cortex_domain::entities::{Chunk, ChunkType, FileMeta, LineCounts};
use cortex_domain::error::{Error, Result};
use cortex_domain::ports::providers::ChunkStore;

use crate::constants::STORE_BUSY_TIMEOUT_MS;

/// Pack an embedding as little-endian f32 bytes for the vector column
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Unpack a vector column value back into f32s
pub fn embedding_from_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_ts(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::store(format!("invalid timestamp {text:?}: {e}")))
}

fn store_err(context: &str, e: rusqlite::Error) -> Error {
    Error::store_with_source(context.to_string(), e)
}

/// Sqlite-backed chunk store for one branch
pub struct SqliteChunkStore {
    path: PathBuf,
    dimension: usize,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteChunkStore {
    /// Open (or create) the store file at `path` with the given embedding
    /// dimension. Sets WAL journal mode, foreign keys, and a busy timeout.
    pub fn open(path: &Path, dimension: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::io_with_source(
                    format!("failed to create store directory {}", parent.display()),
                    e,
                )
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|e| store_err("failed to open branch store", e))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| store_err("failed to enable WAL", e))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| store_err("failed to enable foreign keys", e))?;
        conn.busy_timeout(std::time::Duration::from_millis(STORE_BUSY_TIMEOUT_MS))
            .map_err(|e| store_err("failed to set busy timeout", e))?;
        tracing::debug!(path = %path.display(), dimension, "opened branch store");
        Ok(Self {
            path: path.to_path_buf(),
            dimension,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Location of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Embedding dimensionality this store was opened with
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| Error::store("store mutex poisoned"))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| Error::internal(format!("store task join failed: {e}")))?
    }

    fn row_to_meta(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileMeta> {
        Ok(FileMeta {
            path: row.get("file_path")?,
            language: row.get("language")?,
            module_path: row.get("module_path")?,
            is_test: row.get::<_, i64>("is_test")? != 0,
            lines: LineCounts {
                total: row.get::<_, i64>("line_count_total")? as u32,
                code: row.get::<_, i64>("line_count_code")? as u32,
                comment: row.get::<_, i64>("line_count_comment")? as u32,
                blank: row.get::<_, i64>("line_count_blank")? as u32,
            },
            size_bytes: row.get::<_, i64>("size_bytes")? as u64,
            file_hash: row.get("file_hash")?,
            last_modified: DateTime::UNIX_EPOCH, // patched by the caller
            indexed_at: DateTime::UNIX_EPOCH,
        })
    }

    fn read_meta_inner(conn: &Connection, path: &str) -> Result<Option<FileMeta>> {
        let result = conn
            .query_row(
                "SELECT file_path, language, module_path, is_test,
                        line_count_total, line_count_code, line_count_comment, line_count_blank,
                        size_bytes, file_hash, last_modified, indexed_at
                 FROM files WHERE file_path = ?1",
                params![path],
                |row| {
                    let meta = Self::row_to_meta(row)?;
                    let last_modified: String = row.get("last_modified")?;
                    let indexed_at: String = row.get("indexed_at")?;
                    Ok((meta, last_modified, indexed_at))
                },
            )
            .optional()
            .map_err(|e| store_err("failed to read file metadata", e))?;

        match result {
            Some((mut meta, last_modified, indexed_at)) => {
                meta.last_modified = parse_ts(&last_modified)?;
                meta.indexed_at = parse_ts(&indexed_at)?;
                Ok(Some(meta))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ChunkStore for SqliteChunkStore {
    async fn init_schema(&self) -> Result<()> {
        let dimension = self.dimension;
        self.with_conn(move |conn| {
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS files (
                    file_path          TEXT PRIMARY KEY,
                    language           TEXT NOT NULL,
                    module_path        TEXT NOT NULL,
                    is_test            INTEGER NOT NULL DEFAULT 0,
                    line_count_total   INTEGER NOT NULL DEFAULT 0,
                    line_count_code    INTEGER NOT NULL DEFAULT 0,
                    line_count_comment INTEGER NOT NULL DEFAULT 0,
                    line_count_blank   INTEGER NOT NULL DEFAULT 0,
                    size_bytes         INTEGER NOT NULL DEFAULT 0,
                    file_hash          TEXT NOT NULL,
                    content            TEXT,
                    last_modified      TEXT NOT NULL,
                    indexed_at         TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS chunks (
                    chunk_id   TEXT PRIMARY KEY,
                    file_path  TEXT NOT NULL REFERENCES files(file_path) ON DELETE CASCADE,
                    chunk_type TEXT NOT NULL,
                    title      TEXT NOT NULL,
                    text       TEXT NOT NULL,
                    start_line INTEGER NOT NULL,
                    end_line   INTEGER NOT NULL,
                    embedding  VECTOR({dimension}) NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_chunks_file_path ON chunks(file_path);
                CREATE TABLE IF NOT EXISTS schema_version (
                    version INTEGER NOT NULL
                );"
            );
            conn.execute_batch(&ddl)
                .map_err(|e| store_err("failed to create schema", e))?;

            let existing: Option<i64> = conn
                .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(|e| store_err("failed to read schema version", e))?;
            match existing {
                None => {
                    conn.execute(
                        "INSERT INTO schema_version (version) VALUES (?1)",
                        params![SCHEMA_VERSION],
                    )
                    .map_err(|e| store_err("failed to record schema version", e))?;
                    Ok(())
                }
                Some(v) if v == SCHEMA_VERSION => Ok(()),
                Some(v) => Err(Error::SchemaVersionMismatch {
                    found: v,
                    expected: SCHEMA_VERSION,
                }),
            }
        })
        .await
    }

    async fn schema_version(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let has_table: Option<String> = conn
                .query_row(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
                    [],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| store_err("failed to inspect schema", e))?;
            if has_table.is_none() {
                return Ok(0);
            }
            let version: Option<i64> = conn
                .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(|e| store_err("failed to read schema version", e))?;
            Ok(version.unwrap_or(0))
        })
        .await
    }

    async fn upsert_file(&self, meta: &FileMeta, content: Option<&str>) -> Result<()> {
        let meta = meta.clone();
        let content = content.map(|s| s.to_string());
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO files (file_path, language, module_path, is_test,
                                    line_count_total, line_count_code, line_count_comment, line_count_blank,
                                    size_bytes, file_hash, content, last_modified, indexed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 ON CONFLICT(file_path) DO UPDATE SET
                    language = excluded.language,
                    module_path = excluded.module_path,
                    is_test = excluded.is_test,
                    line_count_total = excluded.line_count_total,
                    line_count_code = excluded.line_count_code,
                    line_count_comment = excluded.line_count_comment,
                    line_count_blank = excluded.line_count_blank,
                    size_bytes = excluded.size_bytes,
                    file_hash = excluded.file_hash,
                    content = excluded.content,
                    last_modified = excluded.last_modified,
                    indexed_at = excluded.indexed_at",
                params![
                    meta.path,
                    meta.language,
                    meta.module_path,
                    meta.is_test as i64,
                    meta.lines.total as i64,
                    meta.lines.code as i64,
                    meta.lines.comment as i64,
                    meta.lines.blank as i64,
                    meta.size_bytes as i64,
                    meta.file_hash,
                    content,
                    format_ts(meta.last_modified),
                    format_ts(meta.indexed_at),
                ],
            )
            .map_err(|e| store_err("failed to upsert file", e))?;
            Ok(())
        })
        .await
    }

    async fn upsert_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        let dimension = self.dimension;
        for chunk in chunks {
            chunk.validate(dimension)?;
        }
        let chunks = chunks.to_vec();
        self.with_conn(move |conn| {
            let tx = conn
                .transaction()
                .map_err(|e| store_err("failed to begin chunk transaction", e))?;
            {
                let mut paths: Vec<&str> = chunks.iter().map(|c| c.file_path.as_str()).collect();
                paths.sort_unstable();
                paths.dedup();

                let now = format_ts(Utc::now());
                for path in &paths {
                    tx.execute("DELETE FROM chunks WHERE file_path = ?1", params![path])
                        .map_err(|e| store_err("failed to clear previous chunks", e))?;
                    tx.execute(
                        "UPDATE files SET indexed_at = ?1 WHERE file_path = ?2",
                        params![now, path],
                    )
                    .map_err(|e| store_err("failed to touch indexed_at", e))?;
                }

                let mut insert = tx
                    .prepare(
                        "INSERT INTO chunks (chunk_id, file_path, chunk_type, title, text,
                                             start_line, end_line, embedding, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    )
                    .map_err(|e| store_err("failed to prepare chunk insert", e))?;
                for chunk in &chunks {
                    insert
                        .execute(params![
                            chunk.id,
                            chunk.file_path,
                            chunk.chunk_type.as_str(),
                            chunk.title,
                            chunk.text,
                            chunk.start_line as i64,
                            chunk.end_line as i64,
                            embedding_to_bytes(&chunk.embedding),
                            format_ts(chunk.created_at),
                            format_ts(chunk.updated_at),
                        ])
                        .map_err(|e| store_err("failed to insert chunk", e))?;
                }
            }
            tx.commit()
                .map_err(|e| store_err("failed to commit chunk transaction", e))?;
            Ok(())
        })
        .await
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        let path = path.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM files WHERE file_path = ?1", params![path])
                .map_err(|e| store_err("failed to delete file", e))?;
            Ok(())
        })
        .await
    }

    async fn read_file_meta(&self, path: &str) -> Result<Option<FileMeta>> {
        let path = path.to_string();
        self.with_conn(move |conn| Self::read_meta_inner(conn, &path)).await
    }

    async fn read_content(&self, path: &str) -> Result<Option<Option<String>>> {
        let path = path.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT content FROM files WHERE file_path = ?1",
                params![path],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .map_err(|e| store_err("failed to read file content", e))
        })
        .await
    }

    async fn list_files(&self) -> Result<Vec<FileMeta>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT file_path, language, module_path, is_test,
                            line_count_total, line_count_code, line_count_comment, line_count_blank,
                            size_bytes, file_hash, last_modified, indexed_at
                     FROM files ORDER BY file_path",
                )
                .map_err(|e| store_err("failed to prepare file listing", e))?;
            let rows = stmt
                .query_map([], |row| {
                    let meta = Self::row_to_meta(row)?;
                    let last_modified: String = row.get("last_modified")?;
                    let indexed_at: String = row.get("indexed_at")?;
                    Ok((meta, last_modified, indexed_at))
                })
                .map_err(|e| store_err("failed to list files", e))?;

            let mut files = Vec::new();
            for row in rows {
                let (mut meta, last_modified, indexed_at) =
                    row.map_err(|e| store_err("failed to read file row", e))?;
                meta.last_modified = parse_ts(&last_modified)?;
                meta.indexed_at = parse_ts(&indexed_at)?;
                files.push(meta);
            }
            Ok(files)
        })
        .await
    }

    async fn read_chunks(&self, path: &str) -> Result<Vec<Chunk>> {
        let path = path.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT chunk_id, file_path, chunk_type, title, text,
                            start_line, end_line, embedding, created_at, updated_at
                     FROM chunks WHERE file_path = ?1 ORDER BY chunk_id",
                )
                .map_err(|e| store_err("failed to prepare chunk read", e))?;
            let rows = stmt
                .query_map(params![path], |row| {
                    Ok((
                        row.get::<_, String>("chunk_id")?,
                        row.get::<_, String>("file_path")?,
                        row.get::<_, String>("chunk_type")?,
                        row.get::<_, String>("title")?,
                        row.get::<_, String>("text")?,
                        row.get::<_, i64>("start_line")?,
                        row.get::<_, i64>("end_line")?,
                        row.get::<_, Vec<u8>>("embedding")?,
                        row.get::<_, String>("created_at")?,
                        row.get::<_, String>("updated_at")?,
                    ))
                })
                .map_err(|e| store_err("failed to read chunks", e))?;

            let mut chunks = Vec::new();
            for row in rows {
                let (id, file_path, chunk_type, title, text, start, end, embedding, created, updated) =
                    row.map_err(|e| store_err("failed to read chunk row", e))?;
                chunks.push(Chunk {
                    id,
                    file_path,
                    chunk_type: ChunkType::parse(&chunk_type)?,
                    title,
                    text,
                    start_line: start as u32,
                    end_line: end as u32,
                    embedding: embedding_from_bytes(&embedding),
                    created_at: parse_ts(&created)?,
                    updated_at: parse_ts(&updated)?,
                });
            }
            Ok(chunks)
        })
        .await
    }

    async fn refresh_mtime(&self, path: &str, mtime: DateTime<Utc>) -> Result<()> {
        let path = path.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "UPDATE files SET last_modified = ?1 WHERE file_path = ?2",
                params![format_ts(mtime), path],
            )
            .map_err(|e| store_err("failed to refresh mtime", e))?;
            Ok(())
        })
        .await
    }

    async fn copy_matching_from(&self, ancestor_db: &Path, paths: &[String]) -> Result<usize> {
        if paths.is_empty() {
            return Ok(0);
        }
        let ancestor = ancestor_db.to_string_lossy().to_string();
        let paths = paths.to_vec();
        self.with_conn(move |conn| {
            // ATTACH cannot run inside a transaction; the copy itself is one
            conn.execute("ATTACH DATABASE ?1 AS ancestor", params![ancestor])
                .map_err(|e| store_err("failed to attach ancestor store", e))?;

            let copy = |conn: &mut Connection| -> Result<usize> {
                let tx = conn
                    .transaction()
                    .map_err(|e| store_err("failed to begin copy transaction", e))?;
                let mut copied = 0usize;
                {
                    let now = format_ts(Utc::now());
                    for path in &paths {
                        let changed = tx
                            .execute(
                                "INSERT OR REPLACE INTO files
                                 SELECT * FROM ancestor.files WHERE file_path = ?1",
                                params![path],
                            )
                            .map_err(|e| store_err("failed to copy file row", e))?;
                        if changed == 0 {
                            continue;
                        }
                        tx.execute(
                            "INSERT OR REPLACE INTO chunks
                                 (chunk_id, file_path, chunk_type, title, text,
                                  start_line, end_line, embedding, created_at, updated_at)
                             SELECT chunk_id, file_path, chunk_type, title, text,
                                    start_line, end_line, embedding, created_at, ?2
                             FROM ancestor.chunks WHERE file_path = ?1",
                            params![path, now],
                        )
                        .map_err(|e| store_err("failed to copy chunk rows", e))?;
                        copied += 1;
                    }
                }
                tx.commit()
                    .map_err(|e| store_err("failed to commit copy transaction", e))?;
                Ok(copied)
            };
            let result = copy(conn);

            // Detach even when the copy failed, then surface the first error
            let detach = conn
                .execute("DETACH DATABASE ancestor", [])
                .map_err(|e| store_err("failed to detach ancestor store", e));
            match (result, detach) {
                (Ok(copied), Ok(_)) => Ok(copied),
                (Err(e), _) => Err(e),
                (_, Err(e)) => Err(e),
            }
        })
        .await
    }
}
