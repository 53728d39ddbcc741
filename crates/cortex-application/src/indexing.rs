//! Indexing orchestrator
//!
//! Wires discovery, change detection, extraction, chunking, embedding, and
//! the chunk store into one index call. Files are processed by bounded
//! parallel workers; each file's persistence is one store transaction, so
//! cancellation can only lose uncommitted work.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use cortex_domain::constants::{INDEXING_FAILURE_TOLERANCE, INDEXING_WORKERS};
use cortex_domain::entities::{Chunk, Extraction, FileMeta, IndexStats, LineCounts};
use cortex_domain::error::{Error, Result};
use cortex_domain::hash::{chunk_id, content_hash};
use cortex_domain::ports::infrastructure::PostWriteHook;
use cortex_domain::ports::providers::{ChunkStore, EmbeddingProvider, ExtractionProvider};
use cortex_domain::value_objects::Language;

use crate::change::ChangeDetector;
use crate::chunking::Chunker;
use crate::discovery::{DiscoveredFile, FileClass, FileDiscovery};

/// Tunables for one indexer instance
#[derive(Debug, Clone)]
pub struct IndexerOptions {
    /// Parallel file workers
    pub workers: usize,
    /// Fraction of per-file failures tolerated before the call aborts
    pub failure_tolerance: f64,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            workers: INDEXING_WORKERS,
            failure_tolerance: INDEXING_FAILURE_TOLERANCE,
        }
    }
}

enum FileOutcome {
    Processed {
        class: FileClass,
        chunks: usize,
    },
    /// The grammar produced no tree; the file is skipped without a trace
    Skipped,
}

/// The indexing use case for one project root
pub struct Indexer {
    discovery: FileDiscovery,
    chunker: Chunker,
    extractors: Arc<dyn ExtractionProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ChunkStore>,
    hook: Arc<dyn PostWriteHook>,
    options: IndexerOptions,
}

impl Indexer {
    pub fn new(
        discovery: FileDiscovery,
        chunker: Chunker,
        extractors: Arc<dyn ExtractionProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn ChunkStore>,
        hook: Arc<dyn PostWriteHook>,
        options: IndexerOptions,
    ) -> Self {
        Self {
            discovery,
            chunker,
            extractors,
            embedder,
            store,
            hook,
            options,
        }
    }

    /// Store handle this indexer writes through
    pub fn store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    /// Run one index call. An empty hint means a full pass.
    pub async fn index(&self, hint: &[PathBuf]) -> Result<IndexStats> {
        self.index_with_cancellation(hint, &CancellationToken::new())
            .await
    }

    /// Run one index call under a cancellation token. Committed files stay
    /// committed; the returned stats cover the work done before
    /// cancellation.
    pub async fn index_with_cancellation(
        &self,
        hint: &[PathBuf],
        token: &CancellationToken,
    ) -> Result<IndexStats> {
        let started = Instant::now();
        let mut stats = IndexStats::default();

        self.store.init_schema().await?;

        let discovered = self.discovery.discover()?;
        let store_files = self.store.list_files().await?;
        let changeset =
            ChangeDetector::detect(self.discovery.root(), &discovered, &store_files, hint).await?;
        debug!(
            added = changeset.added.len(),
            modified = changeset.modified.len(),
            deleted = changeset.deleted.len(),
            unchanged = changeset.unchanged.len(),
            "change detection complete"
        );

        for path in &changeset.deleted {
            if token.is_cancelled() {
                stats.cancelled = true;
                stats.indexing_time_ms = started.elapsed().as_millis() as u64;
                return Ok(stats);
            }
            self.store.delete_file(path).await?;
            stats.files_deleted += 1;
        }

        let by_path: HashMap<&str, &DiscoveredFile> = discovered
            .iter()
            .map(|f| (f.rel_path.as_str(), f))
            .collect();

        let work: Vec<(&DiscoveredFile, bool)> = changeset
            .added
            .iter()
            .map(|p| (p, true))
            .chain(changeset.modified.iter().map(|p| (p, false)))
            .filter_map(|(p, added)| by_path.get(p.as_str()).map(|f| (*f, added)))
            .collect();
        let total_dirty = work.len();

        let futures: Vec<_> = work
            .into_iter()
            .map(|(file, added)| {
                let token = token.clone();
                async move {
                    let outcome = self.process_file(file, &token).await;
                    (added, file.class, outcome)
                }
            })
            .collect();
        let results: Vec<(bool, FileClass, Result<FileOutcome>)> = stream::iter(futures)
            .buffer_unordered(self.options.workers.max(1))
            .collect()
            .await;

        let mut failed = 0usize;
        for (added, class, outcome) in results {
            match outcome {
                Ok(FileOutcome::Processed { class, chunks }) => {
                    if added {
                        stats.files_added += 1;
                    } else {
                        stats.files_modified += 1;
                    }
                    match class {
                        FileClass::Code => {
                            stats.code_files_processed += 1;
                            stats.total_code_chunks += chunks;
                        }
                        FileClass::Docs => {
                            stats.docs_processed += 1;
                            stats.total_doc_chunks += chunks;
                        }
                    }
                }
                Ok(FileOutcome::Skipped) => {}
                Err(Error::Cancelled) => {
                    stats.cancelled = true;
                }
                Err(e) => {
                    warn!(class = ?class, error = %e, "file failed to index");
                    failed += 1;
                    stats.files_failed += 1;
                }
            }
        }

        for path in &changeset.mtime_drift {
            if token.is_cancelled() {
                stats.cancelled = true;
                break;
            }
            if let Some(file) = by_path.get(path.as_str()) {
                self.store.refresh_mtime(path, file.mtime).await?;
            }
        }

        if total_dirty > 0 {
            let fraction = failed as f64 / total_dirty as f64;
            if fraction > self.options.failure_tolerance {
                return Err(Error::internal(format!(
                    "{failed} of {total_dirty} files failed, above tolerance {}",
                    self.options.failure_tolerance
                )));
            }
        }

        stats.cancelled = stats.cancelled || token.is_cancelled();
        stats.indexing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            files_added = stats.files_added,
            files_modified = stats.files_modified,
            files_deleted = stats.files_deleted,
            files_failed = stats.files_failed,
            chunks = stats.total_chunks(),
            elapsed_ms = stats.indexing_time_ms,
            "index call finished"
        );
        Ok(stats)
    }

    fn file_meta(file: &DiscoveredFile, bytes: &[u8], binary: bool, content: &str) -> FileMeta {
        let language = Language::from_path(&file.rel_path);
        let tag = match (binary, file.class) {
            (true, _) => "binary".to_string(),
            (false, FileClass::Docs) => "doc".to_string(),
            (false, FileClass::Code) => language
                .map(|l| l.tag().to_string())
                .unwrap_or_else(|| "code".to_string()),
        };
        let lines = if binary {
            LineCounts::default()
        } else {
            LineCounts::analyze(content, language)
        };
        FileMeta {
            module_path: FileMeta::module_path_of(&file.rel_path),
            is_test: language
                .map(|l| l.is_test_path(&file.rel_path))
                .unwrap_or(false),
            path: file.rel_path.clone(),
            language: tag,
            size_bytes: bytes.len() as u64,
            file_hash: content_hash(bytes),
            last_modified: file.mtime,
            lines,
            indexed_at: Utc::now(),
        }
    }

    async fn process_file(
        &self,
        file: &DiscoveredFile,
        token: &CancellationToken,
    ) -> Result<FileOutcome> {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let bytes = tokio::fs::read(&file.abs_path)
            .await
            .map_err(|e| Error::io_with_source(format!("failed to read {}", file.rel_path), e))?;
        let binary = bytes.contains(&0);
        let content = if binary {
            String::new()
        } else {
            String::from_utf8_lossy(&bytes).into_owned()
        };
        let meta = Self::file_meta(file, &bytes, binary, &content);

        if binary {
            self.store.upsert_file(&meta, None).await?;
            self.invoke_hook(&meta, None).await;
            return Ok(FileOutcome::Processed {
                class: file.class,
                chunks: 0,
            });
        }

        let mut extraction: Option<Extraction> = None;
        let drafts = match file.class {
            FileClass::Code => {
                match self.extractors.extract(&file.rel_path, &content)? {
                    // No parse tree at all: silently skip the file
                    None => return Ok(FileOutcome::Skipped),
                    Some(e) => {
                        let drafts = self.chunker.chunk_code(&file.rel_path, &e);
                        extraction = Some(e);
                        drafts
                    }
                }
            }
            FileClass::Docs => self.chunker.chunk_docs(&file.rel_path, &content),
        };

        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // A file with no chunks is still written so change detection sees it
        // next run
        if drafts.is_empty() {
            self.store.upsert_file(&meta, Some(&content)).await?;
            self.invoke_hook(&meta, extraction.as_ref()).await;
            return Ok(FileOutcome::Processed {
                class: file.class,
                chunks: 0,
            });
        }

        let texts: Vec<String> = drafts.iter().map(|d| d.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != drafts.len() {
            return Err(Error::embedding(format!(
                "got {} vectors for {} chunks of {}",
                vectors.len(),
                drafts.len(),
                file.rel_path
            )));
        }

        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let now = Utc::now();
        let chunks: Vec<Chunk> = drafts
            .into_iter()
            .zip(vectors)
            .map(|(draft, embedding)| Chunk {
                id: chunk_id(&file.rel_path, draft.chunk_type, draft.ordinal),
                file_path: file.rel_path.clone(),
                chunk_type: draft.chunk_type,
                title: draft.title,
                text: draft.text,
                start_line: draft.start_line,
                end_line: draft.end_line,
                embedding,
                created_at: now,
                updated_at: now,
            })
            .collect();
        let chunk_count = chunks.len();

        self.store.upsert_file(&meta, Some(&content)).await?;
        self.store.upsert_chunks(&chunks).await?;
        self.invoke_hook(&meta, extraction.as_ref()).await;

        Ok(FileOutcome::Processed {
            class: file.class,
            chunks: chunk_count,
        })
    }

    /// Post-write hook failures are logged and never fail the file
    async fn invoke_hook(&self, meta: &FileMeta, extraction: Option<&Extraction>) {
        if let Err(e) = self.hook.file_indexed(meta, extraction).await {
            warn!(path = %meta.path, error = %e, "post-write hook failed");
        }
    }
}
