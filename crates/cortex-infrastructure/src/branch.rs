//! Branch-store preparation
//!
//! Indexing a branch for the first time should not re-embed files the
//! ancestor branch already carries. The synchronizer picks the existing
//! branch store with the newest merge-base, hashes the tracked files on
//! disk, and copies hash-matching File and Chunk rows verbatim into the new
//! store in one transaction. Everything else is left to be discovered as
//! added or modified by the next index call.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use cortex_domain::constants::SCHEMA_VERSION;
use cortex_domain::error::{Error, Result};
use cortex_domain::hash::content_hash;
use cortex_domain::ports::infrastructure::SourceControl;
use cortex_domain::ports::providers::ChunkStore;
use cortex_providers::store::SqliteChunkStore;

use crate::cache::CacheLayout;

/// Concurrent file hashing bound during ancestor matching
const HASH_CONCURRENCY: usize = 8;

/// Prepares per-branch stores, copying from the nearest ancestor
pub struct BranchSynchronizer {
    project_root: PathBuf,
    layout: CacheLayout,
    dimension: usize,
    source_control: Arc<dyn SourceControl>,
    locks: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl BranchSynchronizer {
    pub fn new(
        project_root: PathBuf,
        layout: CacheLayout,
        dimension: usize,
        source_control: Arc<dyn SourceControl>,
    ) -> Self {
        Self {
            project_root,
            layout,
            dimension,
            source_control,
            locks: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    async fn branch_lock(&self, branch: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(branch.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Prepare the store for `branch` and return its path
    pub async fn prepare_store(&self, branch: &str) -> Result<PathBuf> {
        self.prepare_store_with_cancellation(branch, &CancellationToken::new())
            .await
    }

    /// Prepare the store for `branch` under a cancellation token.
    ///
    /// Concurrent calls for the same branch serialize on a per-branch lock;
    /// one performs the work and the rest observe the existing store.
    pub async fn prepare_store_with_cancellation(
        &self,
        branch: &str,
        token: &CancellationToken,
    ) -> Result<PathBuf> {
        let lock = self.branch_lock(branch).await;
        let _guard = lock.lock().await;

        let store_path = self.layout.branch_store_path(branch);
        if store_path.exists() {
            let store = SqliteChunkStore::open(&store_path, self.dimension)?;
            if store.schema_version().await? == SCHEMA_VERSION {
                debug!(branch, "branch store already prepared");
                return Ok(store_path);
            }
            // A stale-schema store cannot be upgraded in place; rebuild it
            drop(store);
            Self::remove_store_files(&store_path)?;
        }

        let ancestor = self.nearest_ancestor(branch)?;

        let store = SqliteChunkStore::open(&store_path, self.dimension)?;
        store.init_schema().await?;

        let Some((ancestor_branch, ancestor_path)) = ancestor else {
            info!(branch, "no indexed ancestor branch; created empty store");
            return Ok(store_path);
        };

        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let disk_hashes = self.hash_tracked_files().await?;
        let ancestor_store = SqliteChunkStore::open(&ancestor_path, self.dimension)?;
        let ancestor_files = ancestor_store.list_files().await?;

        let matching: Vec<String> = ancestor_files
            .iter()
            .filter(|meta| {
                disk_hashes
                    .get(&meta.path)
                    .map(|hash| *hash == meta.file_hash)
                    .unwrap_or(false)
            })
            .map(|meta| meta.path.clone())
            .collect();

        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let copied = store
            .copy_matching_from(&ancestor_path, &matching)
            .await?;
        info!(
            branch,
            ancestor = ancestor_branch,
            copied,
            tracked = disk_hashes.len(),
            "prepared branch store from ancestor"
        );
        Ok(store_path)
    }

    /// The existing branch store with the newest merge-base against `branch`
    fn nearest_ancestor(&self, branch: &str) -> Result<Option<(String, PathBuf)>> {
        let mut best: Option<(i64, String, PathBuf)> = None;
        for (candidate, path) in self.layout.existing_branch_stores()? {
            if candidate == branch {
                continue;
            }
            // Outside a repository there is no ancestry to consult
            let Ok(Some(time)) = self.source_control.merge_base_time(branch, &candidate) else {
                continue;
            };
            let newer = best.as_ref().map(|(t, _, _)| time > *t).unwrap_or(true);
            if newer {
                best = Some((time, candidate, path));
            }
        }
        Ok(best.map(|(_, candidate, path)| (candidate, path)))
    }

    /// Content hashes of the tracked files currently on disk
    async fn hash_tracked_files(&self) -> Result<HashMap<String, String>> {
        let tracked = self.source_control.tracked_files()?;
        let hashes: Vec<Option<(String, String)>> = stream::iter(tracked.into_iter().map(|rel| {
            let abs = self.project_root.join(&rel);
            async move {
                // Files deleted from the work tree fall out of matching
                let bytes = tokio::fs::read(&abs).await.ok()?;
                Some((rel, content_hash(&bytes)))
            }
        }))
        .buffer_unordered(HASH_CONCURRENCY)
        .collect()
        .await;
        Ok(hashes.into_iter().flatten().collect())
    }

    fn remove_store_files(store_path: &PathBuf) -> Result<()> {
        for suffix in ["", "-wal", "-shm"] {
            let path = PathBuf::from(format!("{}{}", store_path.display(), suffix));
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| {
                    Error::io_with_source(format!("failed to remove {}", path.display()), e)
                })?;
            }
        }
        Ok(())
    }
}
