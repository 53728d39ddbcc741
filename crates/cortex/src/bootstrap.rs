//! Wiring for the binary
//!
//! Builds the per-project object graph: cache layout, branch store,
//! extractor set, embedding client, and the indexer. Construction is plain
//! `Arc<dyn Port>` injection; there is one implementation per port.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cortex_application::chunking::Chunker;
use cortex_application::discovery::FileDiscovery;
use cortex_application::indexing::{Indexer, IndexerOptions};
use cortex_domain::error::Result;
use cortex_domain::ports::infrastructure::{NullPostWriteHook, SourceControl};
use cortex_infrastructure::branch::BranchSynchronizer;
use cortex_infrastructure::cache::CacheLayout;
use cortex_infrastructure::config::AppConfig;
use cortex_infrastructure::git::GitSourceControl;
use cortex_providers::embedding::HttpEmbeddingProvider;
use cortex_providers::language::ExtractorSet;
use cortex_providers::store::SqliteChunkStore;

/// Branch name used when the project has no usable source control
pub const FALLBACK_BRANCH: &str = "default";

/// Everything the CLI commands need for one project
pub struct Project {
    pub root: PathBuf,
    pub config: AppConfig,
    pub layout: CacheLayout,
    pub source_control: Arc<dyn SourceControl>,
}

impl Project {
    pub fn open(root: &Path, config: AppConfig) -> Result<Self> {
        let layout = CacheLayout::resolve(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            layout,
            source_control: Arc::new(GitSourceControl::new(root)),
        })
    }

    /// Name of the branch to index: the checked-out git branch, or a fixed
    /// fallback outside a repository
    pub fn current_branch(&self) -> String {
        self.source_control
            .current_branch()
            .unwrap_or_else(|_| FALLBACK_BRANCH.to_string())
    }

    /// The branch synchronizer for this project
    pub fn branch_synchronizer(&self) -> BranchSynchronizer {
        BranchSynchronizer::new(
            self.root.clone(),
            self.layout.clone(),
            self.config.embedding.dimension,
            Arc::clone(&self.source_control),
        )
    }

    /// Discovery configured from the project's patterns
    pub fn discovery(&self) -> Result<FileDiscovery> {
        FileDiscovery::new(
            &self.root,
            &self.config.discovery.code_patterns,
            &self.config.discovery.docs_patterns,
            &self.config.discovery.ignore_patterns,
            Some(self.layout.root()),
        )
    }

    /// The HTTP embedding client configured for this project
    pub fn embedder(&self) -> HttpEmbeddingProvider {
        let embedding = &self.config.embedding;
        HttpEmbeddingProvider::new(
            embedding.endpoint.clone(),
            embedding.dimension,
            reqwest::Client::new(),
        )
        .with_batch_limits(embedding.batch_max_texts, embedding.batch_max_bytes)
        .with_concurrency(embedding.concurrency)
    }

    /// Build the indexer writing to the given branch store
    pub fn indexer(&self, store_path: &Path) -> Result<Indexer> {
        let embedder = self.embedder();
        let store = SqliteChunkStore::open(store_path, self.config.embedding.dimension)?;

        Ok(Indexer::new(
            self.discovery()?,
            Chunker::new().with_doc_window(
                self.config.docs.target_bytes,
                self.config.docs.overlap_bytes,
            ),
            Arc::new(ExtractorSet::new()),
            Arc::new(embedder),
            Arc::new(store),
            Arc::new(NullPostWriteHook::new()),
            IndexerOptions {
                workers: self.config.indexing.workers,
                failure_tolerance: self.config.indexing.failure_tolerance,
            },
        ))
    }
}
