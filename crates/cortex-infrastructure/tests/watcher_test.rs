//! Filesystem watcher tests
//!
//! Timing-sensitive by nature; the assertions poll with generous deadlines
//! instead of assuming exact delivery latencies.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use cortex_application::chunking::Chunker;
use cortex_application::discovery::FileDiscovery;
use cortex_application::indexing::{Indexer, IndexerOptions};
use cortex_domain::ports::infrastructure::NullPostWriteHook;
use cortex_domain::ports::providers::ChunkStore;
use cortex_infrastructure::watcher::FileWatcher;
use cortex_providers::embedding::NullEmbeddingProvider;
use cortex_providers::language::ExtractorSet;
use cortex_providers::store::SqliteChunkStore;

const DIM: usize = 8;

fn build(root: &Path, store_dir: &Path) -> (FileDiscovery, Arc<Indexer>, Arc<SqliteChunkStore>) {
    let discovery = FileDiscovery::new(
        root,
        &["**/*.go".to_string()],
        &[],
        &["**/.git/**".to_string()],
        None,
    )
    .unwrap();
    let store = Arc::new(SqliteChunkStore::open(&store_dir.join("watch.db"), DIM).unwrap());
    let indexer = Arc::new(Indexer::new(
        discovery.clone(),
        Chunker::new(),
        Arc::new(ExtractorSet::new()),
        Arc::new(NullEmbeddingProvider::with_dimension(DIM)),
        Arc::clone(&store) as Arc<dyn ChunkStore>,
        Arc::new(NullPostWriteHook::new()),
        IndexerOptions::default(),
    ));
    (discovery, indexer, store)
}

async fn wait_for_file(store: &SqliteChunkStore, path: &str, deadline: Duration) -> bool {
    let started = tokio::time::Instant::now();
    while started.elapsed() < deadline {
        if store.read_file_meta(path).await.unwrap().is_some() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_triggers_incremental_index() {
    let project = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let (discovery, indexer, store) = build(project.path(), cache.path());

    let mut watcher =
        FileWatcher::start(discovery, indexer, Duration::from_millis(100)).unwrap();

    std::fs::write(
        project.path().join("hot.go"),
        "package hot\n\nfunc Reload() {\n}\n",
    )
    .unwrap();

    assert!(
        wait_for_file(&store, "hot.go", Duration::from_secs(10)).await,
        "watched file was never indexed"
    );
    watcher.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ignored_paths_never_trigger() {
    let project = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let (discovery, indexer, store) = build(project.path(), cache.path());

    let mut watcher =
        FileWatcher::start(discovery, indexer, Duration::from_millis(100)).unwrap();

    std::fs::write(project.path().join("notes.txt"), "not admitted\n").unwrap();
    // A txt file matches no pattern; give the pipeline time to (not) react
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(store.list_files().await.unwrap().is_empty());
    watcher.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stop_is_idempotent_and_fast() {
    let project = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let (discovery, indexer, _store) = build(project.path(), cache.path());

    let mut watcher =
        FileWatcher::start(discovery, indexer, Duration::from_millis(100)).unwrap();

    let started = tokio::time::Instant::now();
    watcher.stop().await;
    watcher.stop().await;
    assert!(started.elapsed() < Duration::from_millis(500));
}
