//! Sqlite chunk store tests

use chrono::{Duration, Utc};
use tempfile::TempDir;

use cortex_domain::constants::SCHEMA_VERSION;
use cortex_domain::entities::{Chunk, ChunkType, FileMeta, LineCounts};
use cortex_domain::hash::chunk_id;
use cortex_domain::ports::providers::ChunkStore;
use cortex_providers::store::{embedding_from_bytes, embedding_to_bytes, SqliteChunkStore};

const DIM: usize = 4;

fn open_store(dir: &TempDir, name: &str) -> SqliteChunkStore {
    SqliteChunkStore::open(&dir.path().join(name), DIM).unwrap()
}

fn meta(path: &str, hash: &str) -> FileMeta {
    let now = Utc::now();
    FileMeta {
        path: path.to_string(),
        language: "go".to_string(),
        module_path: path.trim_end_matches(".go").to_string(),
        is_test: false,
        size_bytes: 42,
        file_hash: hash.to_string(),
        last_modified: now,
        lines: LineCounts {
            total: 10,
            code: 7,
            comment: 2,
            blank: 1,
        },
        indexed_at: now,
    }
}

fn chunk(path: &str, chunk_type: ChunkType, ordinal: u32, fill: f32) -> Chunk {
    let now = Utc::now();
    Chunk {
        id: chunk_id(path, chunk_type, ordinal),
        file_path: path.to_string(),
        chunk_type,
        title: format!("{chunk_type}: {path}"),
        text: format!("{chunk_type} body of {path}"),
        start_line: 1,
        end_line: 5,
        embedding: vec![fill; DIM],
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_embedding_byte_round_trip() {
    let vector = vec![0.5f32, -1.25, 3.0, 0.0];
    let bytes = embedding_to_bytes(&vector);
    assert_eq!(bytes.len(), 16);
    assert_eq!(embedding_from_bytes(&bytes), vector);
}

#[tokio::test]
async fn test_init_schema_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "main.db");
    store.init_schema().await.unwrap();
    store.init_schema().await.unwrap();
    assert_eq!(store.schema_version().await.unwrap(), SCHEMA_VERSION);
}

#[tokio::test]
async fn test_schema_version_of_empty_file_is_zero() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "fresh.db");
    assert_eq!(store.schema_version().await.unwrap(), 0);
}

#[tokio::test]
async fn test_upsert_and_read_back() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "main.db");
    store.init_schema().await.unwrap();

    store
        .upsert_file(&meta("src/a.go", "hash-a"), Some("package a\n"))
        .await
        .unwrap();
    store
        .upsert_chunks(&[
            chunk("src/a.go", ChunkType::Symbols, 0, 0.1),
            chunk("src/a.go", ChunkType::Definitions, 0, 0.2),
        ])
        .await
        .unwrap();

    let read = store.read_file_meta("src/a.go").await.unwrap().unwrap();
    assert_eq!(read.file_hash, "hash-a");
    assert_eq!(read.lines.code, 7);
    assert_eq!(
        store.read_content("src/a.go").await.unwrap(),
        Some(Some("package a\n".to_string()))
    );

    let chunks = store.read_chunks("src/a.go").await.unwrap();
    assert_eq!(chunks.len(), 2);
    for c in &chunks {
        assert_eq!(c.embedding.len(), DIM);
    }
}

#[tokio::test]
async fn test_upsert_chunks_replaces_previous_set() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "main.db");
    store.init_schema().await.unwrap();
    store
        .upsert_file(&meta("a.go", "h1"), Some("x"))
        .await
        .unwrap();

    store
        .upsert_chunks(&[
            chunk("a.go", ChunkType::Symbols, 0, 0.1),
            chunk("a.go", ChunkType::Data, 0, 0.2),
        ])
        .await
        .unwrap();
    store
        .upsert_chunks(&[chunk("a.go", ChunkType::Symbols, 0, 0.9)])
        .await
        .unwrap();

    let chunks = store.read_chunks("a.go").await.unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_type, ChunkType::Symbols);
    assert_eq!(chunks[0].embedding[0], 0.9);
}

#[tokio::test]
async fn test_delete_file_cascades_to_chunks_only_for_that_file() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "main.db");
    store.init_schema().await.unwrap();
    for path in ["a.go", "b.go"] {
        store.upsert_file(&meta(path, "h"), Some("x")).await.unwrap();
        store
            .upsert_chunks(&[chunk(path, ChunkType::Symbols, 0, 0.5)])
            .await
            .unwrap();
    }

    store.delete_file("a.go").await.unwrap();

    assert!(store.read_file_meta("a.go").await.unwrap().is_none());
    assert!(store.read_chunks("a.go").await.unwrap().is_empty());
    assert_eq!(store.read_chunks("b.go").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_binary_file_has_null_content() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "main.db");
    store.init_schema().await.unwrap();
    store.upsert_file(&meta("blob.md", "h"), None).await.unwrap();

    assert_eq!(store.read_content("blob.md").await.unwrap(), Some(None));
    assert_eq!(store.read_content("missing.md").await.unwrap(), None);
}

#[tokio::test]
async fn test_refresh_mtime_leaves_chunks_alone() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "main.db");
    store.init_schema().await.unwrap();
    store.upsert_file(&meta("a.go", "h"), Some("x")).await.unwrap();
    store
        .upsert_chunks(&[chunk("a.go", ChunkType::Symbols, 0, 0.5)])
        .await
        .unwrap();
    let before = store.read_chunks("a.go").await.unwrap();

    let new_mtime = Utc::now() + Duration::seconds(90);
    store.refresh_mtime("a.go", new_mtime).await.unwrap();

    let read = store.read_file_meta("a.go").await.unwrap().unwrap();
    assert_eq!(read.last_modified.timestamp(), new_mtime.timestamp());
    let after = store.read_chunks("a.go").await.unwrap();
    assert_eq!(before[0].updated_at, after[0].updated_at);
}

#[tokio::test]
async fn test_wrong_dimension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, "main.db");
    store.init_schema().await.unwrap();
    store.upsert_file(&meta("a.go", "h"), Some("x")).await.unwrap();

    let mut bad = chunk("a.go", ChunkType::Symbols, 0, 0.5);
    bad.embedding = vec![0.5; DIM + 1];
    assert!(store.upsert_chunks(&[bad]).await.is_err());
}

#[tokio::test]
async fn test_copy_matching_from_ancestor() {
    let dir = TempDir::new().unwrap();
    let ancestor = open_store(&dir, "main.db");
    ancestor.init_schema().await.unwrap();
    for path in ["a.go", "b.go"] {
        ancestor
            .upsert_file(&meta(path, &format!("hash-{path}")), Some("content"))
            .await
            .unwrap();
        ancestor
            .upsert_chunks(&[chunk(path, ChunkType::Symbols, 0, 0.7)])
            .await
            .unwrap();
    }

    let feature = open_store(&dir, "feature.db");
    feature.init_schema().await.unwrap();

    let copied = feature
        .copy_matching_from(
            &dir.path().join("main.db"),
            &["a.go".to_string(), "gone.go".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(copied, 1);

    let read = feature.read_file_meta("a.go").await.unwrap().unwrap();
    assert_eq!(read.file_hash, "hash-a.go");
    assert!(feature.read_file_meta("b.go").await.unwrap().is_none());

    let original = ancestor.read_chunks("a.go").await.unwrap();
    let copiedchunks = feature.read_chunks("a.go").await.unwrap();
    assert_eq!(copiedchunks.len(), 1);
    assert_eq!(copiedchunks[0].text, original[0].text);
    assert_eq!(copiedchunks[0].embedding, original[0].embedding);
    assert_eq!(copiedchunks[0].created_at, original[0].created_at);
    assert!(copiedchunks[0].updated_at >= original[0].updated_at);
}
