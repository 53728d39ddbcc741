//! Change detection
//!
//! Diffs the disk state produced by discovery against the store's file
//! metadata. Matching mtimes skip hashing entirely; a moved mtime triggers a
//! content-hash comparison that either confirms a real modification or
//! records mtime drift so the store timestamp can be refreshed without
//! re-embedding.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use cortex_domain::entities::{ChangeSet, FileMeta};
use cortex_domain::error::{Error, Result};
use cortex_domain::hash::content_hash;

use crate::discovery::DiscoveredFile;

/// Detects which files need work for one index call
pub struct ChangeDetector;

impl ChangeDetector {
    /// Two timestamps within one second of each other count as equal;
    /// stored mtimes carry second precision.
    fn mtime_equal(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        (a.timestamp() - b.timestamp()).abs() < 1
    }

    /// Map absolute hint paths onto relative slash-normalized ones
    fn hint_set(root: &Path, hint: &[PathBuf]) -> HashSet<String> {
        hint.iter()
            .filter_map(|abs| {
                let rel = abs.strip_prefix(root).ok()?;
                let parts: Vec<String> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                (!parts.is_empty()).then(|| parts.join("/"))
            })
            .collect()
    }

    /// Produce the changeset for the given disk and store views.
    ///
    /// A non-empty `hint` restricts `added` and `modified` to the hinted
    /// paths (deletions are always detected in full); dirty paths outside
    /// the hint are left in `unchanged` for a later full pass.
    pub async fn detect(
        root: &Path,
        disk: &[DiscoveredFile],
        store_files: &[FileMeta],
        hint: &[PathBuf],
    ) -> Result<ChangeSet> {
        let hinted = if hint.is_empty() {
            None
        } else {
            Some(Self::hint_set(root, hint))
        };
        let in_hint =
            |path: &str| hinted.as_ref().map(|h| h.contains(path)).unwrap_or(true);

        let store: HashMap<&str, &FileMeta> =
            store_files.iter().map(|m| (m.path.as_str(), m)).collect();
        let disk_paths: HashSet<&str> = disk.iter().map(|f| f.rel_path.as_str()).collect();

        let mut changeset = ChangeSet::default();

        for file in disk {
            let Some(known) = store.get(file.rel_path.as_str()) else {
                if in_hint(&file.rel_path) {
                    changeset.added.push(file.rel_path.clone());
                } else {
                    changeset.unchanged.push(file.rel_path.clone());
                }
                continue;
            };

            if Self::mtime_equal(file.mtime, known.last_modified) {
                changeset.unchanged.push(file.rel_path.clone());
                continue;
            }

            // mtime moved: only now is the file read and hashed
            let bytes = tokio::fs::read(&file.abs_path).await.map_err(|e| {
                Error::io_with_source(format!("failed to read {}", file.rel_path), e)
            })?;
            if content_hash(&bytes) == known.file_hash {
                changeset.unchanged.push(file.rel_path.clone());
                changeset.mtime_drift.push(file.rel_path.clone());
            } else if in_hint(&file.rel_path) {
                changeset.modified.push(file.rel_path.clone());
            } else {
                changeset.unchanged.push(file.rel_path.clone());
            }
        }

        for meta in store_files {
            if !disk_paths.contains(meta.path.as_str()) {
                changeset.deleted.push(meta.path.clone());
            }
        }

        Ok(changeset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::FileClass;
    use cortex_domain::entities::LineCounts;

    fn meta(path: &str, hash: &str, mtime: DateTime<Utc>) -> FileMeta {
        FileMeta {
            path: path.into(),
            language: "go".into(),
            module_path: path.trim_end_matches(".go").into(),
            is_test: false,
            size_bytes: 0,
            file_hash: hash.into(),
            last_modified: mtime,
            lines: LineCounts::default(),
            indexed_at: mtime,
        }
    }

    fn disk_file(root: &Path, rel: &str, mtime: DateTime<Utc>) -> DiscoveredFile {
        DiscoveredFile {
            rel_path: rel.into(),
            abs_path: root.join(rel),
            class: FileClass::Code,
            mtime,
            size: 0,
        }
    }

    #[tokio::test]
    async fn test_added_modified_deleted_partition() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("new.go"), "package a\n").unwrap();
        std::fs::write(root.join("changed.go"), "package b\n").unwrap();

        let now = Utc::now();
        let old = now - chrono::Duration::seconds(120);
        let disk = vec![
            disk_file(root, "changed.go", now),
            disk_file(root, "new.go", now),
        ];
        let store = vec![
            meta("changed.go", "deadbeef", old),
            meta("gone.go", "cafebabe", old),
        ];

        let cs = ChangeDetector::detect(root, &disk, &store, &[]).await.unwrap();
        assert_eq!(cs.added, vec!["new.go"]);
        assert_eq!(cs.modified, vec!["changed.go"]);
        assert_eq!(cs.deleted, vec!["gone.go"]);
        assert!(cs.unchanged.is_empty());
        assert!(cs.mtime_drift.is_empty());
    }

    #[tokio::test]
    async fn test_equal_mtime_skips_hashing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        // The file is never read: a bogus stored hash stays unnoticed
        let now = Utc::now();
        let disk = vec![disk_file(root, "same.go", now)];
        let store = vec![meta("same.go", "not-a-real-hash", now)];

        let cs = ChangeDetector::detect(root, &disk, &store, &[]).await.unwrap();
        assert_eq!(cs.unchanged, vec!["same.go"]);
        assert!(cs.modified.is_empty());
    }

    #[tokio::test]
    async fn test_mtime_drift_detected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let content = "package main\n";
        std::fs::write(root.join("drift.go"), content).unwrap();

        let now = Utc::now();
        let old = now - chrono::Duration::seconds(120);
        let disk = vec![disk_file(root, "drift.go", now)];
        let store = vec![meta("drift.go", &content_hash(content.as_bytes()), old)];

        let cs = ChangeDetector::detect(root, &disk, &store, &[]).await.unwrap();
        assert_eq!(cs.unchanged, vec!["drift.go"]);
        assert_eq!(cs.mtime_drift, vec!["drift.go"]);
        assert!(cs.modified.is_empty());
    }

    #[tokio::test]
    async fn test_hint_restricts_added_but_not_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.go"), "package a\n").unwrap();
        std::fs::write(root.join("b.go"), "package b\n").unwrap();

        let now = Utc::now();
        let disk = vec![disk_file(root, "a.go", now), disk_file(root, "b.go", now)];
        let store = vec![meta("gone.go", "cafebabe", now)];

        let hint = vec![root.join("a.go")];
        let cs = ChangeDetector::detect(root, &disk, &store, &hint).await.unwrap();
        assert_eq!(cs.added, vec!["a.go"]);
        assert_eq!(cs.unchanged, vec!["b.go"]);
        assert_eq!(cs.deleted, vec!["gone.go"]);
    }
}
