//! File discovery
//!
//! Walks the project tree applying include/exclude globs over relative,
//! slash-normalized paths. A path is admitted iff no ignore pattern matches
//! it and at least one code or docs pattern does; code wins overlap.
//! Ignored directories (and the project's own cache directory) are never
//! descended, and results come back in lexicographic path order.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use cortex_domain::error::{Error, Result};

/// Whether an admitted path is source code or prose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Code,
    Docs,
}

/// One admitted file with the disk facts change detection needs
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Relative slash-normalized path
    pub rel_path: String,
    /// Absolute path on disk
    pub abs_path: PathBuf,
    /// Code or docs classification
    pub class: FileClass,
    /// Last-modified time, second precision
    pub mtime: DateTime<Utc>,
    /// Size in bytes
    pub size: u64,
}

/// Glob-driven project tree walker
#[derive(Clone)]
pub struct FileDiscovery {
    root: PathBuf,
    code: GlobSet,
    docs: GlobSet,
    ignore: GlobSet,
    cache_dir: Option<PathBuf>,
}

impl FileDiscovery {
    /// Build a discovery for `root`. `cache_dir` is excluded from traversal
    /// even when no ignore pattern covers it.
    pub fn new(
        root: &Path,
        code_patterns: &[String],
        docs_patterns: &[String],
        ignore_patterns: &[String],
        cache_dir: Option<&Path>,
    ) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            code: Self::build_globset(code_patterns)?,
            docs: Self::build_globset(docs_patterns)?,
            ignore: Self::build_globset(ignore_patterns)?,
            cache_dir: cache_dir.map(|p| p.to_path_buf()),
        })
    }

    fn build_globset(patterns: &[String]) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            // `*` stays within one segment; only `**` crosses directories
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| Error::config(format!("invalid glob pattern {pattern:?}: {e}")))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| Error::config(format!("failed to compile glob set: {e}")))
    }

    /// Project root this discovery walks
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative slash-normalized form of an absolute path under the root
    pub fn relativize(&self, abs_path: &Path) -> Option<String> {
        let rel = abs_path.strip_prefix(&self.root).ok()?;
        let mut out = String::new();
        for component in rel.components() {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&component.as_os_str().to_string_lossy());
        }
        (!out.is_empty()).then_some(out)
    }

    /// Classification a relative path would receive, `None` when not
    /// admitted. Code takes precedence over docs on overlap.
    pub fn admit(&self, rel_path: &str) -> Option<FileClass> {
        if self.ignore.is_match(rel_path) {
            return None;
        }
        if self.code.is_match(rel_path) {
            return Some(FileClass::Code);
        }
        if self.docs.is_match(rel_path) {
            return Some(FileClass::Docs);
        }
        None
    }

    /// Whether traversal should descend into a directory
    fn descend(&self, rel_path: &str, abs_path: &Path) -> bool {
        if let Some(cache) = &self.cache_dir {
            if abs_path == cache {
                return false;
            }
        }
        // Directory patterns like `**/node_modules/**` match the trailing
        // slash form
        !(self.ignore.is_match(rel_path) || self.ignore.is_match(format!("{rel_path}/")))
    }

    /// Walk the tree and return every admitted file, sorted by path
    pub fn discover(&self) -> Result<Vec<DiscoveredFile>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                if entry.path() == self.root {
                    return true;
                }
                match self.relativize(entry.path()) {
                    Some(rel) => self.descend(&rel, entry.path()),
                    None => false,
                }
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel_path) = self.relativize(entry.path()) else {
                continue;
            };
            let Some(class) = self.admit(&rel_path) else {
                continue;
            };
            let metadata = entry
                .metadata()
                .map_err(|e| Error::io_with_source(format!("failed to stat {rel_path}"), e))?;
            let mtime: DateTime<Utc> = metadata
                .modified()
                .map_err(|e| Error::io_with_source(format!("failed to read mtime of {rel_path}"), e))?
                .into();
            files.push(DiscoveredFile {
                abs_path: entry.path().to_path_buf(),
                rel_path,
                class,
                mtime,
                size: metadata.len(),
            });
        }

        files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        Ok(files)
    }
}
