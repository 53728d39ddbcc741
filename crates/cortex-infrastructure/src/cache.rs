//! Per-project cache layout
//!
//! The cache root is deterministic from the project path: a short sha256
//! prefix under the platform cache directory. `CORTEX_CACHE_DIR` overrides
//! the derivation entirely. Branch stores live under `branches/`, one
//! sqlite file per branch with the name sanitized for the filesystem.

use std::path::{Path, PathBuf};

use cortex_domain::error::{Error, Result};
use cortex_domain::hash::project_hash;

/// Environment variable overriding the derived cache root
pub const CACHE_DIR_ENV_VAR: &str = "CORTEX_CACHE_DIR";

/// Resolved cache directory layout for one project
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    /// Resolve the cache root for a project, creating it when missing
    pub fn resolve(project_root: &Path) -> Result<Self> {
        let root = match std::env::var_os(CACHE_DIR_ENV_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let canonical = project_root.canonicalize().map_err(|e| {
                    Error::io_with_source(
                        format!("failed to canonicalize {}", project_root.display()),
                        e,
                    )
                })?;
                let base = dirs::cache_dir()
                    .ok_or_else(|| Error::config("no platform cache directory available"))?;
                base.join("cortex")
                    .join(project_hash(&canonical.to_string_lossy()))
            }
        };
        std::fs::create_dir_all(root.join("branches")).map_err(|e| {
            Error::io_with_source(
                format!("failed to create cache directory {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Layout rooted at an explicit directory, bypassing derivation
    pub fn at(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(root.join("branches")).map_err(|e| {
            Error::io_with_source(
                format!("failed to create cache directory {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the per-branch stores
    pub fn branches_dir(&self) -> PathBuf {
        self.root.join("branches")
    }

    /// Store file for one branch
    pub fn branch_store_path(&self, branch: &str) -> PathBuf {
        self.branches_dir()
            .join(format!("{}.db", Self::sanitize_branch(branch)))
    }

    /// Branch names may contain path separators; `feature/login` maps to
    /// `feature__login.db`
    pub fn sanitize_branch(branch: &str) -> String {
        branch
            .chars()
            .map(|c| match c {
                '/' | '\\' => "__".to_string(),
                c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' => {
                    c.to_string()
                }
                _ => "-".to_string(),
            })
            .collect()
    }

    /// Reverse of [`sanitize_branch`] for store files this layout created
    ///
    /// [`sanitize_branch`]: CacheLayout::sanitize_branch
    pub fn branch_of_store_file(file_name: &str) -> Option<String> {
        let stem = file_name.strip_suffix(".db")?;
        Some(stem.replace("__", "/"))
    }

    /// All branch stores currently on disk, as `(branch, store path)`
    pub fn existing_branch_stores(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut stores = Vec::new();
        let dir = self.branches_dir();
        let entries = std::fs::read_dir(&dir).map_err(|e| {
            Error::io_with_source(format!("failed to read {}", dir.display()), e)
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::io_with_source("failed to read cache entry", e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(branch) = Self::branch_of_store_file(&name) {
                stores.push((branch, entry.path()));
            }
        }
        stores.sort();
        Ok(stores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_branch_names() {
        assert_eq!(CacheLayout::sanitize_branch("main"), "main");
        assert_eq!(CacheLayout::sanitize_branch("feature/login"), "feature__login");
        assert_eq!(CacheLayout::sanitize_branch("fix/issue#42"), "fix__issue-42");
    }

    #[test]
    fn test_branch_round_trip() {
        let name = format!("{}.db", CacheLayout::sanitize_branch("feature/login"));
        assert_eq!(
            CacheLayout::branch_of_store_file(&name).as_deref(),
            Some("feature/login")
        );
        assert_eq!(CacheLayout::branch_of_store_file("stray.txt"), None);
    }

    #[test]
    fn test_resolve_honors_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        std::env::set_var(CACHE_DIR_ENV_VAR, dir.path());
        let layout = CacheLayout::resolve(project.path()).unwrap();
        std::env::remove_var(CACHE_DIR_ENV_VAR);
        assert_eq!(layout.root(), dir.path());
        assert!(layout.branches_dir().is_dir());
    }
}
