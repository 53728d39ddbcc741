//! Source-control introspection via git2
//!
//! The engine needs three facts from git: the current branch name, the
//! merge-base recency between two branches, and the tracked file list.
//! A repository handle is opened per call; `git2::Repository` is not Sync
//! and the calls are rare.

use std::path::{Path, PathBuf};

use git2::{BranchType, Repository};

use cortex_domain::error::{Error, Result};
use cortex_domain::ports::infrastructure::SourceControl;

/// `SourceControl` implementation over a git work tree
pub struct GitSourceControl {
    repo_root: PathBuf,
}

impl GitSourceControl {
    pub fn new(repo_root: &Path) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
        }
    }

    fn open(&self) -> Result<Repository> {
        Repository::discover(&self.repo_root).map_err(|e| {
            Error::git_with_source(
                format!("failed to open repository at {}", self.repo_root.display()),
                e,
            )
        })
    }

    fn branch_commit(repo: &Repository, name: &str) -> Option<git2::Oid> {
        let branch = repo.find_branch(name, BranchType::Local).ok()?;
        branch.get().peel_to_commit().ok().map(|c| c.id())
    }
}

impl SourceControl for GitSourceControl {
    fn current_branch(&self) -> Result<String> {
        let repo = self.open()?;
        let head = repo
            .head()
            .map_err(|e| Error::git_with_source("failed to read HEAD", e))?;
        Ok(head.shorthand().unwrap_or("HEAD").to_string())
    }

    fn merge_base_time(&self, branch: &str, other: &str) -> Result<Option<i64>> {
        let repo = self.open()?;
        let (Some(a), Some(b)) = (
            Self::branch_commit(&repo, branch),
            Self::branch_commit(&repo, other),
        ) else {
            return Ok(None);
        };
        let base = match repo.merge_base(a, b) {
            Ok(oid) => oid,
            // Unrelated histories share no base
            Err(_) => return Ok(None),
        };
        let commit = repo
            .find_commit(base)
            .map_err(|e| Error::git_with_source("failed to read merge-base commit", e))?;
        Ok(Some(commit.time().seconds()))
    }

    fn tracked_files(&self) -> Result<Vec<String>> {
        let repo = self.open()?;
        let index = repo
            .index()
            .map_err(|e| Error::git_with_source("failed to read index", e))?;
        let mut files: Vec<String> = index
            .iter()
            .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
            .collect();
        files.sort();
        Ok(files)
    }
}
