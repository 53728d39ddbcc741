//! Source Control Port
//!
//! The thin slice of source-control introspection the engine needs: name the
//! current branch, order candidate ancestors by merge-base recency, and list
//! tracked files.

use crate::error::Result;

/// Port for source-control introspection on the project root
pub trait SourceControl: Send + Sync {
    /// Name of the currently checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// Commit time (unix seconds) of the merge base between two branches,
    /// or `None` when the branches share no history
    fn merge_base_time(&self, branch: &str, other: &str) -> Result<Option<i64>>;

    /// Relative slash-normalized paths of all tracked files
    fn tracked_files(&self) -> Result<Vec<String>>;
}
