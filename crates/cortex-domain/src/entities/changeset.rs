//! Change detection result

use serde::{Deserialize, Serialize};

/// The partition of file paths produced by one change-detection pass.
///
/// `added`, `modified`, `deleted`, and `unchanged` partition the union of
/// disk paths and store paths; `mtime_drift` is the subset of `unchanged`
/// whose on-disk mtime moved while the content hash stayed the same.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub unchanged: Vec<String>,
    pub mtime_drift: Vec<String>,
}

impl ChangeSet {
    /// Whether there is no work at all in this changeset
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.mtime_drift.is_empty()
    }

    /// Paths that need full reprocessing (added plus modified)
    pub fn dirty(&self) -> impl Iterator<Item = &String> {
        self.added.iter().chain(self.modified.iter())
    }

    /// Total number of paths across the four partition sets
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len() + self.unchanged.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_changeset() {
        let cs = ChangeSet::default();
        assert!(cs.is_empty());
        assert_eq!(cs.len(), 0);
    }

    #[test]
    fn test_drift_only_is_not_empty() {
        let cs = ChangeSet {
            unchanged: vec!["a.go".into()],
            mtime_drift: vec!["a.go".into()],
            ..Default::default()
        };
        assert!(!cs.is_empty());
        assert_eq!(cs.dirty().count(), 0);
    }
}
