//! Post-Write Hook Port
//!
//! Invoked after every successfully persisted file so graph bookkeeping can
//! follow the store. Hook failures are logged by the caller and never abort
//! indexing.

use async_trait::async_trait;

use crate::entities::{Extraction, FileMeta};
use crate::error::Result;

/// Port for graph-update bookkeeping after a file is persisted
#[async_trait]
pub trait PostWriteHook: Send + Sync {
    /// Called once per persisted file. `extraction` is `None` for doc and
    /// binary files.
    async fn file_indexed(&self, meta: &FileMeta, extraction: Option<&Extraction>) -> Result<()>;
}

/// Null hook for wiring without a graph backend
pub struct NullPostWriteHook;

impl NullPostWriteHook {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullPostWriteHook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostWriteHook for NullPostWriteHook {
    async fn file_indexed(&self, _meta: &FileMeta, _extraction: Option<&Extraction>) -> Result<()> {
        Ok(())
    }
}
