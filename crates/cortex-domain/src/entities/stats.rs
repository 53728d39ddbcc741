//! Index call statistics

use serde::{Deserialize, Serialize};

/// Counters accumulated over one index call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub files_added: usize,
    pub files_modified: usize,
    pub files_deleted: usize,
    pub files_failed: usize,
    pub code_files_processed: usize,
    pub docs_processed: usize,
    pub total_code_chunks: usize,
    pub total_doc_chunks: usize,
    /// Wall-clock duration of the call, milliseconds
    pub indexing_time_ms: u64,
    /// Whether the call was cancelled; the counters above cover the work
    /// committed before cancellation
    pub cancelled: bool,
}

impl IndexStats {
    /// Files that went through the full pipeline
    pub fn files_processed(&self) -> usize {
        self.code_files_processed + self.docs_processed
    }

    /// All chunks written
    pub fn total_chunks(&self) -> usize {
        self.total_code_chunks + self.total_doc_chunks
    }
}
