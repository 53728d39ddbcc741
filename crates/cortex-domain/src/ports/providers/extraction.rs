//! Extraction Provider Port
//!
//! The orchestrator's view of the language extractor set. Dispatch by
//! extension and parse-tree handling stay behind this boundary; only the
//! three-tier `Extraction` crosses it.

use crate::entities::Extraction;
use crate::error::Result;

/// Port for multi-language structural extraction
pub trait ExtractionProvider: Send + Sync {
    /// Whether any extractor dispatches to this path's extension
    fn supports(&self, rel_path: &str) -> bool;

    /// Extract one file. `Ok(None)` means the grammar produced no tree and
    /// the file is to be skipped silently.
    fn extract(&self, rel_path: &str, source: &str) -> Result<Option<Extraction>>;
}
