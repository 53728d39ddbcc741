//! JavaScript language extractor
//!
//! Delegates to the TypeScript extractor (the grammar is shared) and
//! overrides the reported language tag.

use cortex_domain::entities::Extraction;
use cortex_domain::error::Result;
use cortex_domain::value_objects::Language;

use super::typescript::TypeScriptExtractor;
use super::Extractor;

/// Structural extractor for JavaScript source files
pub struct JavaScriptExtractor {
    inner: TypeScriptExtractor,
}

impl JavaScriptExtractor {
    pub fn new() -> Self {
        Self {
            inner: TypeScriptExtractor::with_language(Language::JavaScript),
        }
    }
}

impl Default for JavaScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extract(&self, rel_path: &str, source: &str) -> Result<Option<Extraction>> {
        self.inner.extract(rel_path, source)
    }
}
