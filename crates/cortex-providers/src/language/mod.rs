//! Language extractor implementations
//!
//! One extractor per supported language, all producing the language-agnostic
//! three-tier [`Extraction`]. Dispatch is by file extension through
//! [`ExtractorSet`]; tree-sitter types never cross this module's boundary.
//!
//! Extractors are stateless: each `extract` call builds a fresh parser, which
//! tree-sitter makes cheap, so one registry can be shared across workers.

pub mod common;

#[cfg(feature = "lang-cpp")]
mod c;
#[cfg(feature = "lang-go")]
mod go;
#[cfg(feature = "lang-java")]
mod java;
#[cfg(feature = "lang-typescript")]
mod javascript;
#[cfg(feature = "lang-php")]
mod php;
#[cfg(feature = "lang-python")]
mod python;
#[cfg(feature = "lang-ruby")]
mod ruby;
#[cfg(feature = "lang-rust")]
mod rust;
#[cfg(feature = "lang-typescript")]
mod typescript;

#[cfg(feature = "lang-cpp")]
pub use c::CFamilyExtractor;
#[cfg(feature = "lang-go")]
pub use go::GoExtractor;
#[cfg(feature = "lang-java")]
pub use java::JavaExtractor;
#[cfg(feature = "lang-typescript")]
pub use javascript::JavaScriptExtractor;
#[cfg(feature = "lang-php")]
pub use php::PhpExtractor;
#[cfg(feature = "lang-python")]
pub use python::PythonExtractor;
#[cfg(feature = "lang-ruby")]
pub use ruby::RubyExtractor;
#[cfg(feature = "lang-rust")]
pub use rust::RustExtractor;
#[cfg(feature = "lang-typescript")]
pub use typescript::TypeScriptExtractor;

use std::collections::HashMap;

use cortex_domain::entities::Extraction;
use cortex_domain::error::Result;
use cortex_domain::ports::providers::ExtractionProvider;
use cortex_domain::value_objects::Language;

/// Trait for language-specific structural extraction
///
/// `extract` returns `Ok(None)` when the grammar produced no tree at all;
/// the file is then silently skipped upstream. Partial trees are used
/// best-effort and never fail the call.
pub trait Extractor: Send + Sync {
    /// The language tag this extractor reports
    fn language(&self) -> Language;

    /// Extract the three-tier structural summary of one file
    fn extract(&self, rel_path: &str, source: &str) -> Result<Option<Extraction>>;
}

/// Registry of extractors keyed by language, dispatched by extension
pub struct ExtractorSet {
    extractors: HashMap<Language, Box<dyn Extractor>>,
}

impl ExtractorSet {
    /// Build the registry with every extractor enabled by features
    pub fn new() -> Self {
        let mut extractors: HashMap<Language, Box<dyn Extractor>> = HashMap::new();

        #[cfg(feature = "lang-go")]
        extractors.insert(Language::Go, Box::new(GoExtractor::new()));
        #[cfg(feature = "lang-typescript")]
        extractors.insert(Language::TypeScript, Box::new(TypeScriptExtractor::new()));
        #[cfg(feature = "lang-typescript")]
        extractors.insert(Language::JavaScript, Box::new(JavaScriptExtractor::new()));
        #[cfg(feature = "lang-python")]
        extractors.insert(Language::Python, Box::new(PythonExtractor::new()));
        #[cfg(feature = "lang-rust")]
        extractors.insert(Language::Rust, Box::new(RustExtractor::new()));
        #[cfg(feature = "lang-cpp")]
        extractors.insert(Language::C, Box::new(CFamilyExtractor::c()));
        #[cfg(feature = "lang-cpp")]
        extractors.insert(Language::Cpp, Box::new(CFamilyExtractor::cpp()));
        #[cfg(feature = "lang-java")]
        extractors.insert(Language::Java, Box::new(JavaExtractor::new()));
        #[cfg(feature = "lang-php")]
        extractors.insert(Language::Php, Box::new(PhpExtractor::new()));
        #[cfg(feature = "lang-ruby")]
        extractors.insert(Language::Ruby, Box::new(RubyExtractor::new()));

        Self { extractors }
    }

    /// Look up the extractor responsible for a relative path
    pub fn for_path(&self, rel_path: &str) -> Option<&dyn Extractor> {
        let language = Language::from_path(rel_path)?;
        self.extractors.get(&language).map(Box::as_ref)
    }

    /// Extract a file, dispatching by extension.
    ///
    /// Returns `Ok(None)` for unsupported extensions and for unparseable
    /// sources.
    pub fn extract(&self, rel_path: &str, source: &str) -> Result<Option<Extraction>> {
        match self.for_path(rel_path) {
            Some(extractor) => {
                let mut extraction = extractor.extract(rel_path, source)?;
                if let Some(e) = extraction.as_mut() {
                    let line_count = source.lines().count().max(1) as u32;
                    e.clamp_lines(line_count);
                }
                Ok(extraction)
            }
            None => Ok(None),
        }
    }

    /// Languages registered in this set
    pub fn languages(&self) -> Vec<Language> {
        let mut langs: Vec<Language> = self.extractors.keys().copied().collect();
        langs.sort_by_key(|l| l.tag());
        langs
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionProvider for ExtractorSet {
    fn supports(&self, rel_path: &str) -> bool {
        self.for_path(rel_path).is_some()
    }

    fn extract(&self, rel_path: &str, source: &str) -> Result<Option<Extraction>> {
        ExtractorSet::extract(self, rel_path, source)
    }
}
