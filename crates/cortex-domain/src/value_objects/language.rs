//! Value Object: Programming Language
//!
//! Identifies a supported language and carries the per-language facts the
//! pipeline needs: extension dispatch, comment markers for line counting,
//! and test-file naming conventions.

use serde::{Deserialize, Serialize};

/// A language with structural extraction support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    TypeScript,
    JavaScript,
    Python,
    Rust,
    C,
    Cpp,
    Java,
    Php,
    Ruby,
}

impl Language {
    /// All supported languages
    pub const ALL: &'static [Language] = &[
        Language::Go,
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
        Language::Rust,
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::Php,
        Language::Ruby,
    ];

    /// Dispatch by file extension (lowercase, without dot)
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext {
            "go" => Some(Language::Go),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "py" | "pyi" => Some(Language::Python),
            "rs" => Some(Language::Rust),
            "c" | "h" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Some(Language::Cpp),
            "java" => Some(Language::Java),
            "php" => Some(Language::Php),
            "rb" | "rake" => Some(Language::Ruby),
            _ => None,
        }
    }

    /// Dispatch by relative path
    pub fn from_path(rel_path: &str) -> Option<Language> {
        let ext = rel_path.rsplit('.').next()?;
        if ext.len() == rel_path.len() {
            return None;
        }
        Language::from_extension(&ext.to_ascii_lowercase())
    }

    /// Stable language tag stored in `files.language`
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Php => "php",
            Language::Ruby => "ruby",
        }
    }

    /// Line-comment markers for line classification
    pub fn line_comment_markers(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["#"],
            Language::Ruby => &["#"],
            Language::Php => &["//", "#"],
            _ => &["//"],
        }
    }

    /// Block-comment open/close markers, when the language has them
    pub fn block_comment_markers(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Language::Python | Language::Ruby => None,
            _ => Some(("/*", "*/")),
        }
    }

    /// Whether a relative path looks like a test file for this language
    pub fn is_test_path(&self, rel_path: &str) -> bool {
        let file_name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        if rel_path.split('/').any(|seg| seg == "tests" || seg == "test" || seg == "__tests__") {
            return true;
        }
        match self {
            Language::Go => file_name.ends_with("_test.go"),
            Language::TypeScript | Language::JavaScript => {
                file_name.contains(".test.") || file_name.contains(".spec.")
            }
            Language::Python => {
                file_name.starts_with("test_") || file_name.ends_with("_test.py")
            }
            Language::Java => {
                file_name.starts_with("Test") || file_name.ends_with("Test.java")
            }
            Language::Ruby => file_name.ends_with("_spec.rb") || file_name.ends_with("_test.rb"),
            Language::Php => file_name.ends_with("Test.php"),
            Language::Rust | Language::C | Language::Cpp => false,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_dispatch() {
        assert_eq!(Language::from_extension("go"), Some(Language::Go));
        assert_eq!(Language::from_extension("tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("cc"), Some(Language::Cpp));
        assert_eq!(Language::from_extension("md"), None);
    }

    #[test]
    fn test_path_dispatch() {
        assert_eq!(Language::from_path("src/main.rs"), Some(Language::Rust));
        assert_eq!(Language::from_path("lib/a.spec.TS"), Some(Language::TypeScript));
        assert_eq!(Language::from_path("Makefile"), None);
    }

    #[test]
    fn test_test_path_heuristics() {
        assert!(Language::Go.is_test_path("pkg/server_test.go"));
        assert!(!Language::Go.is_test_path("pkg/server.go"));
        assert!(Language::TypeScript.is_test_path("src/app.test.ts"));
        assert!(Language::Python.is_test_path("test_app.py"));
        assert!(Language::Rust.is_test_path("tests/integration.rs"));
        assert!(Language::Ruby.is_test_path("user_spec.rb"));
    }
}
