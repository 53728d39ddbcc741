//! File metadata entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Language;

/// Per-file line classification computed at ingest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCounts {
    /// All lines in the file
    pub total: u32,
    /// Lines with at least one non-comment, non-blank token
    pub code: u32,
    /// Lines consisting only of a comment
    pub comment: u32,
    /// Whitespace-only lines
    pub blank: u32,
}

impl LineCounts {
    /// Classify every line of `content` using the language's comment markers.
    ///
    /// Block comments are tracked with a simple open/close scan; a line that
    /// opens code and trails into a comment counts as code.
    pub fn analyze(content: &str, language: Option<Language>) -> Self {
        let line_markers: &[&str] = language.map(|l| l.line_comment_markers()).unwrap_or(&[]);
        let block = language.and_then(|l| l.block_comment_markers());

        let mut counts = LineCounts::default();
        let mut in_block = false;

        for line in content.lines() {
            counts.total += 1;
            let trimmed = line.trim();

            if in_block {
                counts.comment += 1;
                if let Some((_, close)) = block {
                    if trimmed.contains(close) {
                        in_block = false;
                    }
                }
                continue;
            }

            if trimmed.is_empty() {
                counts.blank += 1;
            } else if line_markers.iter().any(|m| trimmed.starts_with(m)) {
                counts.comment += 1;
            } else if let Some((open, close)) = block {
                if trimmed.starts_with(open) {
                    counts.comment += 1;
                    // A block closed on the same line stays closed
                    if !trimmed[open.len()..].contains(close) {
                        in_block = true;
                    }
                } else {
                    counts.code += 1;
                    if trimmed.contains(open) && !trimmed[trimmed.find(open).unwrap_or(0)..].contains(close)
                    {
                        in_block = true;
                    }
                }
            } else {
                counts.code += 1;
            }
        }

        counts
    }
}

/// One row per tracked file in a branch store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    /// Relative, forward-slash, UTF-8 path (primary key)
    pub path: String,
    /// Language tag, or "doc" / "binary" for non-code files
    pub language: String,
    /// Path with the extension removed, used as a namespace key
    pub module_path: String,
    /// Whether the filename matches the language's test conventions
    pub is_test: bool,
    /// Raw size on disk
    pub size_bytes: u64,
    /// sha256 of raw bytes, hex
    pub file_hash: String,
    /// Last-modified timestamp, second precision
    pub last_modified: DateTime<Utc>,
    /// Line classification
    pub lines: LineCounts,
    /// When this row was last written by an index call
    pub indexed_at: DateTime<Utc>,
}

impl FileMeta {
    /// Derive the module path from a relative file path
    pub fn module_path_of(rel_path: &str) -> String {
        match rel_path.rfind('.') {
            Some(dot) if dot > rel_path.rfind('/').map_or(0, |s| s + 1) => {
                rel_path[..dot].to_string()
            }
            _ => rel_path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path_strips_extension() {
        assert_eq!(FileMeta::module_path_of("src/lib/util.go"), "src/lib/util");
        assert_eq!(FileMeta::module_path_of("Makefile"), "Makefile");
        assert_eq!(FileMeta::module_path_of("a/.hidden"), "a/.hidden");
    }

    #[test]
    fn test_line_counts_go() {
        let src = "package main\n\n// comment\nfunc main() {}\n";
        let counts = LineCounts::analyze(src, Some(Language::Go));
        assert_eq!(counts.total, 4);
        assert_eq!(counts.blank, 1);
        assert_eq!(counts.comment, 1);
        assert_eq!(counts.code, 2);
    }

    #[test]
    fn test_line_counts_block_comment() {
        let src = "int x;\n/* a\nb\nc */\nint y;\n";
        let counts = LineCounts::analyze(src, Some(Language::C));
        assert_eq!(counts.comment, 3);
        assert_eq!(counts.code, 2);
    }

    #[test]
    fn test_line_counts_python_no_block() {
        let src = "# top\nX = 1\n\n";
        let counts = LineCounts::analyze(src, Some(Language::Python));
        assert_eq!(counts.comment, 1);
        assert_eq!(counts.code, 1);
        assert_eq!(counts.blank, 1);
    }
}
