//! Chunking and chunk-text formatting
//!
//! Code extractions render into at most three tier chunks with a
//! deterministic human-oriented text; doc files go through a
//! paragraph-aware sliding window that never splits inside a code fence.

use cortex_domain::constants::{DOC_CHUNK_OVERLAP_BYTES, DOC_CHUNK_TARGET_BYTES};
use cortex_domain::entities::{ChunkType, DataSymbol, Extraction};

/// A chunk before embedding: everything but the vector and timestamps
#[derive(Debug, Clone)]
pub struct ChunkDraft {
    pub chunk_type: ChunkType,
    pub title: String,
    pub text: String,
    pub start_line: u32,
    pub end_line: u32,
    pub ordinal: u32,
}

/// Produces chunk drafts from extractions and doc texts
pub struct Chunker {
    doc_target_bytes: usize,
    doc_overlap_bytes: usize,
}

impl Chunker {
    pub fn new() -> Self {
        Self {
            doc_target_bytes: DOC_CHUNK_TARGET_BYTES,
            doc_overlap_bytes: DOC_CHUNK_OVERLAP_BYTES,
        }
    }

    /// Override the doc window geometry
    pub fn with_doc_window(mut self, target_bytes: usize, overlap_bytes: usize) -> Self {
        self.doc_target_bytes = target_bytes.max(1);
        self.doc_overlap_bytes = overlap_bytes.min(target_bytes.saturating_sub(1));
        self
    }

    // ------------------------------------------------------------------
    // Code tiers
    // ------------------------------------------------------------------

    /// Render the non-empty tiers of an extraction, ordinal 0 each
    pub fn chunk_code(&self, rel_path: &str, extraction: &Extraction) -> Vec<ChunkDraft> {
        let mut drafts = Vec::new();
        if extraction.has_symbols() {
            drafts.push(Self::symbols_chunk(rel_path, extraction));
        }
        if extraction.has_definitions() {
            drafts.push(Self::definitions_chunk(rel_path, extraction));
        }
        if extraction.has_data() {
            drafts.push(Self::data_chunk(rel_path, extraction));
        }
        drafts
    }

    fn line_range<'a, I>(ranges: I) -> (u32, u32)
    where
        I: Iterator<Item = (u32, u32)>,
    {
        let mut start = u32::MAX;
        let mut end = 0;
        for (s, e) in ranges {
            start = start.min(s);
            end = end.max(e);
        }
        if start == u32::MAX {
            (1, 1)
        } else {
            (start, end.max(start))
        }
    }

    fn symbols_chunk(rel_path: &str, extraction: &Extraction) -> ChunkDraft {
        let mut text = format!("symbols: {rel_path}\n");
        if let Some(package) = &extraction.package {
            text.push_str(&format!(
                "package {package} (imports: {})\n",
                extraction.imports_count
            ));
        } else if extraction.imports_count > 0 {
            text.push_str(&format!("imports: {}\n", extraction.imports_count));
        }
        for ty in &extraction.types {
            text.push_str(&format!(
                "{} {} (lines {}-{})\n",
                ty.kind, ty.name, ty.start_line, ty.end_line
            ));
        }
        for function in &extraction.functions {
            text.push_str(&format!(
                "{} (lines {}-{})\n",
                function.signature, function.start_line, function.end_line
            ));
        }

        let (start, end) = Self::line_range(
            extraction
                .types
                .iter()
                .map(|t| (t.start_line, t.end_line))
                .chain(extraction.functions.iter().map(|f| (f.start_line, f.end_line))),
        );
        ChunkDraft {
            chunk_type: ChunkType::Symbols,
            title: format!("symbols: {rel_path}"),
            text,
            start_line: start,
            end_line: end,
            ordinal: 0,
        }
    }

    fn definitions_chunk(rel_path: &str, extraction: &Extraction) -> ChunkDraft {
        let mut text = format!("definitions: {rel_path}\n");
        for (i, definition) in extraction.definitions.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(&definition.code);
            text.push('\n');
        }

        let (start, end) = Self::line_range(
            extraction
                .definitions
                .iter()
                .map(|d| (d.start_line, d.end_line)),
        );
        ChunkDraft {
            chunk_type: ChunkType::Definitions,
            title: format!("definitions: {rel_path}"),
            text,
            start_line: start,
            end_line: end,
            ordinal: 0,
        }
    }

    fn data_line(keyword: &str, symbol: &DataSymbol) -> String {
        let mut line = format!("{keyword} {}", symbol.name);
        if !symbol.type_text.is_empty() {
            line.push_str(&format!(": {}", symbol.type_text));
        }
        if !symbol.value.is_empty() {
            line.push_str(&format!(" = {}", symbol.value));
        }
        line.push('\n');
        line
    }

    fn data_chunk(rel_path: &str, extraction: &Extraction) -> ChunkDraft {
        let mut text = format!("data: {rel_path}\n");
        for constant in &extraction.constants {
            text.push_str(&Self::data_line("const", constant));
        }
        for variable in &extraction.variables {
            text.push_str(&Self::data_line("var", variable));
        }

        let (start, end) = Self::line_range(
            extraction
                .constants
                .iter()
                .map(|c| (c.start_line, c.end_line))
                .chain(extraction.variables.iter().map(|v| (v.start_line, v.end_line))),
        );
        ChunkDraft {
            chunk_type: ChunkType::Data,
            title: format!("data: {rel_path}"),
            text,
            start_line: start,
            end_line: end,
            ordinal: 0,
        }
    }

    // ------------------------------------------------------------------
    // Docs
    // ------------------------------------------------------------------

    /// Sliding window over paragraph blocks with overlap carried between
    /// consecutive chunks. Code fences travel as one block.
    pub fn chunk_docs(&self, rel_path: &str, text: &str) -> Vec<ChunkDraft> {
        let blocks = Self::split_blocks(text);
        if blocks.is_empty() {
            return Vec::new();
        }

        let mut drafts: Vec<ChunkDraft> = Vec::new();
        let mut window: Vec<&Block> = Vec::new();
        let mut window_bytes = 0usize;

        let mut flush =
            |window: &mut Vec<&Block>, window_bytes: &mut usize, drafts: &mut Vec<ChunkDraft>| {
                if window.is_empty() {
                    return;
                }
                let ordinal = drafts.len() as u32;
                let text: String = window
                    .iter()
                    .map(|b| b.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                let title = Self::heading_title(&text)
                    .unwrap_or_else(|| format!("{rel_path}#{ordinal}"));
                drafts.push(ChunkDraft {
                    chunk_type: ChunkType::Doc,
                    title,
                    text,
                    start_line: window.first().map(|b| b.start_line).unwrap_or(1),
                    end_line: window.last().map(|b| b.end_line).unwrap_or(1),
                    ordinal,
                });

                // Seed the next window with trailing blocks up to the overlap
                let mut carried: Vec<&Block> = Vec::new();
                let mut carried_bytes = 0usize;
                for block in window.iter().rev() {
                    if carried_bytes + block.text.len() > self.doc_overlap_bytes {
                        break;
                    }
                    carried_bytes += block.text.len();
                    carried.push(block);
                }
                carried.reverse();
                *window_bytes = carried_bytes;
                *window = carried;
            };

        for block in &blocks {
            let fits = window_bytes + block.text.len() <= self.doc_target_bytes;
            if !window.is_empty() && !fits {
                flush(&mut window, &mut window_bytes, &mut drafts);
            }
            window_bytes += block.text.len();
            window.push(block);
        }
        flush(&mut window, &mut window_bytes, &mut drafts);

        // Overlap-only tails duplicate the previous chunk; drop them
        if drafts.len() > 1 {
            if let Some(last) = drafts.last() {
                if let Some(previous) = drafts.get(drafts.len() - 2) {
                    if previous.text.ends_with(&last.text) {
                        drafts.pop();
                    }
                }
            }
        }
        drafts
    }

    /// First non-empty markdown heading in the chunk text
    fn heading_title(text: &str) -> Option<String> {
        for line in text.lines() {
            let trimmed = line.trim();
            if let Some(heading) = trimmed.strip_prefix('#') {
                let heading = heading.trim_start_matches('#').trim();
                if !heading.is_empty() {
                    return Some(heading.to_string());
                }
            }
        }
        None
    }

    fn split_blocks(text: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut current = String::new();
        let mut start_line = 0u32;
        let mut in_fence = false;

        for (i, line) in text.lines().enumerate() {
            let line_no = i as u32 + 1;
            let trimmed = line.trim_start();
            let is_fence_marker = trimmed.starts_with("```") || trimmed.starts_with("~~~");

            if !in_fence && trimmed.is_empty() {
                if !current.is_empty() {
                    blocks.push(Block {
                        text: std::mem::take(&mut current),
                        start_line,
                        end_line: line_no - 1,
                    });
                }
                continue;
            }

            if current.is_empty() {
                start_line = line_no;
            } else {
                current.push('\n');
            }
            current.push_str(line);

            if is_fence_marker {
                if in_fence {
                    // Closing the fence ends the block so fenced code never
                    // straddles a window boundary
                    in_fence = false;
                    blocks.push(Block {
                        text: std::mem::take(&mut current),
                        start_line,
                        end_line: line_no,
                    });
                } else {
                    in_fence = true;
                }
            }
        }
        if !current.is_empty() {
            let end = text.lines().count() as u32;
            blocks.push(Block {
                text: current,
                start_line,
                end_line: end,
            });
        }
        blocks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}

struct Block {
    text: String,
    start_line: u32,
    end_line: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_domain::entities::{FunctionSymbol, SymbolKind, TypeSymbol};

    fn extraction_with_symbols() -> Extraction {
        Extraction {
            package: Some("main".into()),
            imports_count: 2,
            types: vec![TypeSymbol {
                name: "Server".into(),
                kind: SymbolKind::Struct,
                start_line: 5,
                end_line: 12,
            }],
            functions: vec![FunctionSymbol {
                name: "Start".into(),
                kind: SymbolKind::Method,
                start_line: 14,
                end_line: 20,
                signature: "(Server) Start() error".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_code_chunks_skip_empty_tiers() {
        let chunker = Chunker::new();
        let drafts = chunker.chunk_code("src/main.go", &extraction_with_symbols());
        // Definitions and data tiers are empty here, so only symbols emits
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].chunk_type, ChunkType::Symbols);
        assert_eq!(drafts[0].title, "symbols: src/main.go");
        assert!(drafts[0].text.contains("package main (imports: 2)"));
        assert!(drafts[0].text.contains("struct Server (lines 5-12)"));
        assert!(drafts[0].text.contains("(Server) Start() error (lines 14-20)"));
        assert_eq!(drafts[0].start_line, 5);
        assert_eq!(drafts[0].end_line, 20);
    }

    #[test]
    fn test_empty_extraction_yields_no_chunks() {
        let chunker = Chunker::new();
        assert!(chunker.chunk_code("a.go", &Extraction::default()).is_empty());
    }

    #[test]
    fn test_doc_chunks_have_ordinals_and_titles() {
        let chunker = Chunker::new().with_doc_window(64, 0);
        let text = "# Intro\n\nSome opening paragraph that runs long enough.\n\n\
                    ## Usage\n\nAnother paragraph with enough text to spill over.\n";
        let drafts = chunker.chunk_docs("README.md", text);
        assert!(drafts.len() >= 2);
        assert_eq!(drafts[0].ordinal, 0);
        assert_eq!(drafts[1].ordinal, 1);
        assert_eq!(drafts[0].title, "Intro");
    }

    #[test]
    fn test_doc_chunk_fallback_title() {
        let chunker = Chunker::new();
        let drafts = chunker.chunk_docs("notes.md", "plain paragraph, no heading\n");
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "notes.md#0");
    }

    #[test]
    fn test_code_fence_never_splits() {
        let chunker = Chunker::new().with_doc_window(32, 0);
        let text = "intro\n\n```\nlet a = 1;\n\nlet b = 2;\nlet c = 3;\n```\n\ntail\n";
        let drafts = chunker.chunk_docs("doc.md", text);
        let fenced: Vec<&ChunkDraft> = drafts
            .iter()
            .filter(|d| d.text.contains("let a = 1;"))
            .collect();
        assert_eq!(fenced.len(), 1);
        assert!(fenced[0].text.contains("let c = 3;"));
    }

    #[test]
    fn test_single_oversized_block_emitted_alone() {
        let chunker = Chunker::new().with_doc_window(8, 0);
        let text = "a paragraph much longer than eight bytes\n";
        let drafts = chunker.chunk_docs("doc.md", text);
        assert_eq!(drafts.len(), 1);
    }
}
