//! Structural extraction model
//!
//! The language-agnostic three-tier summary of one source file. Every
//! extractor produces this shape so chunking and persistence never see
//! parse-tree types.

use serde::{Deserialize, Serialize};

/// Kind of an extracted construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Struct,
    Class,
    Interface,
    Enum,
    Trait,
    Module,
    Type,
    Union,
    Function,
    Method,
}

impl SymbolKind {
    /// Stable string tag
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Struct => "struct",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Enum => "enum",
            SymbolKind::Trait => "trait",
            SymbolKind::Module => "module",
            SymbolKind::Type => "type",
            SymbolKind::Union => "union",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
        }
    }

    /// Whether this kind names a type-like construct
    pub fn is_type(&self) -> bool {
        !matches!(self, SymbolKind::Function | SymbolKind::Method)
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type-like symbol (struct, class, interface, enum, trait, module, alias)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub start_line: u32,
    pub end_line: u32,
}

/// A function or method symbol with its constructed signature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub start_line: u32,
    pub end_line: u32,
    pub signature: String,
}

/// A definition carrying verbatim source: the full body for types, the
/// signature plus `{ ... }` for functions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub kind: SymbolKind,
    pub code: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// A constant or variable with its value and optional type text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSymbol {
    pub name: String,
    pub value: String,
    pub type_text: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// The three-tier structural summary of one file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// Package / namespace name, when the language has one
    pub package: Option<String>,
    /// Number of import-like declarations
    pub imports_count: u32,
    /// Symbols tier: types
    pub types: Vec<TypeSymbol>,
    /// Symbols tier: functions and methods
    pub functions: Vec<FunctionSymbol>,
    /// Definitions tier
    pub definitions: Vec<Definition>,
    /// Data tier: constants
    pub constants: Vec<DataSymbol>,
    /// Data tier: variables
    pub variables: Vec<DataSymbol>,
}

impl Extraction {
    /// Whether the symbols tier would render anything
    pub fn has_symbols(&self) -> bool {
        self.package.is_some()
            || self.imports_count > 0
            || !self.types.is_empty()
            || !self.functions.is_empty()
    }

    /// Whether the definitions tier would render anything
    pub fn has_definitions(&self) -> bool {
        !self.definitions.is_empty()
    }

    /// Whether the data tier would render anything
    pub fn has_data(&self) -> bool {
        !self.constants.is_empty() || !self.variables.is_empty()
    }

    /// Whether the extraction carries no constructs at all
    pub fn is_empty(&self) -> bool {
        !self.has_symbols() && !self.has_definitions() && !self.has_data()
    }

    /// Clamp every recorded line range into `1..=file_line_count`.
    ///
    /// Extractors compute ranges from tree-sitter positions, which are
    /// already in range for well-formed trees; this keeps the invariant even
    /// for grammars that report a node ending past the final newline.
    pub fn clamp_lines(&mut self, file_line_count: u32) {
        let max = file_line_count.max(1);
        let fix = |start: &mut u32, end: &mut u32| {
            *start = (*start).clamp(1, max);
            *end = (*end).clamp(*start, max);
        };
        for t in &mut self.types {
            fix(&mut t.start_line, &mut t.end_line);
        }
        for f in &mut self.functions {
            fix(&mut f.start_line, &mut f.end_line);
        }
        for d in &mut self.definitions {
            fix(&mut d.start_line, &mut d.end_line);
        }
        for c in &mut self.constants {
            fix(&mut c.start_line, &mut c.end_line);
        }
        for v in &mut self.variables {
            fix(&mut v.start_line, &mut v.end_line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_extraction_has_no_tiers() {
        let e = Extraction::default();
        assert!(e.is_empty());
        assert!(!e.has_symbols());
        assert!(!e.has_definitions());
        assert!(!e.has_data());
    }

    #[test]
    fn test_package_alone_fills_symbols_tier() {
        let e = Extraction {
            package: Some("main".into()),
            ..Default::default()
        };
        assert!(e.has_symbols());
        assert!(!e.is_empty());
    }

    #[test]
    fn test_clamp_lines() {
        let mut e = Extraction::default();
        e.types.push(TypeSymbol {
            name: "T".into(),
            kind: SymbolKind::Struct,
            start_line: 0,
            end_line: 99,
        });
        e.clamp_lines(10);
        assert_eq!(e.types[0].start_line, 1);
        assert_eq!(e.types[0].end_line, 10);
    }
}
