//! Ruby language extractor

use cortex_domain::entities::{
    DataSymbol, Definition, Extraction, FunctionSymbol, SymbolKind, TypeSymbol,
};
use cortex_domain::error::Result;
use cortex_domain::value_objects::Language;
use tree_sitter::Node;

use super::common;
use super::Extractor;

const REQUIRE_METHODS: &[&str] = &["require", "require_relative", "load"];

/// Structural extractor for Ruby source files
pub struct RubyExtractor;

impl RubyExtractor {
    pub fn new() -> Self {
        Self
    }

    fn grammar() -> tree_sitter::Language {
        tree_sitter_ruby::LANGUAGE.into()
    }

    fn is_require(node: Node<'_>, source: &str) -> bool {
        if node.kind() != "call" {
            return false;
        }
        common::field_or_kind(node, "method", &["identifier"])
            .map(|m| REQUIRE_METHODS.contains(&common::text(m, source)))
            .unwrap_or(false)
    }

    fn push_method(
        extraction: &mut Extraction,
        node: Node<'_>,
        source: &str,
        scope: Option<(&str, char)>,
    ) {
        let Some(name_node) = common::field_or_kind(node, "name", &["identifier"]) else {
            return;
        };
        let name = common::text(name_node, source).to_string();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| common::flatten(common::text(p, source)))
            .unwrap_or_else(|| "()".to_string());
        let (kind, signature) = match scope {
            Some((owner, sep)) => (
                SymbolKind::Method,
                format!("{owner}{sep}{name}{params}"),
            ),
            None => (SymbolKind::Function, format!("{name}{params}")),
        };
        let start = common::start_line(node);
        extraction.functions.push(FunctionSymbol {
            name: name.clone(),
            kind,
            start_line: start,
            end_line: common::end_line(node),
            signature: signature.clone(),
        });
        extraction.definitions.push(Definition {
            name,
            kind,
            code: common::signature_definition(&format!("def {signature}")),
            start_line: start,
            end_line: start,
        });
    }

    fn extract_scope(extraction: &mut Extraction, node: Node<'_>, kind: SymbolKind, source: &str) {
        let Some(name_node) = common::field_or_kind(node, "name", &["constant", "scope_resolution"])
        else {
            return;
        };
        let name = common::text(name_node, source).to_string();
        let start = common::start_line(node);
        let end = common::end_line(node);
        extraction.types.push(TypeSymbol {
            name: name.clone(),
            kind,
            start_line: start,
            end_line: end,
        });
        extraction.definitions.push(Definition {
            name: name.clone(),
            kind,
            code: common::text(node, source).to_string(),
            start_line: start,
            end_line: end,
        });

        // The body is the run of named children after the name node
        for child in common::named_children(node) {
            Self::extract_scope_member(extraction, child, source, &name);
        }
    }

    fn extract_scope_member(
        extraction: &mut Extraction,
        node: Node<'_>,
        source: &str,
        owner: &str,
    ) {
        match node.kind() {
            // Instance methods bind with `#`, singleton methods with `.`
            "method" => Self::push_method(extraction, node, source, Some((owner, '#'))),
            "singleton_method" => Self::push_method(extraction, node, source, Some((owner, '.'))),
            "class" => Self::extract_scope(extraction, node, SymbolKind::Class, source),
            "module" => Self::extract_scope(extraction, node, SymbolKind::Module, source),
            "body_statement" => {
                for child in common::named_children(node) {
                    Self::extract_scope_member(extraction, child, source, owner);
                }
            }
            _ => {}
        }
    }

    /// Top-level `NAME = ...` is a constant, `$name = ...` a global variable
    fn push_assignment(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        let Some(left) = common::field_or_kind(node, "left", &["constant", "global_variable"])
        else {
            return;
        };
        let name = common::text(left, source).to_string();
        let value = node
            .child_by_field_name("right")
            .map(|r| common::flatten(common::text(r, source)))
            .unwrap_or_default();
        let symbol = DataSymbol {
            name: name.clone(),
            value,
            type_text: String::new(),
            start_line: common::start_line(node),
            end_line: common::end_line(node),
        };
        if left.kind() == "global_variable" || name.starts_with('$') {
            extraction.variables.push(symbol);
        } else if left.kind() == "constant"
            || name.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false)
        {
            extraction.constants.push(symbol);
        }
    }
}

impl Default for RubyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for RubyExtractor {
    fn language(&self) -> Language {
        Language::Ruby
    }

    fn extract(&self, _rel_path: &str, source: &str) -> Result<Option<Extraction>> {
        let Some(tree) = common::parse(&Self::grammar(), source)? else {
            return Ok(None);
        };
        let root = tree.root_node();

        let mut extraction = Extraction::default();
        for node in common::named_children(root) {
            match node.kind() {
                "call" if Self::is_require(node, source) => extraction.imports_count += 1,
                "class" => Self::extract_scope(&mut extraction, node, SymbolKind::Class, source),
                "module" => Self::extract_scope(&mut extraction, node, SymbolKind::Module, source),
                "method" => Self::push_method(&mut extraction, node, source, None),
                "assignment" => Self::push_assignment(&mut extraction, node, source),
                _ => {}
            }
        }
        Ok(Some(extraction))
    }
}
