//! PHP language extractor
//!
//! Class constants are read through positional child access on
//! `const_element` nodes; the grammar exposes no field names there.

use cortex_domain::entities::{
    DataSymbol, Definition, Extraction, FunctionSymbol, SymbolKind, TypeSymbol,
};
use cortex_domain::error::Result;
use cortex_domain::value_objects::Language;
use tree_sitter::Node;

use super::common;
use super::Extractor;

/// Structural extractor for PHP source files
pub struct PhpExtractor;

impl PhpExtractor {
    pub fn new() -> Self {
        Self
    }

    fn grammar() -> tree_sitter::Language {
        tree_sitter_php::LANGUAGE_PHP.into()
    }

    fn type_symbol_kind(kind: &str) -> Option<SymbolKind> {
        match kind {
            "class_declaration" => Some(SymbolKind::Class),
            "interface_declaration" => Some(SymbolKind::Interface),
            "trait_declaration" => Some(SymbolKind::Trait),
            _ => None,
        }
    }

    fn push_method(extraction: &mut Extraction, node: Node<'_>, source: &str, class_name: &str) {
        let Some(name_node) = common::field_or_kind(node, "name", &["name"]) else {
            return;
        };
        let name = common::text(name_node, source).to_string();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| common::flatten(common::text(p, source)))
            .unwrap_or_else(|| "()".to_string());
        let signature = format!("{class_name}->{name}{params}");
        let start = common::start_line(node);
        extraction.functions.push(FunctionSymbol {
            name: name.clone(),
            kind: SymbolKind::Method,
            start_line: start,
            end_line: common::end_line(node),
            signature: signature.clone(),
        });
        extraction.definitions.push(Definition {
            name,
            kind: SymbolKind::Method,
            code: common::signature_definition(&signature),
            start_line: start,
            end_line: start,
        });
    }

    /// `const_element` has no named fields: the name is the first named
    /// child, the value the one following the `=` token.
    fn push_const_declaration(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        for element in common::named_children(node) {
            if element.kind() != "const_element" {
                continue;
            }
            let children = common::named_children(element);
            let Some(name_node) = children.first() else {
                continue;
            };
            let value = children
                .get(1)
                .map(|v| common::flatten(common::text(*v, source)))
                .unwrap_or_default();
            extraction.constants.push(DataSymbol {
                name: common::text(*name_node, source).to_string(),
                value,
                type_text: String::new(),
                start_line: common::start_line(element),
                end_line: common::end_line(element),
            });
        }
    }

    fn extract_type(extraction: &mut Extraction, node: Node<'_>, kind: SymbolKind, source: &str) {
        let Some(name_node) = common::field_or_kind(node, "name", &["name"]) else {
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

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for child in common::named_children(body) {
            match child.kind() {
                "method_declaration" => Self::push_method(extraction, child, source, &name),
                "const_declaration" => Self::push_const_declaration(extraction, child, source),
                _ => {}
            }
        }
    }

    fn push_function(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        let Some(name_node) = common::field_or_kind(node, "name", &["name"]) else {
            return;
        };
        let name = common::text(name_node, source).to_string();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| common::flatten(common::text(p, source)))
            .unwrap_or_else(|| "()".to_string());
        let signature = format!("{name}{params}");
        let start = common::start_line(node);
        extraction.functions.push(FunctionSymbol {
            name: name.clone(),
            kind: SymbolKind::Function,
            start_line: start,
            end_line: common::end_line(node),
            signature: signature.clone(),
        });
        extraction.definitions.push(Definition {
            name,
            kind: SymbolKind::Function,
            code: common::signature_definition(&format!("function {signature}")),
            start_line: start,
            end_line: start,
        });
    }
}

impl Default for PhpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for PhpExtractor {
    fn language(&self) -> Language {
        Language::Php
    }

    fn extract(&self, _rel_path: &str, source: &str) -> Result<Option<Extraction>> {
        let Some(tree) = common::parse(&Self::grammar(), source)? else {
            return Ok(None);
        };
        let root = tree.root_node();

        let mut extraction = Extraction::default();
        for node in common::named_children(root) {
            if let Some(kind) = Self::type_symbol_kind(node.kind()) {
                Self::extract_type(&mut extraction, node, kind, source);
                continue;
            }
            match node.kind() {
                "namespace_definition" => {
                    extraction.package = common::field_or_kind(node, "name", &["namespace_name"])
                        .map(|n| common::text(n, source).to_string());
                }
                "namespace_use_declaration" => extraction.imports_count += 1,
                "function_definition" => Self::push_function(&mut extraction, node, source),
                "const_declaration" => {
                    Self::push_const_declaration(&mut extraction, node, source);
                }
                _ => {}
            }
        }
        Ok(Some(extraction))
    }
}
