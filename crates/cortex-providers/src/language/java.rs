//! Java language extractor
//!
//! Classes, interfaces, and enums are extracted with the methods inside
//! their bodies. Static fields surface in the data tier: `static final`
//! fields as constants, other `static` fields as variables. Instance fields
//! are not extracted.

use cortex_domain::entities::{
    DataSymbol, Definition, Extraction, FunctionSymbol, SymbolKind, TypeSymbol,
};
use cortex_domain::error::Result;
use cortex_domain::value_objects::Language;
use tree_sitter::Node;

use super::common;
use super::Extractor;

/// Structural extractor for Java source files
pub struct JavaExtractor;

impl JavaExtractor {
    pub fn new() -> Self {
        Self
    }

    fn grammar() -> tree_sitter::Language {
        tree_sitter_java::LANGUAGE.into()
    }

    fn package_name(root: Node<'_>, source: &str) -> Option<String> {
        let decl = common::named_children(root)
            .into_iter()
            .find(|n| n.kind() == "package_declaration")?;
        common::find_descendant(decl, &["scoped_identifier", "identifier"])
            .map(|n| common::text(n, source).to_string())
    }

    fn type_symbol_kind(kind: &str) -> Option<SymbolKind> {
        match kind {
            "class_declaration" => Some(SymbolKind::Class),
            "interface_declaration" => Some(SymbolKind::Interface),
            "enum_declaration" => Some(SymbolKind::Enum),
            _ => None,
        }
    }

    fn push_method(
        extraction: &mut Extraction,
        node: Node<'_>,
        source: &str,
        class_name: &str,
    ) {
        let Some(name_node) = common::field_or_kind(node, "name", &["identifier"]) else {
            return;
        };
        let name = common::text(name_node, source).to_string();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| common::flatten(common::text(p, source)))
            .unwrap_or_else(|| "()".to_string());
        let ret = node
            .child_by_field_name("type")
            .map(|t| format!(": {}", common::flatten(common::text(t, source))))
            .unwrap_or_default();
        let signature = format!("{class_name}.{name}{params}{ret}");
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

    /// `static final` fields become constants, plain `static` fields
    /// variables; instance fields are skipped
    fn push_field(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        let modifiers = common::named_children(node)
            .into_iter()
            .find(|n| n.kind() == "modifiers")
            .map(|m| common::text(m, source).to_string())
            .unwrap_or_default();
        if !modifiers.contains("static") {
            return;
        }
        let constant = modifiers.contains("final");
        let type_text = node
            .child_by_field_name("type")
            .map(|t| common::flatten(common::text(t, source)))
            .unwrap_or_default();
        for declarator in common::named_children(node) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = common::field_or_kind(declarator, "name", &["identifier"])
            else {
                continue;
            };
            let symbol = DataSymbol {
                name: common::text(name_node, source).to_string(),
                value: declarator
                    .child_by_field_name("value")
                    .map(|v| common::flatten(common::text(v, source)))
                    .unwrap_or_default(),
                type_text: type_text.clone(),
                start_line: common::start_line(declarator),
                end_line: common::end_line(declarator),
            };
            if constant {
                extraction.constants.push(symbol);
            } else {
                extraction.variables.push(symbol);
            }
        }
    }

    fn extract_type(extraction: &mut Extraction, node: Node<'_>, kind: SymbolKind, source: &str) {
        let Some(name_node) = common::field_or_kind(node, "name", &["identifier"]) else {
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
        Self::extract_body(extraction, body, source, &name);
    }

    fn extract_body(extraction: &mut Extraction, body: Node<'_>, source: &str, class_name: &str) {
        for child in common::named_children(body) {
            match child.kind() {
                "method_declaration" | "constructor_declaration" => {
                    Self::push_method(extraction, child, source, class_name);
                }
                "field_declaration" => Self::push_field(extraction, child, source),
                // enum bodies nest their members one level deeper
                "enum_body_declarations" => {
                    Self::extract_body(extraction, child, source, class_name);
                }
                _ => {
                    if let Some(kind) = Self::type_symbol_kind(child.kind()) {
                        Self::extract_type(extraction, child, kind, source);
                    }
                }
            }
        }
    }
}

impl Default for JavaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for JavaExtractor {
    fn language(&self) -> Language {
        Language::Java
    }

    fn extract(&self, _rel_path: &str, source: &str) -> Result<Option<Extraction>> {
        let Some(tree) = common::parse(&Self::grammar(), source)? else {
            return Ok(None);
        };
        let root = tree.root_node();

        let mut extraction = Extraction {
            package: Self::package_name(root, source),
            ..Default::default()
        };

        for node in common::named_children(root) {
            if node.kind() == "import_declaration" {
                extraction.imports_count += 1;
                continue;
            }
            if let Some(kind) = Self::type_symbol_kind(node.kind()) {
                Self::extract_type(&mut extraction, node, kind, source);
            }
        }
        Ok(Some(extraction))
    }
}
