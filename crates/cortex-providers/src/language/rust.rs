//! Rust language extractor

use cortex_domain::entities::{
    DataSymbol, Definition, Extraction, FunctionSymbol, SymbolKind, TypeSymbol,
};
use cortex_domain::error::Result;
use cortex_domain::value_objects::Language;
use tree_sitter::Node;

use super::common;
use super::Extractor;

/// Structural extractor for Rust source files
pub struct RustExtractor;

impl RustExtractor {
    pub fn new() -> Self {
        Self
    }

    fn grammar() -> tree_sitter::Language {
        tree_sitter_rust::LANGUAGE.into()
    }

    fn type_symbol_kind(kind: &str) -> Option<SymbolKind> {
        match kind {
            "struct_item" => Some(SymbolKind::Struct),
            "enum_item" => Some(SymbolKind::Enum),
            "trait_item" => Some(SymbolKind::Trait),
            "union_item" => Some(SymbolKind::Union),
            "type_item" => Some(SymbolKind::Type),
            "mod_item" => Some(SymbolKind::Module),
            _ => None,
        }
    }

    fn push_type(extraction: &mut Extraction, node: Node<'_>, kind: SymbolKind, source: &str) {
        let Some(name_node) =
            common::field_or_kind(node, "name", &["type_identifier", "identifier"])
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
            name,
            kind,
            code: common::text(node, source).to_string(),
            start_line: start,
            end_line: end,
        });
    }

    fn push_function(
        extraction: &mut Extraction,
        node: Node<'_>,
        source: &str,
        impl_type: Option<&str>,
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
            .child_by_field_name("return_type")
            .map(|r| format!(" -> {}", common::flatten(common::text(r, source))))
            .unwrap_or_default();
        let (kind, signature) = match impl_type {
            Some(ty) => (SymbolKind::Method, format!("{ty}::{name}{params}{ret}")),
            None => (SymbolKind::Function, format!("{name}{params}{ret}")),
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
            code: common::signature_definition(&format!("fn {signature}")),
            start_line: start,
            end_line: start,
        });
    }

    /// Methods come from impl blocks, prefixed with the implementing type
    fn extract_impl(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        let impl_type = node
            .child_by_field_name("type")
            .map(|t| {
                let text = common::text(t, source);
                text.split('<').next().unwrap_or(text).trim().to_string()
            })
            .unwrap_or_default();
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for child in common::named_children(body) {
            if child.kind() == "function_item" {
                Self::push_function(extraction, child, source, Some(&impl_type));
            }
        }
    }

    fn push_data(extraction: &mut Extraction, node: Node<'_>, source: &str, constant: bool) {
        let Some(name_node) = common::field_or_kind(node, "name", &["identifier"]) else {
            return;
        };
        let symbol = DataSymbol {
            name: common::text(name_node, source).to_string(),
            value: node
                .child_by_field_name("value")
                .map(|v| common::flatten(common::text(v, source)))
                .unwrap_or_default(),
            type_text: node
                .child_by_field_name("type")
                .map(|t| common::flatten(common::text(t, source)))
                .unwrap_or_default(),
            start_line: common::start_line(node),
            end_line: common::end_line(node),
        };
        if constant {
            extraction.constants.push(symbol);
        } else {
            extraction.variables.push(symbol);
        }
    }
}

impl Default for RustExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for RustExtractor {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn extract(&self, _rel_path: &str, source: &str) -> Result<Option<Extraction>> {
        let Some(tree) = common::parse(&Self::grammar(), source)? else {
            return Ok(None);
        };
        let root = tree.root_node();

        let mut extraction = Extraction::default();
        for node in common::named_children(root) {
            if let Some(kind) = Self::type_symbol_kind(node.kind()) {
                Self::push_type(&mut extraction, node, kind, source);
                continue;
            }
            match node.kind() {
                "use_declaration" => extraction.imports_count += 1,
                "function_item" => Self::push_function(&mut extraction, node, source, None),
                "impl_item" => Self::extract_impl(&mut extraction, node, source),
                "const_item" => Self::push_data(&mut extraction, node, source, true),
                "static_item" => Self::push_data(&mut extraction, node, source, false),
                _ => {}
            }
        }
        Ok(Some(extraction))
    }
}
