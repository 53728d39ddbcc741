//! TypeScript language extractor
//!
//! Also serves JavaScript: both languages share the TypeScript grammar, and
//! the JavaScript extractor delegates here overriding the language tag.

use cortex_domain::entities::{
    DataSymbol, Definition, Extraction, FunctionSymbol, SymbolKind, TypeSymbol,
};
use cortex_domain::error::Result;
use cortex_domain::value_objects::Language;
use tree_sitter::Node;

use super::common;
use super::Extractor;

/// Structural extractor for TypeScript (and, via delegation, JavaScript)
pub struct TypeScriptExtractor {
    language: Language,
}

impl TypeScriptExtractor {
    pub fn new() -> Self {
        Self {
            language: Language::TypeScript,
        }
    }

    /// Same extraction with a different reported language tag
    pub(crate) fn with_language(language: Language) -> Self {
        Self { language }
    }

    fn grammar() -> tree_sitter::Language {
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
    }

    fn type_symbol_kind(kind: &str) -> Option<SymbolKind> {
        match kind {
            "class_declaration" | "abstract_class_declaration" => Some(SymbolKind::Class),
            "interface_declaration" => Some(SymbolKind::Interface),
            "type_alias_declaration" => Some(SymbolKind::Type),
            "enum_declaration" => Some(SymbolKind::Enum),
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

    fn push_function(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        let Some(name_node) = common::field_or_kind(node, "name", &["identifier"]) else {
            return;
        };
        let name = common::text(name_node, source).to_string();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| common::flatten(common::text(p, source)))
            .unwrap_or_else(|| "()".to_string());
        let return_type = node
            .child_by_field_name("return_type")
            .map(|r| common::flatten(common::text(r, source)))
            .unwrap_or_default();
        let signature = format!("{name}{params}{return_type}");
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

    /// `const` declarators become Constants, `let` and `var` Variables
    fn push_data(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        let constant = node
            .child(0)
            .map(|t| common::text(t, source) == "const")
            .unwrap_or(false);
        for declarator in common::named_children(node) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = common::field_or_kind(declarator, "name", &["identifier"])
            else {
                continue;
            };
            if name_node.kind() != "identifier" {
                // Destructuring patterns carry no single name to index
                continue;
            }
            let symbol = DataSymbol {
                name: common::text(name_node, source).to_string(),
                value: declarator
                    .child_by_field_name("value")
                    .map(|v| common::flatten(common::text(v, source)))
                    .unwrap_or_default(),
                // type_annotation slices carry the leading colon
                type_text: declarator
                    .child_by_field_name("type")
                    .map(|t| {
                        common::flatten(common::text(t, source))
                            .trim_start_matches(':')
                            .trim_start()
                            .to_string()
                    })
                    .unwrap_or_default(),
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

    fn handle_top_level(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        if let Some(kind) = Self::type_symbol_kind(node.kind()) {
            Self::push_type(extraction, node, kind, source);
            return;
        }
        match node.kind() {
            "import_statement" => extraction.imports_count += 1,
            "function_declaration" | "generator_function_declaration" => {
                Self::push_function(extraction, node, source);
            }
            "lexical_declaration" | "variable_declaration" => {
                Self::push_data(extraction, node, source);
            }
            "export_statement" => {
                if let Some(decl) = node.child_by_field_name("declaration") {
                    Self::handle_top_level(extraction, decl, source);
                }
            }
            _ => {}
        }
    }
}

impl Default for TypeScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        self.language
    }

    fn extract(&self, _rel_path: &str, source: &str) -> Result<Option<Extraction>> {
        let Some(tree) = common::parse(&Self::grammar(), source)? else {
            return Ok(None);
        };
        let root = tree.root_node();

        let mut extraction = Extraction::default();
        for node in common::named_children(root) {
            Self::handle_top_level(&mut extraction, node, source);
        }
        Ok(Some(extraction))
    }
}
