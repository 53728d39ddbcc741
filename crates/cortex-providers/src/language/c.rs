//! C and C++ language extractor
//!
//! Both languages share the C++ grammar; the extractors differ only in the
//! extension set that dispatches to them and the language tag they report.

use cortex_domain::entities::{
    DataSymbol, Definition, Extraction, FunctionSymbol, SymbolKind, TypeSymbol,
};
use cortex_domain::error::Result;
use cortex_domain::value_objects::Language;
use tree_sitter::Node;

use super::common;
use super::Extractor;

/// Structural extractor for C and C++ source files
pub struct CFamilyExtractor {
    language: Language,
}

impl CFamilyExtractor {
    /// Extractor reporting the `c` language tag
    pub fn c() -> Self {
        Self {
            language: Language::C,
        }
    }

    /// Extractor reporting the `cpp` language tag
    pub fn cpp() -> Self {
        Self {
            language: Language::Cpp,
        }
    }

    fn grammar() -> tree_sitter::Language {
        tree_sitter_cpp::LANGUAGE.into()
    }

    fn specifier_kind(kind: &str) -> Option<SymbolKind> {
        match kind {
            "struct_specifier" => Some(SymbolKind::Struct),
            "class_specifier" => Some(SymbolKind::Class),
            "enum_specifier" => Some(SymbolKind::Enum),
            "union_specifier" => Some(SymbolKind::Union),
            _ => None,
        }
    }

    /// Walk declarator wrappers (pointers, arrays, parens) down to the name
    fn declarator_name<'t>(node: Node<'t>) -> Option<Node<'t>> {
        let mut current = node;
        loop {
            match current.kind() {
                "identifier" | "field_identifier" | "type_identifier" | "operator_name"
                | "destructor_name" => return Some(current),
                "qualified_identifier" => match current.child_by_field_name("name") {
                    Some(inner) => current = inner,
                    None => return Some(current),
                },
                _ => match current.child_by_field_name("declarator") {
                    Some(inner) => current = inner,
                    None => {
                        return common::find_descendant(
                            current,
                            &["identifier", "field_identifier"],
                        )
                    }
                },
            }
        }
    }

    /// Signature = return-type slice + declarator slice, body dropped
    fn push_function(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        let Some(declarator) = node.child_by_field_name("declarator") else {
            return;
        };
        let Some(name_node) = Self::declarator_name(declarator) else {
            return;
        };
        let name = common::text(name_node, source).to_string();
        let return_type = node
            .child_by_field_name("type")
            .map(|t| common::flatten(common::text(t, source)))
            .unwrap_or_default();
        let declarator_text = common::flatten(common::text(declarator, source));
        let signature = if return_type.is_empty() {
            declarator_text
        } else {
            format!("{return_type} {declarator_text}")
        };
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
            code: common::signature_definition(&signature),
            start_line: start,
            end_line: start,
        });
    }

    fn push_specifier(
        extraction: &mut Extraction,
        specifier: Node<'_>,
        enclosing: Node<'_>,
        kind: SymbolKind,
        source: &str,
    ) {
        // Anonymous specifiers (typedef struct { ... } Foo) are named by the
        // enclosing type_definition instead
        let Some(name_node) = common::field_or_kind(specifier, "name", &["type_identifier"])
        else {
            return;
        };
        let name = common::text(name_node, source).to_string();
        let start = common::start_line(enclosing);
        let end = common::end_line(enclosing);
        extraction.types.push(TypeSymbol {
            name: name.clone(),
            kind,
            start_line: start,
            end_line: end,
        });
        extraction.definitions.push(Definition {
            name,
            kind,
            code: common::text(enclosing, source).to_string(),
            start_line: start,
            end_line: end,
        });
    }

    fn is_const_declaration(node: Node<'_>, source: &str) -> bool {
        common::named_children(node)
            .into_iter()
            .any(|c| c.kind() == "type_qualifier" && common::text(c, source).contains("const"))
    }

    /// Top-level declarations: a type specifier with a body registers a
    /// type; declarators register constants (const-qualified) or variables.
    fn push_declaration(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        if let Some(type_node) = node.child_by_field_name("type") {
            if let Some(kind) = Self::specifier_kind(type_node.kind()) {
                if type_node.child_by_field_name("body").is_some() {
                    Self::push_specifier(extraction, type_node, node, kind, source);
                }
            }
        }

        let constant = Self::is_const_declaration(node, source);
        let type_text = node
            .child_by_field_name("type")
            .map(|t| common::flatten(common::text(t, source)))
            .unwrap_or_default();
        for child in common::named_children(node) {
            let (declarator, value) = match child.kind() {
                "init_declarator" => (
                    child.child_by_field_name("declarator"),
                    child.child_by_field_name("value"),
                ),
                "array_declarator" | "pointer_declarator" => (Some(child), None),
                "identifier" => (Some(child), None),
                _ => continue,
            };
            let Some(declarator) = declarator else { continue };
            // Prototypes are declarations with a function declarator; skip
            if declarator.kind() == "function_declarator"
                || common::find_descendant(declarator, &["function_declarator"]).is_some()
            {
                continue;
            }
            let Some(name_node) = Self::declarator_name(declarator) else {
                continue;
            };
            let symbol = DataSymbol {
                name: common::text(name_node, source).to_string(),
                value: value
                    .map(|v| common::flatten(common::text(v, source)))
                    .unwrap_or_default(),
                type_text: type_text.clone(),
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

    fn push_type_definition(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        let Some(name_node) =
            common::field_or_kind(node, "declarator", &["type_identifier"])
        else {
            return;
        };
        let Some(name_node) = Self::declarator_name(name_node) else {
            return;
        };
        let name = common::text(name_node, source).to_string();
        let start = common::start_line(node);
        let end = common::end_line(node);
        extraction.types.push(TypeSymbol {
            name: name.clone(),
            kind: SymbolKind::Type,
            start_line: start,
            end_line: end,
        });
        extraction.definitions.push(Definition {
            name,
            kind: SymbolKind::Type,
            code: common::text(node, source).to_string(),
            start_line: start,
            end_line: end,
        });
    }

    fn handle_top_level(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        if let Some(kind) = Self::specifier_kind(node.kind()) {
            Self::push_specifier(extraction, node, node, kind, source);
            return;
        }
        match node.kind() {
            "preproc_include" => extraction.imports_count += 1,
            "function_definition" => Self::push_function(extraction, node, source),
            "declaration" => Self::push_declaration(extraction, node, source),
            "type_definition" => Self::push_type_definition(extraction, node, source),
            // Namespace contents count as top level for extraction purposes
            "namespace_definition" => {
                if let Some(body) = node.child_by_field_name("body") {
                    for child in common::named_children(body) {
                        Self::handle_top_level(extraction, child, source);
                    }
                }
            }
            "template_declaration" => {
                for child in common::named_children(node) {
                    Self::handle_top_level(extraction, child, source);
                }
            }
            _ => {}
        }
    }
}

impl Extractor for CFamilyExtractor {
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
