//! Python language extractor

use cortex_domain::entities::{
    DataSymbol, Definition, Extraction, FunctionSymbol, SymbolKind, TypeSymbol,
};
use cortex_domain::error::Result;
use cortex_domain::value_objects::Language;
use tree_sitter::Node;

use super::common;
use super::Extractor;

/// Structural extractor for Python source files
pub struct PythonExtractor;

impl PythonExtractor {
    pub fn new() -> Self {
        Self
    }

    fn grammar() -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    /// An all-caps identifier (underscores and digits allowed) is a constant
    fn is_constant_name(name: &str) -> bool {
        let mut has_alpha = false;
        for ch in name.chars() {
            match ch {
                'A'..='Z' => has_alpha = true,
                '0'..='9' | '_' => {}
                _ => return false,
            }
        }
        has_alpha
    }

    fn function_signature(node: Node<'_>, source: &str, class_name: Option<&str>) -> Option<(String, String)> {
        let name_node = common::field_or_kind(node, "name", &["identifier"])?;
        let name = common::text(name_node, source).to_string();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| common::flatten(common::text(p, source)))
            .unwrap_or_else(|| "()".to_string());
        let ret = node
            .child_by_field_name("return_type")
            .map(|r| format!(" -> {}", common::flatten(common::text(r, source))))
            .unwrap_or_default();
        let signature = match class_name {
            Some(class) => format!("{class}.{name}{params}{ret}"),
            None => format!("{name}{params}{ret}"),
        };
        Some((name, signature))
    }

    fn push_function(
        extraction: &mut Extraction,
        node: Node<'_>,
        source: &str,
        class_name: Option<&str>,
    ) {
        let Some((name, signature)) = Self::function_signature(node, source, class_name) else {
            return;
        };
        let kind = if class_name.is_some() {
            SymbolKind::Method
        } else {
            SymbolKind::Function
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
            code: common::signature_definition(&signature),
            start_line: start,
            end_line: start,
        });
    }

    /// Register a class and walk its body for methods. Recurses into nested
    /// classes; recursion into function bodies is suppressed so nested
    /// functions never surface as methods.
    fn extract_class(extraction: &mut Extraction, node: Node<'_>, source: &str) {
        let Some(name_node) = common::field_or_kind(node, "name", &["identifier"]) else {
            return;
        };
        let class_name = common::text(name_node, source).to_string();
        let start = common::start_line(node);
        let end = common::end_line(node);
        extraction.types.push(TypeSymbol {
            name: class_name.clone(),
            kind: SymbolKind::Class,
            start_line: start,
            end_line: end,
        });
        extraction.definitions.push(Definition {
            name: class_name.clone(),
            kind: SymbolKind::Class,
            code: common::text(node, source).to_string(),
            start_line: start,
            end_line: end,
        });

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        for child in common::named_children(body) {
            Self::extract_class_member(extraction, child, source, &class_name);
        }
    }

    fn extract_class_member(
        extraction: &mut Extraction,
        node: Node<'_>,
        source: &str,
        class_name: &str,
    ) {
        match node.kind() {
            "function_definition" => {
                Self::push_function(extraction, node, source, Some(class_name));
            }
            "class_definition" => Self::extract_class(extraction, node, source),
            "decorated_definition" => {
                if let Some(inner) = node.child_by_field_name("definition") {
                    Self::extract_class_member(extraction, inner, source, class_name);
                }
            }
            _ => {}
        }
    }

    fn push_assignment(extraction: &mut Extraction, stmt: Node<'_>, source: &str) {
        let Some(assignment) = common::named_children(stmt)
            .into_iter()
            .find(|n| n.kind() == "assignment")
        else {
            return;
        };
        let Some(left) = assignment.child_by_field_name("left") else {
            return;
        };
        if left.kind() != "identifier" {
            return;
        }
        let name = common::text(left, source).to_string();
        let symbol = DataSymbol {
            value: assignment
                .child_by_field_name("right")
                .map(|r| common::flatten(common::text(r, source)))
                .unwrap_or_default(),
            type_text: assignment
                .child_by_field_name("type")
                .map(|t| common::flatten(common::text(t, source)))
                .unwrap_or_default(),
            start_line: common::start_line(assignment),
            end_line: common::end_line(assignment),
            name: name.clone(),
        };
        if Self::is_constant_name(&name) {
            extraction.constants.push(symbol);
        } else {
            extraction.variables.push(symbol);
        }
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract(&self, _rel_path: &str, source: &str) -> Result<Option<Extraction>> {
        let Some(tree) = common::parse(&Self::grammar(), source)? else {
            return Ok(None);
        };
        let root = tree.root_node();

        let mut extraction = Extraction::default();
        for node in common::named_children(root) {
            match node.kind() {
                "import_statement" | "import_from_statement" | "future_import_statement" => {
                    extraction.imports_count += 1;
                }
                "function_definition" => {
                    Self::push_function(&mut extraction, node, source, None);
                }
                "class_definition" => Self::extract_class(&mut extraction, node, source),
                "decorated_definition" => {
                    if let Some(inner) = node.child_by_field_name("definition") {
                        match inner.kind() {
                            "function_definition" => {
                                Self::push_function(&mut extraction, inner, source, None);
                            }
                            "class_definition" => {
                                Self::extract_class(&mut extraction, inner, source);
                            }
                            _ => {}
                        }
                    }
                }
                "expression_statement" => Self::push_assignment(&mut extraction, node, source),
                _ => {}
            }
        }
        Ok(Some(extraction))
    }
}
