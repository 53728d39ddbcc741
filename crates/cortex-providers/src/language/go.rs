//! Go language extractor

use cortex_domain::entities::{
    DataSymbol, Definition, Extraction, FunctionSymbol, SymbolKind, TypeSymbol,
};
use cortex_domain::error::Result;
use cortex_domain::value_objects::Language;
use tree_sitter::Node;

use super::common;
use super::Extractor;

/// Structural extractor for Go source files
pub struct GoExtractor;

impl GoExtractor {
    pub fn new() -> Self {
        Self
    }

    fn grammar() -> tree_sitter::Language {
        tree_sitter_go::LANGUAGE.into()
    }

    fn package_name(root: Node<'_>, source: &str) -> Option<String> {
        let clause = common::named_children(root)
            .into_iter()
            .find(|n| n.kind() == "package_clause")?;
        common::field_or_kind(clause, "name", &["package_identifier"])
            .map(|n| common::text(n, source).to_string())
    }

    fn count_imports(root: Node<'_>) -> u32 {
        let mut count: u32 = 0;
        for decl in common::named_children(root) {
            if decl.kind() != "import_declaration" {
                continue;
            }
            common::visit(decl, &mut |n| {
                if n.kind() == "import_spec" {
                    count += 1;
                    return false;
                }
                true
            });
        }
        count
    }

    /// Receiver type name, with any pointer stripped: `(s *Server)` → `Server`
    fn receiver_type(method: Node<'_>, source: &str) -> Option<String> {
        let receiver = method.child_by_field_name("receiver")?;
        let param = common::named_children(receiver)
            .into_iter()
            .find(|n| n.kind() == "parameter_declaration")?;
        let ty = common::field_or_kind(param, "type", &["type_identifier", "pointer_type", "generic_type"])?;
        let text = common::text(ty, source).trim_start_matches('*').trim();
        Some(text.to_string())
    }

    fn function_signature(node: Node<'_>, source: &str, receiver: Option<&str>) -> Option<(String, String)> {
        let name_node = common::field_or_kind(node, "name", &["identifier", "field_identifier"])?;
        let name = common::text(name_node, source).to_string();
        let params = node
            .child_by_field_name("parameters")
            .map(|p| common::flatten(common::text(p, source)))
            .unwrap_or_else(|| "()".to_string());
        let result = node
            .child_by_field_name("result")
            .map(|r| format!(" {}", common::flatten(common::text(r, source))))
            .unwrap_or_default();
        let signature = match receiver {
            Some(recv) => format!("({recv}) {name}{params}{result}"),
            None => format!("{name}{params}{result}"),
        };
        Some((name, signature))
    }

    fn push_function(
        extraction: &mut Extraction,
        node: Node<'_>,
        source: &str,
        receiver: Option<&str>,
    ) {
        let Some((name, signature)) = Self::function_signature(node, source, receiver) else {
            return;
        };
        let kind = if receiver.is_some() {
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
            code: common::signature_definition(&format!("func {signature}")),
            start_line: start,
            end_line: start,
        });
    }

    fn type_kind(spec: Node<'_>) -> SymbolKind {
        match spec.child_by_field_name("type").map(|t| t.kind()) {
            Some("struct_type") => SymbolKind::Struct,
            Some("interface_type") => SymbolKind::Interface,
            _ => SymbolKind::Type,
        }
    }

    fn push_types(extraction: &mut Extraction, decl: Node<'_>, source: &str) {
        let specs: Vec<Node<'_>> = common::named_children(decl)
            .into_iter()
            .filter(|n| matches!(n.kind(), "type_spec" | "type_alias"))
            .collect();
        let grouped = specs.len() > 1;
        for spec in specs {
            let Some(name_node) = common::field_or_kind(spec, "name", &["type_identifier"]) else {
                continue;
            };
            let name = common::text(name_node, source).to_string();
            let kind = Self::type_kind(spec);
            let (node_for_range, code) = if grouped {
                (spec, format!("type {}", common::text(spec, source)))
            } else {
                (decl, common::text(decl, source).to_string())
            };
            let start = common::start_line(node_for_range);
            let end = common::end_line(node_for_range);
            extraction.types.push(TypeSymbol {
                name: name.clone(),
                kind,
                start_line: start,
                end_line: end,
            });
            extraction.definitions.push(Definition {
                name,
                kind,
                code,
                start_line: start,
                end_line: end,
            });
        }
    }

    fn push_data(extraction: &mut Extraction, decl: Node<'_>, source: &str, constant: bool) {
        for spec in common::named_children(decl) {
            if !matches!(spec.kind(), "const_spec" | "var_spec") {
                continue;
            }
            let mut cursor = spec.walk();
            let names: Vec<String> = spec
                .children_by_field_name("name", &mut cursor)
                .map(|n| common::text(n, source).to_string())
                .collect();
            let type_text = spec
                .child_by_field_name("type")
                .map(|t| common::flatten(common::text(t, source)))
                .unwrap_or_default();
            let values: Vec<String> = spec
                .child_by_field_name("value")
                .map(|v| {
                    common::named_children(v)
                        .into_iter()
                        .map(|e| common::flatten(common::text(e, source)))
                        .collect()
                })
                .unwrap_or_default();
            for (i, name) in names.into_iter().enumerate() {
                let symbol = DataSymbol {
                    name,
                    value: values.get(i).cloned().unwrap_or_default(),
                    type_text: type_text.clone(),
                    start_line: common::start_line(spec),
                    end_line: common::end_line(spec),
                };
                if constant {
                    extraction.constants.push(symbol);
                } else {
                    extraction.variables.push(symbol);
                }
            }
        }
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for GoExtractor {
    fn language(&self) -> Language {
        Language::Go
    }

    fn extract(&self, _rel_path: &str, source: &str) -> Result<Option<Extraction>> {
        let Some(tree) = common::parse(&Self::grammar(), source)? else {
            return Ok(None);
        };
        let root = tree.root_node();

        let mut extraction = Extraction {
            package: Self::package_name(root, source),
            imports_count: Self::count_imports(root),
            ..Default::default()
        };

        for node in common::named_children(root) {
            match node.kind() {
                "function_declaration" => {
                    Self::push_function(&mut extraction, node, source, None);
                }
                "method_declaration" => {
                    let receiver = Self::receiver_type(node, source);
                    Self::push_function(&mut extraction, node, source, receiver.as_deref());
                }
                "type_declaration" => Self::push_types(&mut extraction, node, source),
                "const_declaration" => Self::push_data(&mut extraction, node, source, true),
                "var_declaration" => Self::push_data(&mut extraction, node, source, false),
                _ => {}
            }
        }

        Ok(Some(extraction))
    }
}
