//! Shared tree-sitter traversal primitives
//!
//! Every extractor is built on the same pieces: a best-effort parse, a
//! pre-order visitor with a descend flag, field-name lookup with positional
//! fallback, and 1-indexed line math.

use cortex_domain::error::{Error, Result};
use tree_sitter::{Node, Parser, Tree};

/// Parse source with the given grammar.
///
/// Returns `Ok(None)` when tree-sitter produced no tree at all; partial
/// trees with error nodes are returned as-is for best-effort extraction.
pub(crate) fn parse(language: &tree_sitter::Language, source: &str) -> Result<Option<Tree>> {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|e| Error::internal(format!("grammar rejected by tree-sitter: {e}")))?;
    Ok(parser.parse(source, None))
}

/// Pre-order traversal. The callback returns whether to descend into the
/// node's children, which is how extractors stop at class bodies or nested
/// functions.
pub(crate) fn visit<'t>(node: Node<'t>, f: &mut dyn FnMut(Node<'t>) -> bool) {
    if !f(node) {
        return;
    }
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i as u32) {
            visit(child, f);
        }
    }
}

/// Verbatim source slice of a node
pub(crate) fn text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

/// 1-indexed first line of a node
pub(crate) fn start_line(node: Node<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

/// 1-indexed last line a node occupies. A node whose end position sits at
/// column 0 of the following line ends on the previous one.
pub(crate) fn end_line(node: Node<'_>) -> u32 {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row {
        end.row as u32
    } else {
        end.row as u32 + 1
    }
}

/// All named children of a node
pub(crate) fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    (0..node.named_child_count())
        .filter_map(|i: usize| node.named_child(i as u32))
        .collect()
}

/// Field lookup with positional fallback: try the field name first, then the
/// first named child whose kind is in `kinds`.
pub(crate) fn field_or_kind<'t>(
    node: Node<'t>,
    field: &str,
    kinds: &[&str],
) -> Option<Node<'t>> {
    node.child_by_field_name(field)
        .or_else(|| named_children(node).into_iter().find(|c| kinds.contains(&c.kind())))
}

/// First named descendant (pre-order) whose kind is in `kinds`. Used as the
/// last-resort identifier fallback before a construct is skipped.
pub(crate) fn find_descendant<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut found = None;
    visit(node, &mut |n| {
        if found.is_some() {
            return false;
        }
        if n.id() != node.id() && kinds.contains(&n.kind()) {
            found = Some(n);
            return false;
        }
        true
    });
    found
}

/// A function definition rendered for the definitions tier: the signature
/// with the body replaced by `{ ... }`
pub(crate) fn signature_definition(signature: &str) -> String {
    format!("{} {{ ... }}", signature.trim_end())
}

/// Collapse a parameter list slice onto one line
pub(crate) fn flatten(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}
