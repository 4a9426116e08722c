//! Source Model Builder: Python text to [`SourceModel`].
//!
//! Parsing goes through tree-sitter-python. tree-sitter recovers from
//! syntax errors instead of failing, so any `ERROR` or `MISSING` node in the
//! tree is turned into a [`ParseError`] located at the first such node.

mod builder;
mod docstrings;

use crate::core::{ParseError, SourceModel};
use tree_sitter::{Node, Parser, Point};

pub use docstrings::strip_string_literal;

/// Parse `source` into an immutable structural model.
///
/// Pure function of its inputs; `file` is only used as the identity stored
/// in positions.
pub fn build_source_model(file: &str, source: &str) -> Result<SourceModel, ParseError> {
    let tree = parse_tree(file, source)?;
    let root = tree.root_node();

    if root.has_error() {
        let lines: Vec<&str> = source.lines().collect();
        return Err(match first_syntax_error(root) {
            Some(node) => syntax_error(file, &lines, node),
            None => ParseError::new(file, 1, 1, "invalid syntax"),
        });
    }

    Ok(builder::ModelBuilder::new(file, source).build(root))
}

fn parse_tree(file: &str, source: &str) -> Result<tree_sitter::Tree, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ParseError::new(file, 1, 1, format!("Failed to set Python language: {}", e)))?;
    parser
        .parse(source, None)
        .ok_or_else(|| ParseError::new(file, 1, 1, "Failed to parse Python code"))
}

/// First error or missing node in document order.
fn first_syntax_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(found) = first_syntax_error(child) {
                return Some(found);
            }
        }
    }
    None
}

fn syntax_error(file: &str, lines: &[&str], node: Node<'_>) -> ParseError {
    let point = node.start_position();
    let message = if node.is_missing() {
        format!("invalid syntax: missing `{}`", node.kind())
    } else {
        "invalid syntax".to_string()
    };
    ParseError::new(file, point.row + 1, char_column(lines, point), message)
}

/// 1-based character column of a tree-sitter point (which counts bytes).
pub(crate) fn char_column<S: AsRef<str>>(lines: &[S], point: Point) -> usize {
    lines
        .get(point.row)
        .and_then(|line| line.as_ref().get(..point.column))
        .map(|prefix| prefix.chars().count() + 1)
        .unwrap_or(point.column + 1)
}
