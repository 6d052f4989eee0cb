//! Grammar-backed language extractors.
//!
//! Each extractor walks the top level of a Tree-sitter syntax tree and
//! reports declarations and import references. Walking stays shallow on
//! purpose: nested functions and methods are not graph nodes.

mod python;
mod typescript;

pub use python::PythonExtractor;
pub use typescript::TypeScriptExtractor;

use crate::config::ExtractionConfig;
use crate::definition::{Definition, LineSpan};
use tree_sitter::{Language, Node, Tree};

/// Per-file information an extractor needs besides the tree.
pub struct ExtractContext<'a> {
    /// Repository-relative path of the file.
    pub path: &'a str,
    /// Whether the file is UI-oriented (capitalised exports become components).
    pub ui_file: bool,
    pub config: &'a ExtractionConfig,
}

/// Output of one grammar-backed extraction.
#[derive(Debug, Default)]
pub struct Extracted {
    pub definitions: Vec<Definition>,
    pub imports: Vec<String>,
}

/// Trait for language-specific extraction.
pub trait LanguageExtractor: Send + Sync {
    /// Returns the Tree-sitter language for this extractor.
    fn language(&self) -> Language;

    /// Returns file extensions this extractor handles.
    fn extensions(&self) -> &[&str];

    /// Extracts top-level declarations and imports from a parsed tree.
    fn extract(&self, tree: &Tree, source: &str, ctx: &ExtractContext<'_>) -> Extracted;
}

/// Gets the text of a node.
pub(crate) fn get_text(node: &Node, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

/// Line span of a node, 1-based.
pub(crate) fn span_of(node: &Node) -> LineSpan {
    LineSpan::new(
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    )
}

/// Returns the 1-based line of the first error or missing node, if any.
pub(crate) fn first_error_line(node: &Node) -> Option<u32> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row as u32 + 1);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .find_map(|child| first_error_line(&child));
    found.or(Some(node.start_position().row as u32 + 1))
}

pub(crate) fn is_capitalized(name: &str) -> bool {
    name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

/// Strips string delimiters (and Python string prefixes) from a literal.
pub(crate) fn unquote(literal: &str) -> String {
    let body = literal.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    for quote in ["\"\"\"", "'''", "\"", "'", "`"] {
        if body.len() >= quote.len() * 2 && body.starts_with(quote) && body.ends_with(quote) {
            return body[quote.len()..body.len() - quote.len()].to_string();
        }
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'react'"), "react");
        assert_eq!(unquote("\"./api\""), "./api");
        assert_eq!(unquote("\"\"\"Doc here.\"\"\""), "Doc here.");
        assert_eq!(unquote("r'raw'"), "raw");
    }

    #[test]
    fn test_is_capitalized() {
        assert!(is_capitalized("Button"));
        assert!(!is_capitalized("useThing"));
        assert!(!is_capitalized(""));
    }
}
