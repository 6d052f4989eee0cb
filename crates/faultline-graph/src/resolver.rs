//! Fuzzy identifier resolution.
//!
//! Oracle proposals name symbols loosely: `views::create_user`,
//! `app/views.py::create_user`, or just `UserList.tsx`. The resolver maps such
//! an identifier to a node, trying progressively looser rules. Ambiguous
//! matches go to the earliest-created node.

use crate::graph::{CodeGraph, NodeId};
use faultline_core::SYMBOL_SEPARATOR;
use tracing::debug;

/// Resolves approximate identifiers against a graph.
pub struct FuzzyResolver<'g> {
    graph: &'g CodeGraph,
}

impl<'g> FuzzyResolver<'g> {
    pub fn new(graph: &'g CodeGraph) -> Self {
        Self { graph }
    }

    /// Resolves `identifier` to a node, first rule that matches wins:
    /// 1. exact id match
    /// 2. an id ending in `::<segment>`
    /// 3. an id ending in `/<segment>`, or equal to the segment
    ///
    /// where `<segment>` is the part after the last `::`.
    pub fn resolve(&self, identifier: &str) -> Option<NodeId> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return None;
        }

        if let Some(index) = self.graph.get_index(identifier) {
            return Some(index);
        }

        let segment = trailing_segment(identifier);
        if segment.is_empty() {
            return None;
        }

        let symbol_suffix = format!("{}{}", SYMBOL_SEPARATOR, segment);
        if let Some(index) = self.first_where(|id| id.ends_with(&symbol_suffix)) {
            return Some(index);
        }

        let path_suffix = format!("/{}", segment);
        let found = self.first_where(|id| id.ends_with(&path_suffix) || id == segment);
        if found.is_none() {
            debug!("Unresolved identifier: {}", identifier);
        }
        found
    }

    /// First node in creation order whose id satisfies `pred`.
    fn first_where(&self, pred: impl Fn(&str) -> bool) -> Option<NodeId> {
        self.graph
            .indexed_nodes()
            .find(|(_, node)| pred(&node.id))
            .map(|(index, _)| index)
    }
}

impl CodeGraph {
    /// Resolves an approximate identifier. See [`FuzzyResolver::resolve`].
    pub fn resolve(&self, identifier: &str) -> Option<NodeId> {
        FuzzyResolver::new(self).resolve(identifier)
    }
}

/// The trailing name of a `::`-qualified identifier.
fn trailing_segment(identifier: &str) -> &str {
    identifier
        .rsplit(SYMBOL_SEPARATOR)
        .next()
        .unwrap_or(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use faultline_core::{Confidence, Definition, DefinitionKind, FileExtraction, LineSpan};

    fn graph() -> CodeGraph {
        let file = |path: &str, names: &[&str]| FileExtraction {
            path: path.to_string(),
            definitions: names
                .iter()
                .map(|n| Definition::new(*n, DefinitionKind::Function, LineSpan::new(1, 2)))
                .collect(),
            imports: Vec::new(),
            confidence: Confidence::Parsed,
        };
        GraphBuilder::from_extractions(&[
            file("app/views.py", &["create_user", "list_users"]),
            file("other/views.py", &["create_user"]),
            file("app/urls.py", &[]),
        ])
    }

    #[test]
    fn test_exact_match() {
        let graph = graph();
        let index = graph.resolve("other/views.py::create_user").unwrap();
        assert_eq!(graph.get(index).unwrap().id, "other/views.py::create_user");
    }

    #[test]
    fn test_every_id_resolves_to_itself() {
        let graph = graph();
        for (index, node) in graph.indexed_nodes() {
            assert_eq!(graph.resolve(&node.id), Some(index));
        }
    }

    #[test]
    fn test_symbol_suffix_prefers_first_created() {
        let graph = graph();
        let index = graph.resolve("views::create_user").unwrap();
        assert_eq!(graph.get(index).unwrap().id, "app/views.py::create_user");
    }

    #[test]
    fn test_path_suffix() {
        let graph = graph();
        let index = graph.resolve("urls.py").unwrap();
        assert_eq!(graph.get(index).unwrap().id, "app/urls.py");
    }

    #[test]
    fn test_unresolved() {
        let graph = graph();
        assert_eq!(graph.resolve(""), None);
        assert_eq!(graph.resolve("   "), None);
        assert_eq!(graph.resolve("billing::charge"), None);
    }

    #[test]
    fn test_trailing_segment() {
        assert_eq!(trailing_segment("x/y.py::run"), "run");
        assert_eq!(trailing_segment("UserList.tsx"), "UserList.tsx");
        assert_eq!(trailing_segment("plain"), "plain");
    }
}
