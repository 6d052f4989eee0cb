//! Graph builder for constructing the code graph from extraction output.
//!
//! The builder is the single writer of a graph under construction. It works
//! in two passes:
//! 1. register every file and its definitions (`Contains` edges)
//! 2. link import references to indexed classes and models
//!
//! Keeping imports for the second pass makes the result independent of the
//! order in which files were extracted.

use crate::edge::Relation;
use crate::graph::{CodeGraph, NodeId};
use crate::node::{Node, NodeKind};
use crate::symbol_table::SymbolTable;
use faultline_core::FileExtraction;
use tracing::debug;

/// Builds a CodeGraph from file extractions.
pub struct GraphBuilder {
    graph: CodeGraph,
    /// Bare symbol names, first registration wins.
    symbol_table: SymbolTable,
    /// Import references waiting for the second pass.
    pending_imports: Vec<(NodeId, String, String)>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            graph: CodeGraph::new(),
            symbol_table: SymbolTable::new(),
            pending_imports: Vec::new(),
        }
    }

    /// Registers one file: its node, its definitions, and its imports.
    ///
    /// Call this for each accepted file (in a stable order), then `build`.
    pub fn add_file(&mut self, extraction: &FileExtraction) -> NodeId {
        let path = extraction.path.as_str();
        let file_idx = self
            .graph
            .add_node(Node::file(path, extraction.confidence));

        for def in &extraction.definitions {
            let node = Node::symbol(path, def, extraction.confidence);
            if self.graph.get_index(&node.id).is_some() {
                // Same name declared twice in one file: keep the first.
                continue;
            }
            let sym_idx = self.graph.add_node(node);
            self.graph.add_edge(file_idx, sym_idx, Relation::Contains);
            self.symbol_table.insert(&def.name, sym_idx);
        }

        for import in &extraction.imports {
            self.pending_imports
                .push((file_idx, path.to_string(), import.clone()));
        }

        file_idx
    }

    /// Links pending import references to indexed classes and models.
    ///
    /// Returns the number of edges added.
    pub fn resolve_imports(&mut self) -> usize {
        let mut added = 0;

        for (file_idx, path, import) in std::mem::take(&mut self.pending_imports) {
            let name = imported_symbol(&import);
            let Some(target) = self.symbol_table.resolve(name) else {
                continue;
            };
            let Some(node) = self.graph.get(target) else {
                continue;
            };
            if node.owning_file.as_deref() == Some(path.as_str()) {
                continue;
            }
            let relation = match node.kind {
                NodeKind::Model => Relation::ImportsModel,
                NodeKind::Class => Relation::Imports,
                _ => continue,
            };
            if self.graph.add_edge(file_idx, target, relation) {
                added += 1;
            }
        }

        debug!(
            "Linked {} import edges ({} name collisions)",
            added,
            self.symbol_table.collisions()
        );
        added
    }

    /// Read access to the graph under construction.
    pub fn graph(&self) -> &CodeGraph {
        &self.graph
    }

    /// Finishes building and returns the graph.
    pub fn build(mut self) -> CodeGraph {
        self.resolve_imports();
        self.graph
    }

    /// Builds a graph from extractions, registering them in the given order.
    pub fn from_extractions<'a>(extractions: impl IntoIterator<Item = &'a FileExtraction>) -> CodeGraph {
        let mut builder = Self::new();
        for extraction in extractions {
            builder.add_file(extraction);
        }
        builder.build()
    }
}

/// The symbol an import reference names: its last `.` or `/` segment.
fn imported_symbol(import: &str) -> &str {
    import
        .rsplit(|c| c == '.' || c == '/')
        .next()
        .unwrap_or(import)
}
