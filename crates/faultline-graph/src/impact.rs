//! Blast radius of a file change.
//!
//! Answers "which files directly depend on this one?". Only first-degree
//! dependents are reported; transitive effects are out of scope.

use crate::edge::Relation;
use crate::graph::CodeGraph;
use faultline_core::SYMBOL_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Direct reverse dependencies of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastRadius {
    /// The file being changed.
    pub target: String,

    /// Nodes of the target: the file itself and the symbols it declares.
    pub matched: Vec<String>,

    /// Dependent files, each with the relations that pulled it in.
    pub dependents: BTreeMap<String, BTreeSet<Relation>>,
}

impl BlastRadius {
    /// Dependent file paths, sorted.
    pub fn files(&self) -> BTreeSet<String> {
        self.dependents.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }

    /// Returns a summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Blast Radius: {} files depend directly on {} ({} nodes matched)",
            self.dependents.len(),
            self.target,
            self.matched.len()
        )
    }
}

impl CodeGraph {
    /// Computes the blast radius of changing `target_file`.
    ///
    /// Matches the node whose id is the path plus every node whose id starts
    /// with `path::`, takes their direct predecessors, and maps each to its
    /// owning file. The target itself and predecessors with no owning file
    /// (endpoints) are left out.
    pub fn blast_radius(&self, target_file: &str) -> BlastRadius {
        let prefix = format!("{}{}", target_file, SYMBOL_SEPARATOR);
        let mut radius = BlastRadius {
            target: target_file.to_string(),
            ..Default::default()
        };

        for (index, node) in self.indexed_nodes() {
            if node.id != target_file && !node.id.starts_with(&prefix) {
                continue;
            }
            radius.matched.push(node.id.clone());

            for (source, relation) in self.incoming(index) {
                let Some(file) = self.get(source).and_then(|n| n.owning_file.as_deref()) else {
                    continue;
                };
                if file == target_file {
                    continue;
                }
                radius
                    .dependents
                    .entry(file.to_string())
                    .or_default()
                    .insert(relation);
            }
        }

        radius
    }

    /// Files directly depending on `target_file`. See [`CodeGraph::blast_radius`].
    pub fn surface(&self, target_file: &str) -> BTreeSet<String> {
        self.blast_radius(target_file).files()
    }
}
