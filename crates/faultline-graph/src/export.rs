//! Serializable view of a graph, for visualisation and `faultline export`.

use crate::edge::GraphEdge;
use crate::graph::{CodeGraph, GraphStats};
use crate::node::{NodeKind, NodeMetadata};
use serde::{Deserialize, Serialize};

/// A node in export form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub info: ExportInfo,
}

/// Metadata and owning file of an exported node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(flatten)]
    pub metadata: NodeMetadata,
}

/// The whole graph: `{nodes, edges}` plus stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<GraphEdge>,
    pub stats: GraphStats,
}

impl GraphExport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl CodeGraph {
    /// Exports nodes in creation order and edges in insertion order.
    pub fn export(&self) -> GraphExport {
        let nodes = self
            .nodes()
            .map(|node| ExportNode {
                id: node.id.clone(),
                label: node.label.clone(),
                kind: node.kind,
                info: ExportInfo {
                    file: node.owning_file.clone(),
                    metadata: node.metadata.clone(),
                },
            })
            .collect();

        GraphExport {
            nodes,
            edges: self.export_edges(),
            stats: self.stats(),
        }
    }
}
