//! Core graph data structure.
//!
//! `CodeGraph` wraps a petgraph `DiGraph` and adds an id index and an edge
//! set. Nodes are never removed, so node indexes double as creation order,
//! which the fuzzy resolver relies on for tie-breaking.

use crate::edge::{GraphEdge, Relation};
use crate::node::{endpoint_id, normalize_route, Node, NodeKind};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// The code relationship graph for one snapshot.
#[derive(Debug, Clone, Default)]
pub struct CodeGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<Node, Relation>,

    /// Maps string ids to graph node indexes.
    id_index: HashMap<String, NodeId>,

    /// Every (source, target, relation) triple present.
    edge_set: HashSet<(NodeId, NodeId, Relation)>,
}

impl CodeGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, or returns the existing index if its id is already present.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        if let Some(&existing) = self.id_index.get(&node.id) {
            return existing;
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.id_index.insert(id, index);
        index
    }

    /// Adds an edge. Re-adding an identical triple is a no-op.
    ///
    /// Returns true if the edge was new.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, relation: Relation) -> bool {
        if !self.edge_set.insert((from, to, relation)) {
            return false;
        }
        self.graph.add_edge(from, to, relation);
        true
    }

    /// Returns the endpoint node for `url`, creating it on first use.
    pub fn ensure_endpoint(&mut self, url: &str) -> NodeId {
        let route = normalize_route(url);
        match self.id_index.get(&endpoint_id(&route)) {
            Some(&index) => index,
            None => self.add_node(Node::endpoint(&route)),
        }
    }

    /// Gets a node by its graph index.
    pub fn get(&self, index: NodeId) -> Option<&Node> {
        self.graph.node_weight(index)
    }

    /// Gets a node by its string id.
    pub fn get_by_id(&self, id: &str) -> Option<&Node> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Gets the node index for a string id.
    pub fn get_index(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// Returns true if the triple is present, looked up by ids.
    pub fn has_edge(&self, source: &str, target: &str, relation: Relation) -> bool {
        match (self.get_index(source), self.get_index(target)) {
            (Some(s), Some(t)) => self.edge_set.contains(&(s, t, relation)),
            _ => false,
        }
    }

    /// Iterates over all nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Iterates over `(index, node)` pairs in creation order.
    pub fn indexed_nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx).map(|n| (idx, n)))
    }

    /// Iterates over all edges as `(source, target, relation)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, Relation)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), *e.weight()))
    }

    /// Incoming edges of a node as `(source, relation)`.
    pub fn incoming(&self, index: NodeId) -> impl Iterator<Item = (NodeId, Relation)> + '_ {
        self.graph
            .edges_directed(index, Direction::Incoming)
            .map(|e| (e.source(), *e.weight()))
    }

    /// Outgoing edges of a node as `(target, relation)`.
    pub fn outgoing(&self, index: NodeId) -> impl Iterator<Item = (NodeId, Relation)> + '_ {
        self.graph
            .edges_directed(index, Direction::Outgoing)
            .map(|e| (e.target(), *e.weight()))
    }

    /// In-degree plus out-degree, counting every relation.
    pub fn degree(&self, index: NodeId) -> usize {
        self.graph.edges_directed(index, Direction::Incoming).count()
            + self.graph.edges_directed(index, Direction::Outgoing).count()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns all edges with source and target ids for export.
    pub fn export_edges(&self) -> Vec<GraphEdge> {
        self.edges()
            .filter_map(|(source, target, relation)| {
                Some(GraphEdge {
                    source: self.get(source)?.id.clone(),
                    target: self.get(target)?.id.clone(),
                    relation,
                })
            })
            .collect()
    }

    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut by_kind: BTreeMap<NodeKind, usize> = BTreeMap::new();
        for node in self.nodes() {
            *by_kind.entry(node.kind).or_insert(0) += 1;
        }
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            files: by_kind.get(&NodeKind::File).copied().unwrap_or(0),
            by_kind,
        }
    }
}

/// Graph statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub files: usize,
    pub by_kind: BTreeMap<NodeKind, usize>,
}
