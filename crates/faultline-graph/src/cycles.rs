//! Elementary cycle enumeration.
//!
//! Johnson's algorithm, run separately inside each strongly connected
//! component found by Tarjan's algorithm. Self-loops are ignored, so every
//! reported cycle has at least two nodes.

use crate::graph::{CodeGraph, NodeId};
use petgraph::algo::tarjan_scc;
use petgraph::Direction;
use std::collections::HashMap;

/// Result of a bounded cycle search.
#[derive(Debug, Clone, Default)]
pub struct CycleSearch {
    /// Each cycle as node indexes, starting from its lowest index.
    pub cycles: Vec<Vec<NodeId>>,

    /// True if more cycles exist than were collected.
    pub truncated: bool,
}

/// Enumerates elementary cycles of length > 1, stopping after `limit`.
pub fn elementary_cycles(graph: &CodeGraph, limit: usize) -> CycleSearch {
    let mut search = CycleSearch::default();

    let mut components = tarjan_scc(&graph.graph);
    for component in components.iter_mut() {
        component.sort();
    }
    components.sort_by_key(|component| component.first().copied());

    for component in components.into_iter().filter(|c| c.len() > 1) {
        let adjacency = local_adjacency(graph, &component);
        for start in 0..component.len() {
            let mut johnson = Johnson::new(&adjacency, start, limit - search.cycles.len());
            johnson.circuit(start);

            search.cycles.extend(
                johnson
                    .found
                    .into_iter()
                    .map(|cycle| cycle.into_iter().map(|i| component[i]).collect()),
            );
            if johnson.truncated {
                search.truncated = true;
                return search;
            }
        }
    }

    search
}

/// Successor lists inside one component, in local indexes, without
/// self-loops or parallel edges.
fn local_adjacency(graph: &CodeGraph, component: &[NodeId]) -> Vec<Vec<usize>> {
    let local: HashMap<NodeId, usize> = component
        .iter()
        .enumerate()
        .map(|(i, node)| (*node, i))
        .collect();

    component
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let mut successors: Vec<usize> = graph
                .graph
                .neighbors_directed(*node, Direction::Outgoing)
                .filter_map(|next| local.get(&next).copied())
                .filter(|&j| j != i)
                .collect();
            successors.sort_unstable();
            successors.dedup();
            successors
        })
        .collect()
}

/// Search state for cycles whose lowest node is `start`.
struct Johnson<'a> {
    adjacency: &'a [Vec<usize>],
    start: usize,
    blocked: Vec<bool>,
    blocked_by: Vec<Vec<usize>>,
    stack: Vec<usize>,
    found: Vec<Vec<usize>>,
    remaining: usize,
    truncated: bool,
}

impl<'a> Johnson<'a> {
    fn new(adjacency: &'a [Vec<usize>], start: usize, remaining: usize) -> Self {
        Self {
            adjacency,
            start,
            blocked: vec![false; adjacency.len()],
            blocked_by: vec![Vec::new(); adjacency.len()],
            stack: Vec::new(),
            found: Vec::new(),
            remaining,
            truncated: false,
        }
    }

    fn circuit(&mut self, v: usize) -> bool {
        let mut closed = false;
        self.stack.push(v);
        self.blocked[v] = true;

        let (adjacency, start) = (self.adjacency, self.start);
        for &w in adjacency[v].iter().filter(|&&w| w >= start) {
            if self.truncated {
                break;
            }
            if w == start {
                if self.found.len() == self.remaining {
                    self.truncated = true;
                    break;
                }
                self.found.push(self.stack.clone());
                closed = true;
            } else if !self.blocked[w] && self.circuit(w) {
                closed = true;
            }
        }

        if closed {
            self.unblock(v);
        } else {
            for &w in adjacency[v].iter().filter(|&&w| w >= start) {
                if !self.blocked_by[w].contains(&v) {
                    self.blocked_by[w].push(v);
                }
            }
        }

        self.stack.pop();
        closed
    }

    fn unblock(&mut self, u: usize) {
        self.blocked[u] = false;
        for w in std::mem::take(&mut self.blocked_by[u]) {
            if self.blocked[w] {
                self.unblock(w);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Relation;
    use crate::node::Node;
    use faultline_core::Confidence;

    fn graph_with_edges(n: usize, edges: &[(usize, usize)]) -> CodeGraph {
        let mut graph = CodeGraph::new();
        let ids: Vec<NodeId> = (0..n)
            .map(|i| graph.add_node(Node::file(&format!("f{}.py", i), Confidence::Parsed)))
            .collect();
        for &(a, b) in edges {
            graph.add_edge(ids[a], ids[b], Relation::Imports);
        }
        graph
    }

    #[test]
    fn test_triangle_and_two_cycle() {
        let graph = graph_with_edges(4, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 2)]);
        let search = elementary_cycles(&graph, 100);

        assert!(!search.truncated);
        assert_eq!(search.cycles.len(), 2);
        let lens: Vec<usize> = search.cycles.iter().map(|c| c.len()).collect();
        assert!(lens.contains(&3));
        assert!(lens.contains(&2));
    }

    #[test]
    fn test_self_loop_is_not_a_cycle() {
        let graph = graph_with_edges(2, &[(0, 0), (0, 1)]);
        let search = elementary_cycles(&graph, 100);
        assert!(search.cycles.is_empty());
    }

    #[test]
    fn test_parallel_relations_count_once() {
        let mut graph = graph_with_edges(2, &[(0, 1), (1, 0)]);
        let a = graph.get_index("f0.py").unwrap();
        let b = graph.get_index("f1.py").unwrap();
        graph.add_edge(a, b, Relation::Calls);

        let search = elementary_cycles(&graph, 100);
        assert_eq!(search.cycles.len(), 1);
        assert_eq!(search.cycles[0], vec![a, b]);
    }

    #[test]
    fn test_complete_graph_cycle_count() {
        // K4 has 20 elementary cycles of length >= 2.
        let mut edges = Vec::new();
        for a in 0..4 {
            for b in 0..4 {
                if a != b {
                    edges.push((a, b));
                }
            }
        }
        let graph = graph_with_edges(4, &edges);
        assert_eq!(elementary_cycles(&graph, 1000).cycles.len(), 20);
    }

    #[test]
    fn test_limit_truncates() {
        let mut edges = Vec::new();
        for a in 0..4 {
            for b in 0..4 {
                if a != b {
                    edges.push((a, b));
                }
            }
        }
        let graph = graph_with_edges(4, &edges);
        let search = elementary_cycles(&graph, 5);
        assert_eq!(search.cycles.len(), 5);
        assert!(search.truncated);
    }
}
