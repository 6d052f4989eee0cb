//! Structural smell detection.
//!
//! Four read-only passes over a built graph: cycles, hubs, orphans and
//! redundant API clients. Each pass runs isolated; a panic inside one is
//! reported as `Failed` in its own sub-report and the others still run.

use crate::cycles::elementary_cycles;
use crate::edge::Relation;
use crate::graph::CodeGraph;
use crate::node::NodeKind;
use faultline_core::StructureConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    Completed,
    Skipped { reason: String },
    Failed { reason: String },
}

impl CheckStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Skipped { reason } => write!(f, "skipped ({})", reason),
            Self::Failed { reason } => write!(f, "failed ({})", reason),
        }
    }
}

/// Findings of one pass plus its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubReport<T> {
    #[serde(flatten)]
    pub status: CheckStatus,
    pub findings: Vec<T>,

    /// Set when the findings were capped.
    #[serde(default)]
    pub truncated: bool,
}

impl<T> SubReport<T> {
    pub fn completed(findings: Vec<T>) -> Self {
        Self {
            status: CheckStatus::Completed,
            findings,
            truncated: false,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Skipped {
                reason: reason.into(),
            },
            findings: Vec::new(),
            truncated: false,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Failed {
                reason: reason.into(),
            },
            findings: Vec::new(),
            truncated: false,
        }
    }
}

/// A dependency cycle, as node ids in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub nodes: Vec<String>,
}

/// A node with unusually many connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    pub id: String,
    pub kind: NodeKind,
    pub degree: usize,
    /// Mean degree over the whole graph.
    pub average_degree: f64,
}

/// A symbol nothing refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Orphan {
    pub id: String,
    pub kind: NodeKind,
    pub file: String,
}

/// Symbols that call exactly the same set of endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedundancyCluster {
    /// Endpoint ids, sorted.
    pub endpoints: Vec<String>,
    /// Member symbol ids, in creation order.
    pub members: Vec<String>,
}

/// All four structural passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureReport {
    pub cycles: SubReport<Cycle>,
    pub hubs: SubReport<Hub>,
    pub orphans: SubReport<Orphan>,
    pub redundancy: SubReport<RedundancyCluster>,
}

impl StructureReport {
    /// Total findings across passes.
    pub fn finding_count(&self) -> usize {
        self.cycles.findings.len()
            + self.hubs.findings.len()
            + self.orphans.findings.len()
            + self.redundancy.findings.len()
    }

    /// Returns a one-line summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Structure: {} cycles, {} hubs, {} orphans, {} redundant clusters",
            self.cycles.findings.len(),
            self.hubs.findings.len(),
            self.orphans.findings.len(),
            self.redundancy.findings.len()
        )
    }
}

/// Runs every pass over `graph`.
pub fn analyze_structure(graph: &CodeGraph, config: &StructureConfig) -> StructureReport {
    let report = StructureReport {
        cycles: run_isolated("cycles", || detect_cycles(graph, config)),
        hubs: run_isolated("hubs", || detect_hubs(graph, config)),
        orphans: run_isolated("orphans", || detect_orphans(graph, config)),
        redundancy: run_isolated("redundancy", || detect_redundancy(graph)),
    };
    debug!("{}", report.summary());
    report
}

/// Runs a pass, turning a panic into a `Failed` sub-report.
pub fn run_isolated<T>(name: &str, pass: impl FnOnce() -> SubReport<T>) -> SubReport<T> {
    match catch_unwind(AssertUnwindSafe(pass)) {
        Ok(report) => report,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panicked".to_string());
            warn!("Structural pass '{}' failed: {}", name, reason);
            SubReport::failed(reason)
        }
    }
}

/// Elementary cycles of length > 1.
///
/// Skipped on graphs larger than `cycle_node_limit`; capped at `max_cycles`.
pub fn detect_cycles(graph: &CodeGraph, config: &StructureConfig) -> SubReport<Cycle> {
    if graph.node_count() > config.cycle_node_limit {
        return SubReport::skipped(format!(
            "graph has {} nodes, cycle search limit is {}",
            graph.node_count(),
            config.cycle_node_limit
        ));
    }

    let search = elementary_cycles(graph, config.max_cycles);
    let findings = search
        .cycles
        .iter()
        .map(|cycle| Cycle {
            nodes: cycle
                .iter()
                .filter_map(|&index| graph.get(index).map(|n| n.id.clone()))
                .collect(),
        })
        .collect();

    let mut report = SubReport::completed(findings);
    report.truncated = search.truncated;
    report
}

/// Nodes whose degree exceeds both `hub_multiplier * average` and
/// `hub_min_degree`. Sorted by degree, highest first.
pub fn detect_hubs(graph: &CodeGraph, config: &StructureConfig) -> SubReport<Hub> {
    if graph.node_count() == 0 {
        return SubReport::completed(Vec::new());
    }

    let degrees: Vec<_> = graph
        .indexed_nodes()
        .map(|(index, node)| (node, graph.degree(index)))
        .collect();
    let total: usize = degrees.iter().map(|(_, d)| d).sum();
    let average = total as f64 / degrees.len() as f64;
    let threshold = config.hub_multiplier * average;

    let mut hubs: Vec<Hub> = degrees
        .into_iter()
        .filter(|(_, degree)| *degree as f64 > threshold && *degree > config.hub_min_degree)
        .map(|(node, degree)| Hub {
            id: node.id.clone(),
            kind: node.kind,
            degree,
            average_degree: average,
        })
        .collect();
    // Stable sort keeps creation order among equal degrees.
    hubs.sort_by(|a, b| b.degree.cmp(&a.degree));

    SubReport::completed(hubs)
}

/// Functions, classes and components with no incoming reference other than
/// their own file's `Contains`, outside entry-point and test files.
pub fn detect_orphans(graph: &CodeGraph, config: &StructureConfig) -> SubReport<Orphan> {
    let orphans = graph
        .indexed_nodes()
        .filter(|(_, node)| {
            matches!(
                node.kind,
                NodeKind::Function | NodeKind::Class | NodeKind::Component
            )
        })
        .filter(|(index, _)| {
            graph
                .incoming(*index)
                .all(|(_, relation)| relation == Relation::Contains)
        })
        .filter_map(|(_, node)| {
            let file = node.owning_file.as_deref()?;
            if config.is_entry_point(file) || config.is_test_file(file) {
                return None;
            }
            Some(Orphan {
                id: node.id.clone(),
                kind: node.kind,
                file: file.to_string(),
            })
        })
        .collect();

    SubReport::completed(orphans)
}

/// Functions and components grouped by the exact set of endpoints they
/// call. Groups of two or more are reported.
pub fn detect_redundancy(graph: &CodeGraph) -> SubReport<RedundancyCluster> {
    let mut groups: BTreeMap<Vec<String>, Vec<String>> = BTreeMap::new();

    for (index, node) in graph.indexed_nodes() {
        if !matches!(node.kind, NodeKind::Function | NodeKind::Component) {
            continue;
        }
        let endpoints: BTreeSet<String> = graph
            .outgoing(index)
            .filter(|(_, relation)| *relation == Relation::CallsApi)
            .filter_map(|(target, _)| graph.get(target))
            .filter(|target| target.kind == NodeKind::Endpoint)
            .map(|target| target.id.clone())
            .collect();
        if endpoints.is_empty() {
            continue;
        }
        groups
            .entry(endpoints.into_iter().collect())
            .or_default()
            .push(node.id.clone());
    }

    let clusters = groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(endpoints, members)| RedundancyCluster { endpoints, members })
        .collect();

    SubReport::completed(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::node::Node;
    use faultline_core::{Confidence, Definition, DefinitionKind, LineSpan};

    fn files(n: usize) -> (CodeGraph, Vec<NodeId>) {
        let mut graph = CodeGraph::new();
        let ids = (0..n)
            .map(|i| graph.add_node(Node::file(&format!("m{}.py", i), Confidence::Parsed)))
            .collect();
        (graph, ids)
    }

    fn symbol(graph: &mut CodeGraph, file: &str, name: &str, kind: DefinitionKind) -> NodeId {
        let file_idx = graph.add_node(Node::file(file, Confidence::Parsed));
        let def = Definition::new(name, kind, LineSpan::new(1, 2));
        let idx = graph.add_node(Node::symbol(file, &def, Confidence::Parsed));
        graph.add_edge(file_idx, idx, Relation::Contains);
        idx
    }

    /// 16 nodes, 24 edges (average degree 3), center with `center_degree`.
    fn star(center_degree: usize) -> CodeGraph {
        let (mut graph, ids) = files(16);
        for i in 1..=center_degree {
            graph.add_edge(ids[0], ids[i], Relation::Imports);
        }
        for i in 1..=(24 - center_degree) {
            graph.add_edge(ids[i], ids[i + 1], Relation::Imports);
        }
        graph
    }

    #[test]
    fn test_hub_at_threshold_is_not_flagged() {
        let graph = star(12);
        assert_eq!(graph.edge_count(), 24);
        let report = detect_hubs(&graph, &StructureConfig::default());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_hub_above_threshold_is_flagged() {
        let graph = star(13);
        assert_eq!(graph.edge_count(), 24);
        let report = detect_hubs(&graph, &StructureConfig::default());
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].id, "m0.py");
        assert_eq!(report.findings[0].degree, 13);
        assert!((report.findings[0].average_degree - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hub_needs_min_degree() {
        // Center degree 5 in a sparse graph: above 4x average, below 10.
        let (mut graph, ids) = files(10);
        for i in 1..=5 {
            graph.add_edge(ids[0], ids[i], Relation::Imports);
        }
        let report = detect_hubs(&graph, &StructureConfig::default());
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_cycles_skipped_over_limit() {
        let (graph, _) = files(5);
        let config = StructureConfig {
            cycle_node_limit: 4,
            ..Default::default()
        };
        let report = detect_cycles(&graph, &config);
        assert!(matches!(report.status, CheckStatus::Skipped { .. }));
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_status_serializes_inline() {
        let (graph, _) = files(5);
        let config = StructureConfig {
            cycle_node_limit: 4,
            ..Default::default()
        };
        let report = detect_cycles(&graph, &config);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "skipped");
        assert!(value["reason"].is_string());
        assert_eq!(value["findings"], serde_json::json!([]));

        let back: SubReport<Cycle> = serde_json::from_value(value).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_cycles_reported_by_id() {
        let mut graph = CodeGraph::new();
        let a = symbol(&mut graph, "a.py", "f", DefinitionKind::Function);
        let b = symbol(&mut graph, "b.py", "g", DefinitionKind::Function);
        graph.add_edge(a, b, Relation::Calls);
        graph.add_edge(b, a, Relation::Calls);

        let report = detect_cycles(&graph, &StructureConfig::default());
        assert!(report.status.is_completed());
        assert_eq!(
            report.findings,
            vec![Cycle {
                nodes: vec!["a.py::f".to_string(), "b.py::g".to_string()]
            }]
        );
        assert!(report.findings.iter().all(|c| c.nodes.len() > 1));
    }

    #[test]
    fn test_orphans() {
        let mut graph = CodeGraph::new();
        let used = symbol(&mut graph, "lib.py", "used", DefinitionKind::Function);
        symbol(&mut graph, "lib.py", "unused", DefinitionKind::Function);
        symbol(&mut graph, "lib.py", "Record", DefinitionKind::Model);
        symbol(&mut graph, "main.py", "entry", DefinitionKind::Function);
        symbol(&mut graph, "tests/test_lib.py", "test_it", DefinitionKind::Function);
        let caller = symbol(&mut graph, "main.py", "run", DefinitionKind::Function);
        graph.add_edge(caller, used, Relation::Calls);

        let report = detect_orphans(&graph, &StructureConfig::default());
        let ids: Vec<&str> = report.findings.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["lib.py::unused"]);
    }

    #[test]
    fn test_redundancy_clusters() {
        let mut graph = CodeGraph::new();
        let a = symbol(&mut graph, "ui/A.tsx", "A", DefinitionKind::Component);
        let b = symbol(&mut graph, "ui/B.tsx", "B", DefinitionKind::Component);
        let c = symbol(&mut graph, "ui/C.tsx", "C", DefinitionKind::Component);
        let users = graph.ensure_endpoint("api/users");
        let orders = graph.ensure_endpoint("api/orders");
        for caller in [a, b] {
            graph.add_edge(caller, users, Relation::CallsApi);
            graph.add_edge(caller, orders, Relation::CallsApi);
        }
        graph.add_edge(c, users, Relation::CallsApi);

        let report = detect_redundancy(&graph);
        assert_eq!(
            report.findings,
            vec![RedundancyCluster {
                endpoints: vec!["API::api/orders".to_string(), "API::api/users".to_string()],
                members: vec!["ui/A.tsx::A".to_string(), "ui/B.tsx::B".to_string()],
            }]
        );
    }

    #[test]
    fn test_panicking_pass_is_isolated() {
        let report: SubReport<Hub> = run_isolated("boom", || panic!("bad graph"));
        assert_eq!(
            report.status,
            CheckStatus::Failed {
                reason: "bad graph".to_string()
            }
        );
    }

    #[test]
    fn test_analyze_structure_runs_every_pass() {
        let (graph, _) = files(3);
        let report = analyze_structure(&graph, &StructureConfig::default());
        assert!(report.cycles.status.is_completed());
        assert!(report.hubs.status.is_completed());
        assert!(report.orphans.status.is_completed());
        assert!(report.redundancy.status.is_completed());
        assert_eq!(report.finding_count(), 0);
    }
}
