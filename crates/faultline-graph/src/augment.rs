//! Merging oracle proposals into a built graph.
//!
//! Proposals are approximate: identifiers are resolved with the
//! [`FuzzyResolver`](crate::resolver::FuzzyResolver) and candidates that do
//! not resolve are dropped. Merging only ever adds nodes and edges.

use crate::edge::Relation;
use crate::graph::{CodeGraph, NodeId};
use crate::node::{normalize_route, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A route declared by the backend and the handler it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRoute {
    pub url: String,
    #[serde(default)]
    pub mapped_to: Option<String>,
}

/// A call between two symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLink {
    pub source: String,
    pub target: String,
}

/// Backend routes and internal calls proposed by the oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendProposal {
    #[serde(default)]
    pub apis: Vec<ApiRoute>,
    #[serde(default)]
    pub internal_calls: Vec<CallLink>,
}

impl BackendProposal {
    /// The known-API catalogue: normalised url -> handler, as proposed.
    pub fn catalogue(&self) -> BTreeMap<String, String> {
        self.apis
            .iter()
            .map(|api| {
                (
                    normalize_route(&api.url),
                    api.mapped_to.clone().unwrap_or_default(),
                )
            })
            .collect()
    }
}

/// A frontend symbol calling an endpoint or using another component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendLink {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_component: Option<String>,
}

/// Frontend links proposed by the oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendProposal {
    #[serde(default)]
    pub links: Vec<FrontendLink>,
}

/// Outcome of one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentStats {
    /// Edges newly added to the graph.
    pub added: usize,
    /// Candidates dropped because an end did not resolve.
    pub dropped: usize,
}

impl AugmentStats {
    fn record(&mut self, added: bool) {
        if added {
            self.added += 1;
        }
    }

    fn drop_candidate(&mut self, what: &str, identifier: &str) {
        debug!("Dropping {} candidate: unresolved '{}'", what, identifier);
        self.dropped += 1;
    }
}

impl std::ops::AddAssign for AugmentStats {
    fn add_assign(&mut self, other: Self) {
        self.added += other.added;
        self.dropped += other.dropped;
    }
}

/// Merges a backend proposal.
///
/// Each resolved route gets `Endpoint -> handler` (`RoutesTo`) and, when a
/// route-declaring file is present, `file -> Endpoint` (`Defines`).
/// Internal calls become `Calls` edges when both ends resolve to
/// different nodes.
pub fn apply_backend(
    graph: &mut CodeGraph,
    proposal: &BackendProposal,
    route_files: &[String],
) -> AugmentStats {
    let mut stats = AugmentStats::default();
    let route_file = find_route_file(graph, route_files);

    for api in &proposal.apis {
        let mapped_to = api.mapped_to.as_deref().unwrap_or_default();
        let Some(handler) = graph.resolve(mapped_to) else {
            stats.drop_candidate("route", mapped_to);
            continue;
        };
        let endpoint = graph.ensure_endpoint(&api.url);
        stats.record(graph.add_edge(endpoint, handler, Relation::RoutesTo));
        if let Some(file) = route_file {
            stats.record(graph.add_edge(file, endpoint, Relation::Defines));
        }
    }

    for call in &proposal.internal_calls {
        let (Some(source), Some(target)) = (graph.resolve(&call.source), graph.resolve(&call.target))
        else {
            stats.drop_candidate("call", &format!("{} -> {}", call.source, call.target));
            continue;
        };
        if source == target {
            stats.dropped += 1;
            continue;
        }
        stats.record(graph.add_edge(source, target, Relation::Calls));
    }

    debug!(
        "Backend merge: {} edges added, {} dropped",
        stats.added, stats.dropped
    );
    stats
}

/// Merges a frontend proposal.
///
/// A link with a `target_url` becomes `source -> Endpoint` (`CallsApi`);
/// otherwise a `target_component` becomes `source -> component` (`Imports`).
pub fn apply_frontend(graph: &mut CodeGraph, proposal: &FrontendProposal) -> AugmentStats {
    let mut stats = AugmentStats::default();

    for link in &proposal.links {
        let Some(source) = graph.resolve(&link.source) else {
            stats.drop_candidate("link source", &link.source);
            continue;
        };

        if let Some(url) = link.target_url.as_deref().filter(|u| !u.trim().is_empty()) {
            let endpoint = graph.ensure_endpoint(url);
            stats.record(graph.add_edge(source, endpoint, Relation::CallsApi));
        } else if let Some(component) = link.target_component.as_deref() {
            match graph.resolve(component) {
                Some(target) if target != source => {
                    stats.record(graph.add_edge(source, target, Relation::Imports));
                }
                Some(_) => stats.dropped += 1,
                None => stats.drop_candidate("component", component),
            }
        } else {
            stats.dropped += 1;
        }
    }

    debug!(
        "Frontend merge: {} edges added, {} dropped",
        stats.added, stats.dropped
    );
    stats
}

/// First file node, in creation order, whose file name is a route file.
fn find_route_file(graph: &CodeGraph, route_files: &[String]) -> Option<NodeId> {
    graph
        .indexed_nodes()
        .filter(|(_, node)| node.kind == NodeKind::File)
        .find(|(_, node)| route_files.iter().any(|name| *name == node.label))
        .map(|(index, _)| index)
}
