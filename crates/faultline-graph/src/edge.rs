//! Edge types for the code graph.
//!
//! An edge is just its relation; source and target live in the graph
//! structure. `GraphEdge` is the flattened form used for export.

use serde::{Deserialize, Serialize};

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// File declares symbol.
    Contains,

    /// File imports a class, or component uses another component.
    Imports,

    /// File imports a model.
    ImportsModel,

    /// Symbol calls symbol.
    Calls,

    /// Endpoint is handled by symbol.
    RoutesTo,

    /// Symbol calls endpoint.
    CallsApi,

    /// Routing file declares endpoint.
    Defines,
}

impl Relation {
    /// Returns true for the structural relation every symbol has.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Contains)
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Contains => "contains",
            Self::Imports => "imports",
            Self::ImportsModel => "imports_model",
            Self::Calls => "calls",
            Self::RoutesTo => "routes_to",
            Self::CallsApi => "calls_api",
            Self::Defines => "defines",
        };
        write!(f, "{}", s)
    }
}

/// A simplified edge for graph export/visualization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub relation: Relation,
}
