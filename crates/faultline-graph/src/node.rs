//! Node types for the code graph.

use faultline_core::{Confidence, Definition, DefinitionKind, LineSpan, SYMBOL_SEPARATOR};
use serde::{Deserialize, Serialize};

/// Namespace prefix of endpoint node ids.
pub const ENDPOINT_PREFIX: &str = "API";

/// The kind of entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Function,
    Class,
    Model,
    Component,
    Endpoint,
}

impl NodeKind {
    /// Returns true for kinds declared inside a file.
    pub fn is_symbol(&self) -> bool {
        matches!(
            self,
            Self::Function | Self::Class | Self::Model | Self::Component
        )
    }
}

impl From<DefinitionKind> for NodeKind {
    fn from(kind: DefinitionKind) -> Self {
        match kind {
            DefinitionKind::Function => Self::Function,
            DefinitionKind::Class => Self::Class,
            DefinitionKind::Model => Self::Model,
            DefinitionKind::Component => Self::Component,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::File => "file",
            Self::Function => "function",
            Self::Class => "class",
            Self::Model => "model",
            Self::Component => "component",
            Self::Endpoint => "endpoint",
        };
        write!(f, "{}", s)
    }
}

/// Kind-specific details carried by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_span: Option<LineSpan>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,

    /// Normalised route (endpoints only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

/// A code entity in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Globally unique id.
    pub id: String,

    pub kind: NodeKind,

    /// Short display name.
    pub label: String,

    /// The file declaring this node (the file itself for file nodes).
    /// `None` for endpoints.
    pub owning_file: Option<String>,

    pub metadata: NodeMetadata,
}

impl Node {
    /// Creates a file node. The id is the path itself.
    pub fn file(path: &str, confidence: Confidence) -> Self {
        let label = path.rsplit('/').next().unwrap_or(path).to_string();
        Self {
            id: path.to_string(),
            kind: NodeKind::File,
            label,
            owning_file: Some(path.to_string()),
            metadata: NodeMetadata {
                confidence: Some(confidence),
                ..Default::default()
            },
        }
    }

    /// Creates a symbol node for a definition in `file`.
    pub fn symbol(file: &str, def: &Definition, confidence: Confidence) -> Self {
        Self {
            id: symbol_id(file, &def.name),
            kind: def.kind.into(),
            label: def.name.clone(),
            owning_file: Some(file.to_string()),
            metadata: NodeMetadata {
                line_span: Some(def.line_span),
                doc: def.doc.clone(),
                confidence: Some(confidence),
                bases: def.bases.clone(),
                route: None,
            },
        }
    }

    /// Creates an endpoint node for an already normalised route.
    pub fn endpoint(route: &str) -> Self {
        Self {
            id: endpoint_id(route),
            kind: NodeKind::Endpoint,
            label: route.to_string(),
            owning_file: None,
            metadata: NodeMetadata {
                route: Some(route.to_string()),
                ..Default::default()
            },
        }
    }
}

/// Id of the symbol `name` declared in `file`.
pub fn symbol_id(file: &str, name: &str) -> String {
    format!("{}{}{}", file, SYMBOL_SEPARATOR, name)
}

/// Id of the endpoint for a normalised route.
pub fn endpoint_id(route: &str) -> String {
    format!("{}{}{}", ENDPOINT_PREFIX, SYMBOL_SEPARATOR, route)
}

/// Normalises a route: trimmed, no leading or trailing slash, `/` when empty.
pub fn normalize_route(url: &str) -> String {
    let trimmed = url.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
