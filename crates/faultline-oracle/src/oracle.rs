//! The oracle capability and its request type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::OracleError;

/// Reply shape expected for backend requests.
pub const BACKEND_SCHEMA: &str = r#"{
  "apis": [
    {"url": "api/endpoint", "mapped_to": "path/to/view.py::function_name"}
  ],
  "internal_calls": [
    {"source": "path/to/file.py::caller", "target": "path/to/file.py::callee"}
  ]
}"#;

/// Reply shape expected for frontend requests.
pub const FRONTEND_SCHEMA: &str = r#"{
  "links": [
    {"source": "path/to/file.tsx::Component", "target_url": "api/endpoint"},
    {"source": "path/to/file.tsx::Component", "target_component": "path/to/other.tsx::Component"}
  ]
}"#;

const BACKEND_EXTENSIONS: &[&str] = &["py"];
const FRONTEND_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs", "vue", "svelte",
];

/// Which half of the codebase a request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    Backend,
    Frontend,
}

impl OracleKind {
    /// Classifies a path by extension, if it belongs to either half.
    pub fn for_path(path: &str) -> Option<Self> {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = file_name.rsplit_once('.')?;
        if BACKEND_EXTENSIONS.contains(&ext) {
            Some(Self::Backend)
        } else if FRONTEND_EXTENSIONS.contains(&ext) {
            Some(Self::Frontend)
        } else {
            None
        }
    }

    pub fn schema(&self) -> &'static str {
        match self {
            Self::Backend => BACKEND_SCHEMA,
            Self::Frontend => FRONTEND_SCHEMA,
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::Backend => {
                "Analyze this backend. Map URL routes to the functions that handle them, \
                 and list calls between functions defined in these files."
            }
            Self::Frontend => {
                "Analyze this frontend. Map components to the backend endpoints they call \
                 and to the other components they render or import."
            }
        }
    }
}

impl std::fmt::Display for OracleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend => write!(f, "backend"),
            Self::Frontend => write!(f, "frontend"),
        }
    }
}

/// One question put to the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub kind: OracleKind,

    /// Bounded source context (see [`ContextBuilder`](crate::ContextBuilder)).
    pub context: String,

    /// JSON shape the reply must follow.
    pub schema: String,

    /// Known routes and their handlers (frontend requests only).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub known_apis: BTreeMap<String, String>,
}

impl OracleRequest {
    pub fn backend(context: String) -> Self {
        Self {
            kind: OracleKind::Backend,
            context,
            schema: BACKEND_SCHEMA.to_string(),
            known_apis: BTreeMap::new(),
        }
    }

    pub fn frontend(context: String, known_apis: BTreeMap<String, String>) -> Self {
        Self {
            kind: OracleKind::Frontend,
            context,
            schema: FRONTEND_SCHEMA.to_string(),
            known_apis,
        }
    }

    /// Renders the request as a single prompt for text-completion oracles.
    pub fn prompt(&self) -> String {
        let mut prompt = String::new();
        prompt.push_str(self.kind.instruction());
        prompt.push('\n');

        if self.kind == OracleKind::Frontend {
            let apis = serde_json::to_string(&self.known_apis).unwrap_or_default();
            prompt.push_str("\nBackend APIs available: ");
            prompt.push_str(&apis);
            prompt.push('\n');
        }

        prompt.push_str("\nOutput strictly valid JSON of this shape:\n");
        prompt.push_str(&self.schema);
        prompt.push_str("\n\nCode:\n");
        prompt.push_str(&self.context);
        prompt
    }
}

/// A source of proposed, non-deterministic edges.
///
/// Implementations may call a language model, a static table, or anything
/// else. `Ok(None)` means the oracle has nothing to add.
#[async_trait]
pub trait SemanticOracle: Send + Sync {
    async fn complete(
        &self,
        request: &OracleRequest,
    ) -> Result<Option<serde_json::Value>, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_path() {
        assert_eq!(OracleKind::for_path("app/views.py"), Some(OracleKind::Backend));
        assert_eq!(OracleKind::for_path("web/App.tsx"), Some(OracleKind::Frontend));
        assert_eq!(OracleKind::for_path("cmd/main.go"), None);
        assert_eq!(OracleKind::for_path("Makefile"), None);
    }

    #[test]
    fn test_frontend_prompt_carries_catalogue() {
        let mut apis = BTreeMap::new();
        apis.insert("api/users".to_string(), "views.py::list_users".to_string());
        let request = OracleRequest::frontend("--- FILE: a.tsx ---\n".to_string(), apis);

        let prompt = request.prompt();
        assert!(prompt.contains(r#"{"api/users":"views.py::list_users"}"#));
        assert!(prompt.contains("target_component"));
        assert!(prompt.ends_with("--- FILE: a.tsx ---\n"));
    }

    #[test]
    fn test_backend_prompt_has_no_catalogue() {
        let prompt = OracleRequest::backend(String::new()).prompt();
        assert!(!prompt.contains("Backend APIs available"));
        assert!(prompt.contains("internal_calls"));
    }
}
