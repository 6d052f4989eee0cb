use async_trait::async_trait;
use faultline_core::{AnalysisConfig, OracleConfig};
use faultline_graph::{NodeKind, Relation};
use faultline_oracle::{OracleError, OracleKind, OracleRequest, SemanticOracle};
use faultline_session::{AnalysisSession, FileSnapshot, SessionError};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn snapshot(files: &[(&str, &str)]) -> FileSnapshot {
    files.iter().copied().collect()
}

fn fast_config() -> AnalysisConfig {
    AnalysisConfig {
        oracle: OracleConfig {
            timeout_secs: 5,
            initial_backoff_ms: 1,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Replies with fixed proposals and records every request.
struct CannedOracle {
    backend: serde_json::Value,
    frontend: serde_json::Value,
    requests: Mutex<Vec<OracleRequest>>,
}

impl CannedOracle {
    fn new(backend: serde_json::Value, frontend: serde_json::Value) -> Self {
        Self {
            backend,
            frontend,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SemanticOracle for CannedOracle {
    async fn complete(
        &self,
        request: &OracleRequest,
    ) -> Result<Option<serde_json::Value>, OracleError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(Some(match request.kind {
            OracleKind::Backend => self.backend.clone(),
            OracleKind::Frontend => self.frontend.clone(),
        }))
    }
}

/// Always fails, optionally after a delay.
struct FailingOracle {
    calls: AtomicU32,
    delay: Duration,
}

impl FailingOracle {
    fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicU32::new(0),
            delay,
        }
    }
}

#[async_trait]
impl SemanticOracle for FailingOracle {
    async fn complete(
        &self,
        _request: &OracleRequest,
    ) -> Result<Option<serde_json::Value>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Err(OracleError::Transport("connection refused".to_string()))
    }
}

fn full_stack_snapshot() -> FileSnapshot {
    snapshot(&[
        ("backend/urls.py", "urlpatterns = []\n"),
        (
            "backend/views.py",
            "def list_users(request):\n    return []\n\ndef create_user(request):\n    return list_users(request)\n",
        ),
        (
            "web/UserList.tsx",
            "import { Row } from './Row';\n\nexport function UserList() {\n  return <Row />;\n}\n",
        ),
        (
            "web/Row.tsx",
            "export function Row() {\n  return <div />;\n}\n",
        ),
    ])
}

fn canned_oracle() -> CannedOracle {
    CannedOracle::new(
        json!({
            "apis": [{"url": "/api/users/", "mapped_to": "views::list_users"}],
            "internal_calls": [{"source": "views::create_user", "target": "views::list_users"}]
        }),
        json!({
            "links": [
                {"source": "UserList", "target_url": "api/users"},
                {"source": "UserList", "target_component": "Row"}
            ]
        }),
    )
}

#[tokio::test]
async fn end_to_end_model_import() {
    let session = AnalysisSession::new(AnalysisConfig::default(), None);
    session
        .build(snapshot(&[
            ("a.py", "class Foo(Model): pass"),
            ("b.py", "from a import Foo\ndef use(): Foo()"),
        ]))
        .await
        .unwrap();

    let graph = session.graph().await.unwrap();

    let ids: BTreeSet<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(
        ids,
        BTreeSet::from(["a.py", "a.py::Foo", "b.py", "b.py::use"])
    );
    assert_eq!(graph.get_by_id("a.py::Foo").unwrap().kind, NodeKind::Model);
    assert_eq!(graph.get_by_id("b.py::use").unwrap().kind, NodeKind::Function);

    let edges: BTreeSet<(String, String, Relation)> = graph
        .export_edges()
        .into_iter()
        .map(|e| (e.source, e.target, e.relation))
        .collect();
    let expected: BTreeSet<(String, String, Relation)> = [
        ("a.py", "a.py::Foo", Relation::Contains),
        ("b.py", "a.py::Foo", Relation::ImportsModel),
        ("b.py", "b.py::use", Relation::Contains),
    ]
    .into_iter()
    .map(|(s, t, r)| (s.to_string(), t.to_string(), r))
    .collect();
    assert_eq!(edges, expected);

    let surface = session.surface("a.py").await.unwrap();
    assert_eq!(surface, BTreeSet::from(["b.py".to_string()]));
    assert!(session.surface("b.py").await.unwrap().is_empty());
}

#[tokio::test]
async fn structure_report_on_small_project() {
    let session = AnalysisSession::new(AnalysisConfig::default(), None);
    session
        .build(snapshot(&[
            ("a.py", "class Foo(Model): pass"),
            ("b.py", "from a import Foo\ndef use(): Foo()"),
        ]))
        .await
        .unwrap();

    let report = session.structure_report().await.unwrap();
    assert!(report.cycles.status.is_completed());
    assert!(report.cycles.findings.is_empty());
    assert!(report.hubs.findings.is_empty());
    let orphans: Vec<&str> = report.orphans.findings.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(orphans, vec!["b.py::use"]);
}

#[tokio::test]
async fn every_symbol_is_contained_by_its_file() {
    let session = AnalysisSession::new(AnalysisConfig::default(), Some(Arc::new(canned_oracle())));
    session.build(full_stack_snapshot()).await.unwrap();
    let graph = session.graph().await.unwrap();

    for (index, node) in graph.indexed_nodes() {
        let containers: Vec<_> = graph
            .incoming(index)
            .filter(|(_, relation)| *relation == Relation::Contains)
            .map(|(source, _)| graph.get(source).unwrap().id.clone())
            .collect();
        match node.kind {
            NodeKind::File | NodeKind::Endpoint => assert!(containers.is_empty()),
            _ => assert_eq!(containers, vec![node.owning_file.clone().unwrap()]),
        }
    }
}

#[tokio::test]
async fn canned_oracle_augments_graph() {
    let oracle = Arc::new(canned_oracle());
    let session = AnalysisSession::new(fast_config(), Some(oracle.clone()));
    let summary = session.build(full_stack_snapshot()).await.unwrap();

    assert!(summary.oracle_used);
    assert_eq!(summary.augmentation.added, 5);

    let graph = session.graph().await.unwrap();
    assert!(graph.has_edge("API::api/users", "backend/views.py::list_users", Relation::RoutesTo));
    assert!(graph.has_edge("backend/urls.py", "API::api/users", Relation::Defines));
    assert!(graph.has_edge(
        "backend/views.py::create_user",
        "backend/views.py::list_users",
        Relation::Calls
    ));
    assert!(graph.has_edge("web/UserList.tsx::UserList", "API::api/users", Relation::CallsApi));
    assert!(graph.has_edge("web/UserList.tsx::UserList", "web/Row.tsx::Row", Relation::Imports));

    let requests = oracle.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].kind, OracleKind::Backend);
    assert!(requests[0].context.contains("--- FILE: backend/views.py ---"));
    assert_eq!(requests[1].kind, OracleKind::Frontend);
    assert_eq!(
        requests[1].known_apis.get("api/users").map(String::as_str),
        Some("views::list_users")
    );

    let surface = session.surface("web/Row.tsx").await.unwrap();
    assert_eq!(surface, BTreeSet::from(["web/UserList.tsx".to_string()]));
}

#[tokio::test]
async fn rebuild_with_canned_oracle_is_deterministic() {
    let first = AnalysisSession::new(fast_config(), Some(Arc::new(canned_oracle())));
    let second = AnalysisSession::new(fast_config(), Some(Arc::new(canned_oracle())));

    first.build(full_stack_snapshot()).await.unwrap();
    second.build(full_stack_snapshot()).await.unwrap();
    let a = first.export().await.unwrap();
    let b = second.export().await.unwrap();
    assert_eq!(a.nodes, b.nodes);
    assert_eq!(a.edges, b.edges);

    // Same session, same snapshot.
    first.build(full_stack_snapshot()).await.unwrap();
    let c = first.export().await.unwrap();
    assert_eq!(a.nodes, c.nodes);
    assert_eq!(a.edges, c.edges);
}

#[tokio::test]
async fn failing_oracle_degrades_to_no_augmentation() {
    let oracle = Arc::new(FailingOracle::new(Duration::ZERO));
    let session = AnalysisSession::new(fast_config(), Some(oracle.clone()));
    let files = snapshot(&[("app/views.py", "def index(request):\n    return 1\n")]);

    let summary = session.build(files.clone()).await.unwrap();
    assert_eq!(summary.augmentation.added, 0);
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 3);

    let plain = AnalysisSession::new(AnalysisConfig::default(), None);
    let baseline = plain.build(files).await.unwrap();
    assert_eq!(summary.nodes, baseline.nodes);
    assert_eq!(summary.edges, baseline.edges);
}

#[tokio::test]
async fn analysis_before_build_is_rejected() {
    let session = AnalysisSession::new(AnalysisConfig::default(), None);
    assert!(matches!(session.surface("a.py").await, Err(SessionError::GraphNotBuilt)));
    assert!(matches!(session.stats().await, Err(SessionError::GraphNotBuilt)));
    assert!(matches!(session.last_build().await, Err(SessionError::GraphNotBuilt)));
}

#[tokio::test]
async fn concurrent_build_is_rejected() {
    let slow = Arc::new(FailingOracle::new(Duration::from_millis(400)));
    let config = AnalysisConfig {
        oracle: OracleConfig {
            max_attempts: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let session = Arc::new(AnalysisSession::new(config, Some(slow)));
    let files = snapshot(&[("app/views.py", "def index(request):\n    return 1\n")]);

    let background = {
        let session = session.clone();
        let files = files.clone();
        tokio::spawn(async move { session.build(files).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(matches!(
        session.build(files).await,
        Err(SessionError::BuildInProgress)
    ));
    assert!(background.await.unwrap().is_ok());
}

#[tokio::test]
async fn rebuild_replaces_graph() {
    let session = AnalysisSession::new(AnalysisConfig::default(), None);
    session
        .build(snapshot(&[("old.py", "def gone():\n    pass\n")]))
        .await
        .unwrap();
    session
        .build(snapshot(&[("new.py", "def fresh():\n    pass\n")]))
        .await
        .unwrap();

    let graph = session.graph().await.unwrap();
    assert!(graph.get_by_id("old.py").is_none());
    assert!(graph.get_by_id("new.py::fresh").is_some());
    assert_eq!(session.stats().await.unwrap().files, 1);
}
