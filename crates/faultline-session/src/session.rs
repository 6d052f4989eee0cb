//! The analysis session: build once, query many times.

use crate::error::{Result, SessionError};
use crate::snapshot::FileSnapshot;
use chrono::{DateTime, Utc};
use faultline_core::{normalize_path, AnalysisConfig, FileExtraction, SourceExtractor};
use faultline_graph::{
    analyze_structure, apply_backend, apply_frontend, AugmentStats, BackendProposal, BlastRadius,
    CodeGraph, FrontendProposal, GraphBuilder, GraphExport, GraphStats, StructureReport,
};
use faultline_oracle::{ContextBuilder, OracleGuard, OracleKind, OracleRequest, SemanticOracle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub session_id: Uuid,
    pub built_at: DateTime<Utc>,

    /// Files that took part in the build.
    pub files: usize,

    /// Files extracted by pattern matching rather than a grammar.
    pub lexical_files: usize,

    /// Files whose parse failed and contributed nothing.
    pub parse_failures: usize,

    pub nodes: usize,
    pub edges: usize,

    /// Whether an oracle was consulted.
    pub oracle_used: bool,

    /// Edges added (and candidates dropped) by oracle proposals.
    pub augmentation: AugmentStats,

    pub duration_ms: u64,
}

struct BuiltGraph {
    graph: Arc<CodeGraph>,
    summary: BuildSummary,
}

/// Holds the graph of one codebase snapshot and answers analyses over it.
///
/// At most one build runs at a time. The finished graph is frozen; analyses
/// hold a read guard while they run, and a rebuild swaps the graph in under
/// the write guard.
pub struct AnalysisSession {
    id: Uuid,
    config: AnalysisConfig,
    extractor: Arc<SourceExtractor>,
    guard: OracleGuard,
    build_lock: Mutex<()>,
    current: RwLock<Option<BuiltGraph>>,
}

impl AnalysisSession {
    /// Creates a session. `oracle` is optional; without it builds are purely
    /// deterministic.
    pub fn new(config: AnalysisConfig, oracle: Option<Arc<dyn SemanticOracle>>) -> Self {
        let id = Uuid::new_v4();
        debug!("Created session {}", id);
        Self {
            id,
            extractor: Arc::new(SourceExtractor::new(&config.extraction)),
            guard: OracleGuard::from_config(oracle, &config.oracle),
            config,
            build_lock: Mutex::new(()),
            current: RwLock::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Builds the graph for `snapshot`, replacing any previous one.
    ///
    /// Fails with `BuildInProgress` if another build of this session is
    /// running.
    pub async fn build(&self, snapshot: FileSnapshot) -> Result<BuildSummary> {
        let _build = self
            .build_lock
            .try_lock()
            .map_err(|_| SessionError::BuildInProgress)?;
        let start = Instant::now();
        let snapshot = Arc::new(snapshot);

        info!("Session {}: building from {} files", self.id, snapshot.len());
        let (extractions, parse_failures) = self.extract_all(snapshot.clone()).await?;

        let mut graph = GraphBuilder::from_extractions(&extractions);
        debug!(
            "Deterministic graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        let augmentation = if self.guard.is_enabled() {
            self.augment(&mut graph, &snapshot, &extractions).await
        } else {
            AugmentStats::default()
        };

        let summary = BuildSummary {
            session_id: self.id,
            built_at: Utc::now(),
            files: extractions.len(),
            lexical_files: extractions
                .iter()
                .filter(|e| e.confidence == faultline_core::Confidence::Lexical)
                .count(),
            parse_failures,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            oracle_used: self.guard.is_enabled(),
            augmentation,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        let mut current = self.current.write().await;
        *current = Some(BuiltGraph {
            graph: Arc::new(graph),
            summary: summary.clone(),
        });

        info!(
            "Session {}: graph ready ({} nodes, {} edges) in {}ms",
            self.id, summary.nodes, summary.edges, summary.duration_ms
        );
        Ok(summary)
    }

    /// Extracts every accepted file on the rayon pool.
    ///
    /// Returns extractions sorted by path and the number of parse failures.
    async fn extract_all(&self, snapshot: Arc<FileSnapshot>) -> Result<(Vec<FileExtraction>, usize)> {
        let extractor = self.extractor.clone();

        tokio::task::spawn_blocking(move || {
            let results: Vec<(FileExtraction, bool)> = snapshot
                .files()
                .par_iter()
                .filter(|(path, _)| extractor.accepts(path))
                .map(|(path, content)| match extractor.parse(path, content) {
                    Ok(extraction) => (extraction, false),
                    Err(e) => {
                        warn!("Skipping definitions of {}: {}", path, e);
                        let confidence = extractor
                            .confidence_for(path)
                            .unwrap_or(faultline_core::Confidence::Lexical);
                        (FileExtraction::empty(path.as_str(), confidence), true)
                    }
                })
                .collect();

            let failures = results.iter().filter(|(_, failed)| *failed).count();
            let mut extractions: Vec<FileExtraction> =
                results.into_iter().map(|(e, _)| e).collect();
            extractions.sort_by(|a, b| a.path.cmp(&b.path));
            (extractions, failures)
        })
        .await
        .map_err(|e| SessionError::Worker(e.to_string()))
    }

    /// Asks the oracle for backend then frontend links and merges them.
    async fn augment(
        &self,
        graph: &mut CodeGraph,
        snapshot: &FileSnapshot,
        extractions: &[FileExtraction],
    ) -> AugmentStats {
        let mut stats = AugmentStats::default();
        let mut catalogue = BTreeMap::new();

        if let Some(context) = self.context_for(OracleKind::Backend, snapshot, extractions) {
            let request = OracleRequest::backend(context);
            if let Some(proposal) = self.guard.propose::<BackendProposal>(&request).await {
                stats += apply_backend(graph, &proposal, &self.config.oracle.route_files);
                catalogue = proposal.catalogue();
            }
        }

        if let Some(context) = self.context_for(OracleKind::Frontend, snapshot, extractions) {
            let request = OracleRequest::frontend(context, catalogue);
            if let Some(proposal) = self.guard.propose::<FrontendProposal>(&request).await {
                stats += apply_frontend(graph, &proposal);
            }
        }

        debug!(
            "Augmentation: {} edges added, {} candidates dropped",
            stats.added, stats.dropped
        );
        stats
    }

    /// Bounded context over files of `kind` that declare something.
    fn context_for(
        &self,
        kind: OracleKind,
        snapshot: &FileSnapshot,
        extractions: &[FileExtraction],
    ) -> Option<String> {
        let mut builder = ContextBuilder::from_config(&self.config.oracle);
        for extraction in extractions {
            if extraction.definitions.is_empty()
                || OracleKind::for_path(&extraction.path) != Some(kind)
            {
                continue;
            }
            if let Some(content) = snapshot.get(&extraction.path) {
                if !builder.push(&extraction.path, content) {
                    break;
                }
            }
        }

        if builder.is_empty() {
            None
        } else {
            Some(builder.build())
        }
    }

    /// Runs `f` against the current graph while holding the read guard.
    pub async fn with_graph<R>(&self, f: impl FnOnce(&CodeGraph) -> R) -> Result<R> {
        let current = self.current.read().await;
        let built = current.as_ref().ok_or(SessionError::GraphNotBuilt)?;
        Ok(f(&built.graph))
    }

    /// The current graph.
    pub async fn graph(&self) -> Result<Arc<CodeGraph>> {
        self.with_built(|built| built.graph.clone()).await
    }

    /// Summary of the last completed build.
    pub async fn last_build(&self) -> Result<BuildSummary> {
        self.with_built(|built| built.summary.clone()).await
    }

    async fn with_built<R>(&self, f: impl FnOnce(&BuiltGraph) -> R) -> Result<R> {
        let current = self.current.read().await;
        current.as_ref().map(f).ok_or(SessionError::GraphNotBuilt)
    }

    /// Cycles, hubs, orphans and redundancy over the current graph.
    pub async fn structure_report(&self) -> Result<StructureReport> {
        let config = &self.config.structure;
        self.with_graph(|graph| analyze_structure(graph, config)).await
    }

    /// Direct dependents of `file`, with the relations involved.
    pub async fn blast_radius(&self, file: &str) -> Result<BlastRadius> {
        let file = normalize_path(file);
        self.with_graph(|graph| graph.blast_radius(&file)).await
    }

    /// Paths of the files directly depending on `file`.
    pub async fn surface(&self, file: &str) -> Result<BTreeSet<String>> {
        Ok(self.blast_radius(file).await?.files())
    }

    pub async fn export(&self) -> Result<GraphExport> {
        self.with_graph(|graph| graph.export()).await
    }

    pub async fn stats(&self) -> Result<GraphStats> {
        self.with_graph(|graph| graph.stats()).await
    }
}
