//! Faultline Graph - Code relationship model and analyses
//!
//! This crate turns per-file extractions into a directed graph of files,
//! symbols and endpoints, and runs read-only analyses over it.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional indexes for:
//! - Id lookups (`path`, `path::Symbol`, `API::route`)
//! - Edge idempotence on `(source, target, relation)`
//!
//! Building is single-writer: [`GraphBuilder`] registers files, then links
//! imports. Oracle proposals are merged afterwards through the
//! [`FuzzyResolver`]. After that the graph is frozen and analysed by
//! [`analyze_structure`] and [`CodeGraph::blast_radius`].
//!
//! # Example
//!
//! ```no_run
//! use faultline_core::{AnalysisConfig, SourceExtractor};
//! use faultline_graph::GraphBuilder;
//!
//! let config = AnalysisConfig::default();
//! let extractor = SourceExtractor::new(&config.extraction);
//!
//! let files = vec![
//!     extractor.extract("a.py", "class Foo(Model): pass"),
//!     extractor.extract("b.py", "from a import Foo\ndef use(): Foo()"),
//! ];
//! let graph = GraphBuilder::from_extractions(&files);
//!
//! assert!(graph.surface("a.py").contains("b.py"));
//! ```

pub mod augment;
mod builder;
mod cycles;
mod edge;
mod export;
mod graph;
mod impact;
mod node;
mod resolver;
pub mod structure;
mod symbol_table;

pub use augment::{
    apply_backend, apply_frontend, ApiRoute, AugmentStats, BackendProposal, CallLink,
    FrontendLink, FrontendProposal,
};
pub use builder::GraphBuilder;
pub use cycles::{elementary_cycles, CycleSearch};
pub use edge::{GraphEdge, Relation};
pub use export::{ExportInfo, ExportNode, GraphExport};
pub use graph::{CodeGraph, GraphStats, NodeId};
pub use impact::BlastRadius;
pub use node::{endpoint_id, normalize_route, symbol_id, Node, NodeKind, NodeMetadata, ENDPOINT_PREFIX};
pub use resolver::FuzzyResolver;
pub use structure::{
    analyze_structure, CheckStatus, Cycle, Hub, Orphan, RedundancyCluster, StructureReport,
    SubReport,
};
pub use symbol_table::SymbolTable;
