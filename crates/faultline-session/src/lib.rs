//! Faultline Session - One snapshot, one graph, many analyses
//!
//! An [`AnalysisSession`] is owned by its caller; there is no global state.
//! A build extracts files in parallel, assembles the graph with a single
//! writer, optionally merges oracle proposals, and freezes the result.
//! Structural analysis and blast-radius queries then read that frozen graph.
//!
//! # Example
//!
//! ```no_run
//! use faultline_core::AnalysisConfig;
//! use faultline_session::{AnalysisSession, FileSnapshot};
//!
//! # async fn run() -> Result<(), faultline_session::SessionError> {
//! let session = AnalysisSession::new(AnalysisConfig::default(), None);
//! let snapshot: FileSnapshot = [
//!     ("a.py", "class Foo(Model): pass"),
//!     ("b.py", "from a import Foo\ndef use(): Foo()"),
//! ]
//! .into_iter()
//! .collect();
//!
//! session.build(snapshot).await?;
//! let dependents = session.surface("a.py").await?;
//! assert!(dependents.contains("b.py"));
//! # Ok(())
//! # }
//! ```

mod error;
mod session;
mod snapshot;

pub use error::{Result, SessionError};
pub use session::{AnalysisSession, BuildSummary};
pub use snapshot::FileSnapshot;
