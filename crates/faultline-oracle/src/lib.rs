//! Faultline Oracle - Proposed edges from outside the syntax tree
//!
//! Some relationships (URL routing, calls through frameworks, which
//! component hits which endpoint) are not visible to the extractor. A
//! [`SemanticOracle`] proposes them; the graph crate resolves and merges
//! the proposals.
//!
//! Oracles are slow and unreliable, so they are only ever called through
//! an [`OracleGuard`]: a per-attempt timeout, a retry ceiling and
//! exponential backoff. Failure means "no augmentation", never a failed
//! build.

mod chat;
mod context;
mod error;
mod guard;
mod oracle;

pub use chat::{clean_json, ChatOracle};
pub use context::{truncate_at_boundary, ContextBuilder};
pub use error::OracleError;
pub use guard::{invoke_guarded, GuardPolicy, OracleGuard};
pub use oracle::{OracleKind, OracleRequest, SemanticOracle, BACKEND_SCHEMA, FRONTEND_SCHEMA};
