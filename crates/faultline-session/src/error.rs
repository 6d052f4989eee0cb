use thiserror::Error;

/// Errors surfaced by an analysis session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No graph has been built in this session yet")]
    GraphNotBuilt,

    #[error("A build is already in progress for this session")]
    BuildInProgress,

    #[error("Extraction worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
