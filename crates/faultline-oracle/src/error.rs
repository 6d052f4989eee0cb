use std::time::Duration;
use thiserror::Error;

/// Errors a semantic oracle can report.
///
/// None of these abort a build: the guard retries them and, past the retry
/// ceiling, falls back to no augmentation.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Rate limited. Try again later.")]
    RateLimited,

    #[error("API returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Malformed oracle reply: {0}")]
    Malformed(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

impl OracleError {
    /// Returns false for errors that another attempt cannot fix.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MissingConfig(_))
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Transport(err.to_string())
    }
}
