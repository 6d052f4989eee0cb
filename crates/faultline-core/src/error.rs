//! Error types for extraction and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while extracting a single file.
///
/// None of these abort a batch: the file simply contributes nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Syntax errors in {path} (first at line {line})")]
    Syntax { path: String, line: u32 },

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Grammar error: {0}")]
    Grammar(String),
}

/// Errors raised while loading an [`AnalysisConfig`](crate::AnalysisConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
