//! Faultline Core - Source extraction
//!
//! This crate turns one file's text into the declarations and import
//! references the graph builder needs. It knows nothing about graphs.
//!
//! Python and TypeScript/JavaScript are parsed with Tree-sitter. Other
//! known source files fall back to lexical pattern matching, which yields
//! the same output shape at a lower confidence.
//!
//! # Example
//!
//! ```no_run
//! use faultline_core::{AnalysisConfig, SourceExtractor};
//!
//! let config = AnalysisConfig::default();
//! let extractor = SourceExtractor::new(&config.extraction);
//!
//! let extraction = extractor.extract("app/models.py", "class User(Model): pass");
//! assert_eq!(extraction.definitions[0].name, "User");
//! ```

pub mod config;
mod definition;
mod error;
mod extractor;
pub mod languages;
mod lexical;

pub use config::{AnalysisConfig, ExtractionConfig, OracleConfig, StructureConfig};
pub use definition::{Confidence, Definition, DefinitionKind, FileExtraction, LineSpan};
pub use error::{ConfigError, ParseError, Result};
pub use extractor::SourceExtractor;

/// Separator between a file path and a symbol name in node ids.
pub const SYMBOL_SEPARATOR: &str = "::";

/// Normalises a repository-relative path: forward slashes, no leading `./`.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut trimmed = unified.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.trim_start_matches('/').to_string()
}
