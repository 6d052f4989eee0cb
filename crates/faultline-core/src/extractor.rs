//! Source extractor: dispatches a file to its language extractor.
//!
//! `parse` reports failures; `extract` applies the recovery policy (a bad
//! file contributes nothing) and never fails. The extractor holds no parser
//! state, so one instance can be shared across worker threads.

use crate::config::ExtractionConfig;
use crate::definition::{Confidence, FileExtraction};
use crate::error::{ParseError, Result};
use crate::languages::{
    first_error_line, ExtractContext, LanguageExtractor, PythonExtractor, TypeScriptExtractor,
};
use crate::lexical::LexicalExtractor;
use tracing::{debug, warn};
use tree_sitter::Parser;

/// Turns file contents into definitions and import references.
pub struct SourceExtractor {
    config: ExtractionConfig,
    grammars: Vec<Box<dyn LanguageExtractor>>,
}

impl SourceExtractor {
    /// Creates an extractor with every built-in grammar.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            config: config.clone(),
            grammars: vec![
                Box::new(PythonExtractor),
                Box::new(TypeScriptExtractor::typescript()),
                Box::new(TypeScriptExtractor::tsx()),
            ],
        }
    }

    /// Returns true if the file takes part in a build.
    pub fn accepts(&self, path: &str) -> bool {
        if self.config.is_excluded(path) {
            return false;
        }
        let ext = extension(path);
        self.grammar_for(ext).is_some() || self.config.is_lexical_extension(ext)
    }

    /// How definitions of this file would be obtained, if it is supported at all.
    pub fn confidence_for(&self, path: &str) -> Option<Confidence> {
        let ext = extension(path);
        if self.grammar_for(ext).is_some() {
            Some(Confidence::Parsed)
        } else if self.config.is_lexical_extension(ext) {
            Some(Confidence::Lexical)
        } else {
            None
        }
    }

    /// Extracts a file, reporting parse failures.
    ///
    /// A syntax tree containing errors is rejected as a whole.
    pub fn parse(&self, path: &str, source: &str) -> Result<FileExtraction> {
        let ext = extension(path);
        let ui_file = self.config.is_ui_extension(ext);

        if let Some(grammar) = self.grammar_for(ext) {
            let mut parser = Parser::new();
            parser
                .set_language(&grammar.language())
                .map_err(|e| ParseError::Grammar(format!("Failed to set language: {}", e)))?;

            let tree = parser
                .parse(source, None)
                .ok_or_else(|| ParseError::Grammar("Tree-sitter returned no tree".into()))?;

            if let Some(line) = first_error_line(&tree.root_node()) {
                return Err(ParseError::Syntax {
                    path: path.to_string(),
                    line,
                });
            }

            let ctx = ExtractContext {
                path,
                ui_file,
                config: &self.config,
            };
            let extracted = grammar.extract(&tree, source, &ctx);

            return Ok(FileExtraction {
                path: path.to_string(),
                definitions: extracted.definitions,
                imports: extracted.imports,
                confidence: Confidence::Parsed,
            });
        }

        if self.config.is_lexical_extension(ext) {
            let (definitions, imports) = LexicalExtractor.extract(source, ui_file);
            return Ok(FileExtraction {
                path: path.to_string(),
                definitions,
                imports,
                confidence: Confidence::Lexical,
            });
        }

        Err(ParseError::UnsupportedLanguage(path.to_string()))
    }

    /// Extracts a file; a failure yields an empty extraction.
    pub fn extract(&self, path: &str, source: &str) -> FileExtraction {
        match self.parse(path, source) {
            Ok(extraction) => {
                debug!(
                    "{}: {} definitions, {} imports",
                    path,
                    extraction.definitions.len(),
                    extraction.imports.len()
                );
                extraction
            }
            Err(e) => {
                warn!("Skipping definitions of {}: {}", path, e);
                let confidence = self.confidence_for(path).unwrap_or(Confidence::Lexical);
                FileExtraction::empty(path, confidence)
            }
        }
    }

    fn grammar_for(&self, ext: &str) -> Option<&dyn LanguageExtractor> {
        self.grammars
            .iter()
            .find(|g| g.extensions().contains(&ext))
            .map(|g| g.as_ref())
    }
}

fn extension(path: &str) -> &str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => &file_name[pos + 1..],
        _ => "",
    }
}
