//! Extraction output types.
//!
//! A `Definition` is one top-level declaration found in a file. The graph
//! builder turns each of them into a symbol node.

use serde::{Deserialize, Serialize};

/// The kind of a top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// A top-level callable.
    Function,
    /// A class with no ORM/base marker among its bases.
    Class,
    /// A class whose bases intersect the configured marker set.
    Model,
    /// A capitalised exported declaration in a UI-oriented file.
    Component,
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Model => "model",
            Self::Component => "component",
        };
        write!(f, "{}", s)
    }
}

/// How the definitions of a file were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// From a full syntax tree.
    Parsed,
    /// From best-effort pattern matching.
    Lexical,
}

/// 1-based inclusive line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: u32,
    pub end: u32,
}

impl LineSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Number of lines covered.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// A declaration extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Declared name, without any path prefix.
    pub name: String,

    /// Classification of the declaration.
    pub kind: DefinitionKind,

    /// Where the declaration lives in its file.
    pub line_span: LineSpan,

    /// Docstring or leading doc comment, if any.
    pub doc: Option<String>,

    /// Declared base types, as written (classes only).
    pub bases: Vec<String>,
}

impl Definition {
    /// Creates a definition with no doc and no bases.
    pub fn new(name: impl Into<String>, kind: DefinitionKind, line_span: LineSpan) -> Self {
        Self {
            name: name.into(),
            kind,
            line_span,
            doc: None,
            bases: Vec::new(),
        }
    }

    /// Sets the doc string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Sets the declared base types.
    pub fn with_bases(mut self, bases: Vec<String>) -> Self {
        self.bases = bases;
        self
    }
}

/// Everything extracted from a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileExtraction {
    /// Repository-relative path of the file.
    pub path: String,

    /// Top-level declarations, in source order.
    pub definitions: Vec<Definition>,

    /// Raw import reference strings, in source order.
    pub imports: Vec<String>,

    /// How the definitions were obtained.
    pub confidence: Confidence,
}

impl FileExtraction {
    /// An extraction that contributes nothing (used after a parse failure).
    pub fn empty(path: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            path: path.into(),
            definitions: Vec::new(),
            imports: Vec::new(),
            confidence,
        }
    }
}
