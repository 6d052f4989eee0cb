//! Immutable input of one build.

use faultline_core::normalize_path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File contents keyed by repository-relative path.
///
/// Paths are normalised on insert and iterate in sorted order, which is
/// the order files are registered in the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    files: BTreeMap<String, String>,
}

impl FileSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, replacing any previous content at the same path.
    pub fn insert(&mut self, path: &str, content: impl Into<String>) {
        self.files.insert(normalize_path(path), content.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates `(path, content)` in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub(crate) fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }
}

impl<P: AsRef<str>, C: Into<String>> FromIterator<(P, C)> for FileSnapshot {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (path, content) in iter {
            snapshot.insert(path.as_ref(), content);
        }
        snapshot
    }
}
