//! Analysis configuration.
//!
//! Loaded from `.faultline/config.json` at the project root. Every field has
//! a default, so a partial file only overrides what it names.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory holding project-local Faultline state.
pub const CONFIG_DIR: &str = ".faultline";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Top-level configuration for one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub extraction: ExtractionConfig,
    pub structure: StructureConfig,
    pub oracle: OracleConfig,
}

/// Controls which files are accepted and how declarations are classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Base-type names that turn a class into a model.
    pub model_markers: Vec<String>,

    /// Extensions of UI-oriented files, where capitalised exports are components.
    pub ui_extensions: Vec<String>,

    /// Extensions handled by lexical pattern matching.
    pub lexical_extensions: Vec<String>,

    /// Path fragments that exclude a file from the build.
    pub excluded_paths: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model_markers: strings(&[
                "Model",
                "BaseModel",
                "Base",
                "DeclarativeBase",
                "SQLModel",
                "Document",
                "BaseEntity",
            ]),
            ui_extensions: strings(&["tsx", "jsx", "vue", "svelte"]),
            lexical_extensions: strings(&[
                "go", "rb", "java", "kt", "rs", "php", "cs", "swift", "vue", "svelte",
            ]),
            excluded_paths: strings(&[
                "node_modules/",
                "venv/",
                ".venv/",
                "__pycache__/",
                "migrations/",
                "dist/",
                "build/",
                ".git/",
            ]),
        }
    }
}

impl ExtractionConfig {
    /// Returns true if any excluded fragment occurs in the path.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
    }

    /// Returns true if `name` (or its trailing dotted segment) is a model marker.
    pub fn is_model_marker(&self, base: &str) -> bool {
        let trailing = base.rsplit('.').next().unwrap_or(base);
        self.model_markers
            .iter()
            .any(|marker| marker == base || marker == trailing)
    }

    pub fn is_ui_extension(&self, ext: &str) -> bool {
        self.ui_extensions.iter().any(|e| e == ext)
    }

    pub fn is_lexical_extension(&self, ext: &str) -> bool {
        self.lexical_extensions.iter().any(|e| e == ext)
    }
}

/// Thresholds and conventions for the structural analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureConfig {
    /// Cycle enumeration is skipped above this many nodes.
    pub cycle_node_limit: usize,

    /// At most this many cycles are reported.
    pub max_cycles: usize,

    /// A hub's degree must exceed `hub_multiplier * average degree`...
    pub hub_multiplier: f64,

    /// ...and this absolute floor.
    pub hub_min_degree: usize,

    /// File names treated as entry points (their symbols are never orphans).
    pub entry_points: Vec<String>,

    /// Path fragments marking test files.
    pub test_markers: Vec<String>,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            cycle_node_limit: 1000,
            max_cycles: 200,
            hub_multiplier: 4.0,
            hub_min_degree: 10,
            entry_points: strings(&[
                "main.py",
                "__main__.py",
                "manage.py",
                "app.py",
                "wsgi.py",
                "asgi.py",
                "urls.py",
                "settings.py",
                "conftest.py",
                "index.js",
                "index.ts",
                "index.tsx",
                "main.js",
                "main.ts",
                "main.tsx",
                "App.js",
                "App.jsx",
                "App.tsx",
            ]),
            test_markers: strings(&[
                "test_",
                "_test.",
                ".test.",
                ".spec.",
                "tests/",
                "__tests__/",
            ]),
        }
    }
}

impl StructureConfig {
    /// Returns true if the file name of `path` is on the entry-point list.
    pub fn is_entry_point(&self, path: &str) -> bool {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        self.entry_points.iter().any(|entry| entry == file_name)
    }

    /// Returns true if `path` looks like a test file.
    pub fn is_test_file(&self, path: &str) -> bool {
        self.test_markers
            .iter()
            .any(|marker| path.contains(marker.as_str()))
    }
}

/// Settings for the semantic oracle and its guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Whether augmentation is attempted at all.
    pub enabled: bool,

    /// Per-attempt timeout.
    pub timeout_secs: u64,

    /// Attempts before giving up.
    pub max_attempts: u32,

    /// Wait after the first failure; doubles after each further one.
    pub initial_backoff_ms: u64,

    /// Bytes of each file included in the context.
    pub per_file_bytes: usize,

    /// Total context budget in bytes.
    pub context_bytes: usize,

    /// File names that declare routes (linked to endpoints with `Defines`).
    pub route_files: Vec<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 60,
            max_attempts: 3,
            initial_backoff_ms: 2000,
            per_file_bytes: 3000,
            context_bytes: 60_000,
            route_files: strings(&["urls.py", "routes.py"]),
        }
    }
}

impl AnalysisConfig {
    /// Path of the config file for a project root.
    pub fn path_for(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Loads a config file, failing on I/O or JSON errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `.faultline/config.json` under `root`.
    ///
    /// Returns defaults if the file does not exist or cannot be used.
    pub fn load_or_default(root: &Path) -> Self {
        let path = Self::path_for(root);
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"structure": {"hub_min_degree": 3}}"#).unwrap();
        assert_eq!(config.structure.hub_min_degree, 3);
        assert_eq!(config.structure.cycle_node_limit, 1000);
        assert_eq!(config.oracle.max_attempts, 3);
        assert!(config.extraction.is_model_marker("Model"));
    }

    #[test]
    fn test_model_marker_matches_dotted_base() {
        let config = ExtractionConfig::default();
        assert!(config.is_model_marker("models.Model"));
        assert!(config.is_model_marker("db.Base"));
        assert!(!config.is_model_marker("Exception"));
    }

    #[test]
    fn test_entry_points_and_tests() {
        let config = StructureConfig::default();
        assert!(config.is_entry_point("backend/manage.py"));
        assert!(!config.is_entry_point("backend/views.py"));
        assert!(config.is_test_file("tests/test_views.py"));
        assert!(config.is_test_file("src/Button.test.tsx"));
        assert!(!config.is_test_file("src/Button.tsx"));
    }

    #[test]
    fn test_exclusions() {
        let config = ExtractionConfig::default();
        assert!(config.is_excluded("web/node_modules/react/index.js"));
        assert!(config.is_excluded("app/migrations/0001_initial.py"));
        assert!(!config.is_excluded("app/models.py"));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempdir().unwrap();
        assert_eq!(AnalysisConfig::load_or_default(dir.path()), AnalysisConfig::default());

        let path = AnalysisConfig::path_for(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"oracle": {"enabled": false}}"#).unwrap();
        let config = AnalysisConfig::load_or_default(dir.path());
        assert!(!config.oracle.enabled);

        fs::write(&path, "{ not json").unwrap();
        assert!(AnalysisConfig::load(&path).is_err());
        assert_eq!(AnalysisConfig::load_or_default(dir.path()), AnalysisConfig::default());
    }
}
