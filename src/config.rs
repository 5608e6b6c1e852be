//! Configuration module for the recommendation engine.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `AR_` and use double underscores
//! to separate nested levels:
//! - `AR_EMBEDDING__BATCH_SIZE=64` sets `embedding.batch_size`
//! - `AR_CATALOG__PATH=data/custom.csv` sets `catalog.path`
//! - `AR_DEBUG=true` sets `debug`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

static GLOBAL_DEBUG: AtomicBool = AtomicBool::new(false);

/// Enable or disable global debug output for `debug_print!`.
pub fn set_global_debug(enabled: bool) {
    GLOBAL_DEBUG.store(enabled, Ordering::Relaxed);
}

/// Check whether global debug output is enabled.
pub fn is_global_debug_enabled() -> bool {
    GLOBAL_DEBUG.load(Ordering::Relaxed)
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Path to the index directory
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Workspace root directory (where .aptrank is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Catalog source configuration
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Evaluation input/output configuration
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    /// Path to the catalog CSV (columns: name,url,description,type).
    /// When the file does not exist, the built-in assessment catalog is used.
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    /// Model to use for embeddings
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Number of texts encoded per batch during index builds
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Show the model download progress bar on first run
    #[serde(default = "default_false")]
    pub show_download_progress: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EvaluationConfig {
    /// Labeled queries with ground-truth URLs (columns: Query,Assessment_url)
    #[serde(default = "default_labeled_path")]
    pub labeled_path: PathBuf,

    /// Unlabeled queries for submission generation (column: Query)
    #[serde(default = "default_unlabeled_path")]
    pub unlabeled_path: PathBuf,

    /// Where `evaluate` writes its per-query report
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Where `submit` writes the submission rows
    #[serde(default = "default_submission_path")]
    pub submission_path: PathBuf,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_index_path() -> PathBuf {
    PathBuf::from(".aptrank/index")
}
fn default_false() -> bool {
    false
}
fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/catalog.csv")
}
fn default_embedding_model() -> String {
    "AllMiniLML6V2".to_string()
}
fn default_batch_size() -> usize {
    32
}
fn default_labeled_path() -> PathBuf {
    PathBuf::from("data/labeled_queries.csv")
}
fn default_unlabeled_path() -> PathBuf {
    PathBuf::from("data/unlabeled_queries.csv")
}
fn default_report_path() -> PathBuf {
    PathBuf::from("reports/evaluation.csv")
}
fn default_submission_path() -> PathBuf {
    PathBuf::from("reports/submission.csv")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index_path: default_index_path(),
            workspace_root: None,
            debug: false,
            catalog: CatalogConfig::default(),
            embedding: EmbeddingConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            show_download_progress: false,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            labeled_path: default_labeled_path(),
            unlabeled_path: default_unlabeled_path(),
            report_path: default_report_path(),
            submission_path: default_submission_path(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .aptrank directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".aptrank/settings.toml"));

        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Layer in environment variables with AR_ prefix
            // Use double underscore (__) to separate nested levels
            // Single underscore (_) remains as is within field names
            .merge(Env::prefixed("AR_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".") // Double underscore becomes dot
                    .into()
            }))
            // Extract into Settings struct
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                // If workspace_root is not set in config, detect it
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Find the workspace root by looking for .aptrank directory
    /// Searches from current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".aptrank");
            if config_dir.exists() && config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Check if configuration is properly initialized
    pub fn check_init() -> Result<(), String> {
        // Try to find workspace config
        let config_path = if let Some(path) = Self::find_workspace_config() {
            path
        } else {
            // No workspace found, check current directory
            PathBuf::from(".aptrank/settings.toml")
        };

        // Check if settings.toml exists
        if !config_path.exists() {
            return Err("No configuration file found".to_string());
        }

        // Try to parse the config file to check if it's valid
        match std::fs::read_to_string(&config_path) {
            Ok(content) => {
                if let Err(e) = toml::from_str::<Settings>(&content) {
                    return Err(format!(
                        "Configuration file is corrupted: {e}\nRun 'aptrank init --force' to regenerate."
                    ));
                }
            }
            Err(e) => {
                return Err(format!("Cannot read configuration file: {e}"));
            }
        }

        Ok(())
    }

    /// Get the workspace root directory (where .aptrank is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".aptrank");
            if config_dir.exists() && config_dir.is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }

        None
    }

    /// Resolve a configured path against the workspace root.
    ///
    /// Relative paths in settings are workspace-relative so commands behave
    /// the same from any subdirectory.
    pub fn resolve_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.workspace_root {
            Some(root) => root.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Directory holding the vector artifact, catalog, and metadata files.
    pub fn index_dir(&self) -> PathBuf {
        self.resolve_path(&self.index_path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("AR_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Save current configuration to file
    pub fn save(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(".aptrank/settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        // Create parent directory if needed
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create a well-documented settings.toml template
        let current_dir = std::env::current_dir().unwrap_or_default();
        let template = format!(
            r#"# Aptrank Configuration File
# https://github.com/sergitorres-codere/aptrank

# Version of the configuration schema
version = 1

# Path to the index directory (relative to workspace root)
index_path = ".aptrank/index"

# Workspace root directory (automatically detected)
workspace_root = "{}"

# Global debug mode
debug = false

[catalog]
# Path to the catalog CSV with columns: name,url,description,type
# The type column uses K (knowledge/technical) or P (personality/behavioral).
# When this file does not exist, the built-in assessment catalog is used.
path = "data/catalog.csv"

[embedding]
# Model to use for embeddings (384-dimensional)
model = "AllMiniLML6V2"

# Number of texts encoded per batch during index builds
batch_size = 32

# Show the model download progress bar on first run
show_download_progress = false

[evaluation]
# Labeled queries with ground-truth URLs (columns: Query,Assessment_url)
labeled_path = "data/labeled_queries.csv"

# Unlabeled queries for submission generation (column: Query)
unlabeled_path = "data/unlabeled_queries.csv"

# Where 'aptrank evaluate' writes the per-query report
report_path = "reports/evaluation.csv"

# Where 'aptrank submit' writes the submission rows
submission_path = "reports/submission.csv"
"#,
            current_dir.display()
        );

        std::fs::write(&config_path, template)?;

        if force {
            println!("Overwrote configuration at: {}", config_path.display());
        } else {
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
        }

        Ok(config_path)
    }
}
