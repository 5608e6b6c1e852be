//! Error types for the recommendation engine.
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use crate::encoder::EncodeError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for recommendation operations
#[derive(Error, Debug)]
pub enum RecommendError {
    /// Query validation errors
    #[error("Query is empty or contains only whitespace")]
    InvalidQuery,

    /// Build-time precondition violations
    #[error("Catalog has no records, cannot build an index with zero vectors")]
    EmptyCatalog,

    /// Embedding model errors
    #[error("Embedding failed: {0}")]
    Encoding(#[from] EncodeError),

    /// Persisted index/store pair is absent
    #[error("Index artifacts not found at '{path}'")]
    MissingArtifact { path: PathBuf },

    /// Catalog input errors
    #[error("Failed to load catalog from '{path}': {reason}")]
    CatalogLoad { path: PathBuf, reason: String },

    /// Evaluation dataset input errors
    #[error("Failed to load query dataset from '{path}': {reason}")]
    DatasetLoad { path: PathBuf, reason: String },

    /// Storage errors
    #[error("Failed to persist index to '{path}': {source}")]
    Persistence {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to load index from '{path}': {source}")]
    Load {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Artifact consistency errors
    #[error("Index artifacts are corrupted: {reason}")]
    CorruptArtifact { reason: String },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    /// General errors for cases where we need to preserve the original cause
    #[error("{0}")]
    General(String),
}

impl RecommendError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::InvalidQuery => "INVALID_QUERY",
            Self::EmptyCatalog => "EMPTY_CATALOG",
            Self::Encoding(_) => "ENCODING_ERROR",
            Self::MissingArtifact { .. } => "MISSING_ARTIFACT",
            Self::CatalogLoad { .. } => "CATALOG_LOAD_ERROR",
            Self::DatasetLoad { .. } => "DATASET_LOAD_ERROR",
            Self::Persistence { .. } => "PERSISTENCE_ERROR",
            Self::Load { .. } => "LOAD_ERROR",
            Self::CorruptArtifact { .. } => "INDEX_CORRUPTED",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidQuery => vec![
                "Provide a non-empty query describing the role or skills to assess",
                "Example: aptrank recommend \"Python developer with strong SQL skills\"",
            ],
            Self::EmptyCatalog => vec![
                "Check that the catalog CSV contains at least one data row",
                "Run 'aptrank status' to see which catalog source is active",
            ],
            Self::Encoding(_) => vec![
                "Ensure you have an internet connection for the first-time model download",
                "Check that the model cache directory is writable",
            ],
            Self::MissingArtifact { .. } => vec![
                "Run 'aptrank build' to create the index artifacts",
                "Check that index_path in settings.toml points at the right directory",
            ],
            Self::CorruptArtifact { .. } => vec![
                "Run 'aptrank build --force' to rebuild from scratch",
                "Check for disk errors or filesystem corruption",
            ],
            Self::Load { .. } | Self::Persistence { .. } => vec![
                "Check disk space and permissions in the index directory",
                "Run 'aptrank build --force' if you continue to have issues",
            ],
            Self::CatalogLoad { .. } => vec![
                "Check that the file exists and uses the columns name,url,description,type",
                "Remove catalog.path from settings.toml to fall back to the built-in catalog",
            ],
            Self::DatasetLoad { .. } => vec![
                "Check that the file uses a Query column (and Assessment_url for labeled data)",
                "Update the [evaluation] paths in settings.toml if the files moved",
            ],
            Self::Config { .. } => vec![
                "Run 'aptrank init' to create a default settings file",
            ],
            _ => vec![],
        }
    }
}

/// Result type alias for recommendation operations
pub type RecommendResult<T> = Result<T, RecommendError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> Result<T, RecommendError>;

    /// Add context with a path
    fn with_path(self, path: &std::path::Path) -> Result<T, RecommendError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T, RecommendError> {
        self.map_err(|e| RecommendError::General(format!("{msg}: {e}")))
    }

    fn with_path(self, path: &std::path::Path) -> Result<T, RecommendError> {
        self.map_err(|e| {
            RecommendError::General(format!("Error processing '{}': {}", path.display(), e))
        })
    }
}
