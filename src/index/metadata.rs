//! Metadata tracking for index persistence.
//!
//! Records which model and catalog produced the stored vectors so loads
//! can detect mismatched artifacts and builds can skip work when the
//! catalog has not changed. The metadata file is written last during a
//! build, so its presence marks a complete artifact set.

use crate::error::{RecommendError, RecommendResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name inside the index directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Metadata for a built index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Name of the embedding model used
    pub model_name: String,

    /// Dimension of embeddings
    pub dimension: usize,

    /// Number of records indexed
    pub record_count: usize,

    /// Similarity metric the vectors were stored for
    pub metric: String,

    /// SHA256 fingerprint of the catalog content that was indexed
    pub catalog_fingerprint: String,

    /// Unix timestamp when the index was built
    pub created_at: u64,

    /// Unix timestamp of the last rebuild
    pub updated_at: u64,

    /// Version of the metadata format
    pub version: u32,
}

impl IndexMetadata {
    /// Current metadata version
    const CURRENT_VERSION: u32 = 1;

    /// Create new metadata with the current timestamp
    pub fn new(
        model_name: String,
        dimension: usize,
        record_count: usize,
        catalog_fingerprint: String,
    ) -> Self {
        let now = get_utc_timestamp();
        Self {
            model_name,
            dimension,
            record_count,
            metric: "inner_product".to_string(),
            catalog_fingerprint,
            created_at: now,
            updated_at: now,
            version: Self::CURRENT_VERSION,
        }
    }

    /// Save metadata to a JSON file in `dir`
    pub fn save(&self, dir: &Path) -> RecommendResult<()> {
        let path = dir.join(METADATA_FILE);

        let json = serde_json::to_string_pretty(self).map_err(|e| RecommendError::Persistence {
            path: path.clone(),
            source: Box::new(e),
        })?;

        std::fs::write(&path, json).map_err(|e| RecommendError::Persistence {
            path,
            source: Box::new(e),
        })
    }

    /// Load metadata from `dir`
    pub fn load(dir: &Path) -> RecommendResult<Self> {
        let path = dir.join(METADATA_FILE);

        let json = std::fs::read_to_string(&path).map_err(|e| RecommendError::Load {
            path: path.clone(),
            source: Box::new(e),
        })?;

        let metadata: Self =
            serde_json::from_str(&json).map_err(|e| RecommendError::CorruptArtifact {
                reason: format!("{} is not valid metadata: {}", path.display(), e),
            })?;

        if metadata.version > Self::CURRENT_VERSION {
            return Err(RecommendError::CorruptArtifact {
                reason: format!(
                    "Metadata version {} is newer than supported version {}",
                    metadata.version,
                    Self::CURRENT_VERSION
                ),
            });
        }

        Ok(metadata)
    }

    /// Check if a metadata file exists in `dir`
    pub fn exists(dir: &Path) -> bool {
        dir.join(METADATA_FILE).exists()
    }
}

/// Current UTC timestamp in seconds since UNIX_EPOCH
fn get_utc_timestamp() -> u64 {
    Utc::now().timestamp() as u64
}
