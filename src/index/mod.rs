//! Vector index: exact inner-product search over persisted artifacts.
//!
//! A published index is a directory of three files (`vectors.bin`,
//! `catalog.json`, `metadata.json`) written atomically by the builder and
//! loaded back as an immutable [`Snapshot`].

pub mod builder;
pub mod flat;
pub mod metadata;
pub mod storage;

pub use builder::{artifact_set_exists, BuildOutcome, IndexBuilder};
pub use flat::{FlatIndex, SearchHit};
pub use metadata::{IndexMetadata, METADATA_FILE};
pub use storage::{StoredVectors, VectorStorageError, VECTORS_FILE};

use crate::catalog::CatalogStore;
use crate::error::{RecommendError, RecommendResult};
use std::path::Path;

/// A complete, immutable view of one published index.
///
/// The vector matrix, the catalog it was built from, and the build
/// metadata always describe the same build. Cross-checks at load time
/// reject artifact sets whose files disagree with each other.
#[derive(Debug)]
pub struct Snapshot {
    pub index: FlatIndex,
    pub catalog: CatalogStore,
    pub metadata: IndexMetadata,
}

impl Snapshot {
    /// Load and cross-validate the artifact set in `dir`.
    ///
    /// A directory missing any of the three files is treated as absent,
    /// which covers both fresh workspaces and interrupted publishes.
    pub fn load(dir: &Path) -> RecommendResult<Self> {
        if !artifact_set_exists(dir) {
            return Err(RecommendError::MissingArtifact {
                path: dir.to_path_buf(),
            });
        }

        let stored = storage::read_vectors(dir).map_err(|e| match e {
            VectorStorageError::Io(io) => RecommendError::Load {
                path: dir.join(VECTORS_FILE),
                source: Box::new(io),
            },
            other => RecommendError::CorruptArtifact {
                reason: other.to_string(),
            },
        })?;

        let index = FlatIndex::from_flat(stored.dimension, stored.count, stored.data)
            .map_err(|e| RecommendError::CorruptArtifact {
                reason: e.to_string(),
            })?;
        let catalog = CatalogStore::load(dir)?;
        let metadata = IndexMetadata::load(dir)?;

        if catalog.len() != index.len() {
            return Err(RecommendError::CorruptArtifact {
                reason: format!(
                    "Catalog has {} records but storage has {} vectors",
                    catalog.len(),
                    index.len()
                ),
            });
        }
        if metadata.record_count != index.len() {
            return Err(RecommendError::CorruptArtifact {
                reason: format!(
                    "Metadata declares {} records but storage has {} vectors",
                    metadata.record_count,
                    index.len()
                ),
            });
        }
        if metadata.dimension != index.dimension() {
            return Err(RecommendError::CorruptArtifact {
                reason: format!(
                    "Metadata declares dimension {} but storage has dimension {}",
                    metadata.dimension,
                    index.dimension()
                ),
            });
        }

        Ok(Self {
            index,
            catalog,
            metadata,
        })
    }

    /// Check if a complete artifact set exists in `dir`.
    pub fn exists(dir: &Path) -> bool {
        artifact_set_exists(dir)
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
