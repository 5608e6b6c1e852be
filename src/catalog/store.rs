//! Persisted catalog snapshot.
//!
//! The catalog is stored alongside the vector artifact as a JSON array in
//! positional order. Position `i` in this file corresponds to row `i` in
//! `vectors.bin`, which is the contract the retriever relies on to map
//! search hits back to assessment records.

use crate::catalog::AssessmentRecord;
use crate::error::{RecommendError, RecommendResult};
use std::fs;
use std::path::Path;

/// File name inside the index directory.
pub const CATALOG_FILE: &str = "catalog.json";

/// Ordered catalog tied to a vector artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStore {
    records: Vec<AssessmentRecord>,
}

impl CatalogStore {
    pub fn from_records(records: Vec<AssessmentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AssessmentRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&AssessmentRecord> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the catalog into `dir` as pretty-printed JSON.
    pub fn save(&self, dir: &Path) -> RecommendResult<()> {
        let path = dir.join(CATALOG_FILE);
        let json = serde_json::to_string_pretty(&self.records).map_err(|e| {
            RecommendError::Persistence {
                path: path.clone(),
                source: Box::new(e),
            }
        })?;
        fs::write(&path, json).map_err(|e| RecommendError::Persistence {
            path,
            source: Box::new(e),
        })
    }

    /// Load the catalog from `dir`.
    ///
    /// An unreadable file is a load error; a file that reads but does not
    /// parse is reported as corruption so callers suggest a rebuild.
    pub fn load(dir: &Path) -> RecommendResult<Self> {
        let path = dir.join(CATALOG_FILE);
        let content = fs::read_to_string(&path).map_err(|e| RecommendError::Load {
            path: path.clone(),
            source: Box::new(e),
        })?;

        let records: Vec<AssessmentRecord> =
            serde_json::from_str(&content).map_err(|e| RecommendError::CorruptArtifact {
                reason: format!("{} is not a valid catalog: {}", path.display(), e),
            })?;

        Ok(Self { records })
    }

    pub fn exists(dir: &Path) -> bool {
        dir.join(CATALOG_FILE).exists()
    }
}
