//! Index construction: encode the catalog and publish the artifact set.
//!
//! Builds stage all three files (vectors, catalog, metadata) into a
//! temporary directory next to the target, then swap the whole directory
//! into place with a rename. Readers either see the previous complete
//! artifact set or the new one, never a half-written mix.

use crate::catalog::{catalog_fingerprint, AssessmentRecord, CatalogStore};
use crate::config::Settings;
use crate::display::create_progress_bar;
use crate::encoder::{EncodeError, TextEncoder};
use crate::error::{RecommendError, RecommendResult};
use crate::index::metadata::IndexMetadata;
use crate::index::storage;
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a build run.
#[derive(Debug)]
pub struct BuildOutcome {
    pub index_dir: PathBuf,
    pub record_count: usize,
    pub dimension: usize,
    /// True when the stored artifact already matched the catalog
    pub skipped: bool,
}

/// Builds the vector artifact set from catalog records.
pub struct IndexBuilder<'a> {
    settings: &'a Settings,
    encoder: &'a dyn TextEncoder,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(settings: &'a Settings, encoder: &'a dyn TextEncoder) -> Self {
        Self { settings, encoder }
    }

    /// Encode `records` and publish the index directory.
    ///
    /// When the stored metadata already matches the catalog fingerprint and
    /// model, the build is skipped unless `force` is set. An empty catalog
    /// is an error; an index with zero vectors can never satisfy a query.
    pub fn build(
        &self,
        records: Vec<AssessmentRecord>,
        force: bool,
    ) -> RecommendResult<BuildOutcome> {
        self.build_with_options(records, force, false)
    }

    /// Same as [`IndexBuilder::build`] with a terminal progress bar that
    /// advances per encoded batch.
    pub fn build_with_options(
        &self,
        records: Vec<AssessmentRecord>,
        force: bool,
        progress: bool,
    ) -> RecommendResult<BuildOutcome> {
        if records.is_empty() {
            return Err(RecommendError::EmptyCatalog);
        }

        let index_dir = self.settings.index_dir();
        let fingerprint = catalog_fingerprint(&records);
        let model_name = self.settings.embedding.model.clone();

        if !force && artifact_set_exists(&index_dir) {
            // Unreadable or stale metadata just means we rebuild
            if let Ok(existing) = IndexMetadata::load(&index_dir) {
                if existing.catalog_fingerprint == fingerprint && existing.model_name == model_name
                {
                    tracing::info!(
                        "Index at {} already matches the catalog, skipping build",
                        index_dir.display()
                    );
                    return Ok(BuildOutcome {
                        index_dir,
                        record_count: existing.record_count,
                        dimension: existing.dimension,
                        skipped: true,
                    });
                }
            }
        }

        let record_count = records.len();
        let texts: Vec<String> = records.iter().map(|r| r.embedding_text()).collect();

        tracing::debug!("Encoding {record_count} catalog records");
        let vectors = self.encode_texts(&texts, progress)?;
        let dimension = self.encoder.dimension();

        let parent = index_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent).map_err(|e| RecommendError::Persistence {
            path: parent.clone(),
            source: Box::new(e),
        })?;

        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(&parent)
            .map_err(|e| RecommendError::Persistence {
                path: parent.clone(),
                source: Box::new(e),
            })?;

        storage::write_vectors(staging.path(), dimension, &vectors).map_err(|e| {
            RecommendError::Persistence {
                path: staging.path().join(storage::VECTORS_FILE),
                source: Box::new(e),
            }
        })?;
        CatalogStore::from_records(records).save(staging.path())?;
        // Metadata goes last; its presence marks the artifact set complete
        IndexMetadata::new(model_name, dimension, record_count, fingerprint)
            .save(staging.path())?;

        if index_dir.exists() {
            fs::remove_dir_all(&index_dir).map_err(|e| RecommendError::Persistence {
                path: index_dir.clone(),
                source: Box::new(e),
            })?;
        }

        let staged = staging.keep();
        if let Err(e) = fs::rename(&staged, &index_dir) {
            let _ = fs::remove_dir_all(&staged);
            return Err(RecommendError::Persistence {
                path: index_dir,
                source: Box::new(e),
            });
        }

        tracing::info!(
            "Built index with {record_count} vectors at {}",
            index_dir.display()
        );
        Ok(BuildOutcome {
            index_dir,
            record_count,
            dimension,
            skipped: false,
        })
    }

    /// Encode texts in `batch_size` chunks so the bar moves between batches.
    fn encode_texts(&self, texts: &[String], progress: bool) -> RecommendResult<Vec<Vec<f32>>> {
        let batch_size = self.settings.embedding.batch_size.max(1);
        let bar = if progress {
            create_progress_bar(texts.len() as u64, "Encoding assessments")
        } else {
            ProgressBar::hidden()
        };

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(batch_size) {
            vectors.extend(self.encoder.encode_batch(chunk)?);
            bar.inc(chunk.len() as u64);
        }
        bar.finish_and_clear();

        if vectors.len() != texts.len() {
            return Err(EncodeError::EmbeddingFailed(format!(
                "model returned {} embeddings for {} texts",
                vectors.len(),
                texts.len()
            ))
            .into());
        }
        Ok(vectors)
    }
}

/// All three artifact files present in `dir`.
pub fn artifact_set_exists(dir: &Path) -> bool {
    storage::vectors_exist(dir) && CatalogStore::exists(dir) && IndexMetadata::exists(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssessmentCategory;
    use crate::encoder::MockEncoder;
    use tempfile::TempDir;

    fn test_settings(root: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.workspace_root = Some(root.to_path_buf());
        settings
    }

    fn sample_records() -> Vec<AssessmentRecord> {
        vec![
            AssessmentRecord::new(
                "Coding Test",
                "https://example.com/coding",
                "Technical coding assessment for developers",
                AssessmentCategory::Knowledge,
            ),
            AssessmentRecord::new(
                "Leadership Review",
                "https://example.com/leadership",
                "Leadership potential questionnaire",
                AssessmentCategory::Personality,
            ),
        ]
    }

    #[test]
    fn test_build_publishes_all_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(temp_dir.path());
        let encoder = MockEncoder::with_dimension(16);

        let outcome = IndexBuilder::new(&settings, &encoder)
            .build(sample_records(), false)
            .unwrap();

        assert!(!outcome.skipped);
        assert_eq!(outcome.record_count, 2);
        assert_eq!(outcome.dimension, 16);
        assert!(artifact_set_exists(&outcome.index_dir));
    }

    #[test]
    fn test_build_leaves_no_staging_directories() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(temp_dir.path());
        let encoder = MockEncoder::with_dimension(16);

        let outcome = IndexBuilder::new(&settings, &encoder)
            .build(sample_records(), false)
            .unwrap();

        let parent = outcome.index_dir.parent().unwrap();
        let leftovers: Vec<_> = fs::read_dir(parent)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".staging-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_rebuild_with_unchanged_catalog_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(temp_dir.path());
        let encoder = MockEncoder::with_dimension(16);
        let builder = IndexBuilder::new(&settings, &encoder);

        let first = builder.build(sample_records(), false).unwrap();
        assert!(!first.skipped);

        let second = builder.build(sample_records(), false).unwrap();
        assert!(second.skipped);
        assert_eq!(second.record_count, 2);
    }

    #[test]
    fn test_force_rebuilds_unchanged_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(temp_dir.path());
        let encoder = MockEncoder::with_dimension(16);
        let builder = IndexBuilder::new(&settings, &encoder);

        builder.build(sample_records(), false).unwrap();
        let forced = builder.build(sample_records(), true).unwrap();
        assert!(!forced.skipped);
    }

    #[test]
    fn test_changed_catalog_triggers_rebuild() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(temp_dir.path());
        let encoder = MockEncoder::with_dimension(16);
        let builder = IndexBuilder::new(&settings, &encoder);

        builder.build(sample_records(), false).unwrap();

        let mut changed = sample_records();
        changed.push(AssessmentRecord::new(
            "Numerical Drill",
            "https://example.com/numerical",
            "Numerical reasoning drill",
            AssessmentCategory::Knowledge,
        ));
        let outcome = builder.build(changed, false).unwrap();
        assert!(!outcome.skipped);
        assert_eq!(outcome.record_count, 3);
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let settings = test_settings(temp_dir.path());
        let encoder = MockEncoder::with_dimension(16);

        let result = IndexBuilder::new(&settings, &encoder).build(Vec::new(), false);
        assert!(matches!(result, Err(RecommendError::EmptyCatalog)));
    }
}
