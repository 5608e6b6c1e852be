//! Query-time retrieval: encode a query, rank the catalog, shape results.
//!
//! [`Recommender`] is the long-lived engine object. It owns the encoder
//! and a shared snapshot of the current index, and hands out ranked,
//! URL-unique recommendations. Snapshot swaps happen behind an `RwLock`
//! holding an `Arc`, so queries in flight keep the snapshot they started
//! with and never observe a half-replaced index.

use crate::catalog::{load_catalog, AssessmentCategory, AssessmentRecord};
use crate::config::Settings;
use crate::encoder::TextEncoder;
use crate::error::{RecommendError, RecommendResult};
use crate::index::{IndexBuilder, Snapshot};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Fewest results a query returns when enough distinct URLs exist.
pub const MIN_RESULTS: usize = 5;

/// Most results a query ever returns.
pub const MAX_RESULTS: usize = 10;

/// One recommended assessment, ready for display or serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// 1-based rank in the result list
    pub rank: usize,
    pub name: String,
    pub url: String,
    pub description: String,
    #[serde(rename = "type")]
    pub category: AssessmentCategory,
    /// Cosine similarity between the query and the record
    pub score: f32,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>2}. {} ({:.4}) <{}>",
            self.rank, self.name, self.score, self.url
        )
    }
}

/// A raw ranked hit before URL deduplication.
///
/// Evaluation scores per-position rankings, so unlike [`Recommendation`]
/// these may repeat URLs when the underlying catalog does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    /// Row in the vector matrix and catalog
    pub position: usize,
    pub score: f32,
    pub name: String,
    pub url: String,
}

/// The retrieval engine: encoder plus the current index snapshot.
pub struct Recommender {
    settings: Arc<Settings>,
    encoder: Arc<dyn TextEncoder>,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl Recommender {
    pub fn new(settings: Arc<Settings>, encoder: Arc<dyn TextEncoder>) -> Self {
        Self {
            settings,
            encoder,
            snapshot: RwLock::new(None),
        }
    }

    /// Get the current snapshot, loading it from disk on first use.
    ///
    /// Fails with [`RecommendError::MissingArtifact`] when no index has
    /// been built; queries never trigger a build on their own.
    pub fn snapshot(&self) -> RecommendResult<Arc<Snapshot>> {
        if let Some(snapshot) = self.snapshot.read().clone() {
            return Ok(snapshot);
        }
        self.load_from_disk()
    }

    fn load_from_disk(&self) -> RecommendResult<Arc<Snapshot>> {
        let mut guard = self.snapshot.write();
        // Another caller may have loaded while we waited for the lock
        if let Some(snapshot) = guard.clone() {
            return Ok(snapshot);
        }
        debug_print!(
            self,
            "Loading snapshot from {}",
            self.settings.index_dir().display()
        );
        let loaded = Arc::new(Snapshot::load(&self.settings.index_dir())?);
        *guard = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Make the engine ready to serve queries, building the index from the
    /// configured catalog if no artifacts exist yet.
    pub fn ensure_ready(&self) -> RecommendResult<Arc<Snapshot>> {
        match self.snapshot() {
            Ok(snapshot) => Ok(snapshot),
            Err(RecommendError::MissingArtifact { .. }) => {
                let (records, origin) = load_catalog(&self.settings)?;
                tracing::info!("No index artifacts found, building from {origin}");
                IndexBuilder::new(&self.settings, self.encoder.as_ref()).build(records, false)?;
                self.reload()
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the in-memory snapshot with whatever is on disk.
    ///
    /// Call after an external build; queries already holding the previous
    /// snapshot finish against it.
    pub fn reload(&self) -> RecommendResult<Arc<Snapshot>> {
        let loaded = Arc::new(Snapshot::load(&self.settings.index_dir())?);
        *self.snapshot.write() = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Recommend assessments for a free-text query.
    ///
    /// Returns up to [`MAX_RESULTS`] results in descending similarity
    /// order, deduplicated by URL with first-seen rank winning. When URL
    /// duplication in the catalog leaves fewer than [`MIN_RESULTS`], a
    /// second pass re-admits the skipped positions in rank order. With a
    /// URL-unique catalog that pass never runs.
    pub fn recommend(&self, query: &str) -> RecommendResult<Vec<Recommendation>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(RecommendError::InvalidQuery);
        }

        let snapshot = self.snapshot()?;
        let query_vector = self.encoder.encode(trimmed)?;
        let k = MAX_RESULTS.min(snapshot.len());
        let hits = snapshot
            .index
            .search(&query_vector, k)
            .map_err(|e| RecommendError::CorruptArtifact {
                reason: e.to_string(),
            })?;

        let mut seen_urls: HashSet<&str> = HashSet::new();
        let mut included: HashSet<usize> = HashSet::new();
        let mut results: Vec<Recommendation> = Vec::new();

        for hit in &hits {
            let Some(record) = snapshot.catalog.get(hit.position) else {
                continue;
            };
            if seen_urls.insert(record.url.as_str()) {
                included.insert(hit.position);
                results.push(to_recommendation(results.len() + 1, record, hit.score));
                if results.len() >= MAX_RESULTS {
                    break;
                }
            }
        }

        if results.len() < MIN_RESULTS && hits.len() >= MIN_RESULTS {
            for hit in &hits {
                if included.contains(&hit.position) {
                    continue;
                }
                let Some(record) = snapshot.catalog.get(hit.position) else {
                    continue;
                };
                results.push(to_recommendation(results.len() + 1, record, hit.score));
                if results.len() >= MIN_RESULTS {
                    break;
                }
            }
        }

        Ok(results)
    }

    /// Rank the catalog for a query without URL deduplication.
    ///
    /// Returns at most `k` per-position candidates in descending
    /// similarity order. This is the ranking that evaluation scores.
    pub fn ranked_candidates(&self, query: &str, k: usize) -> RecommendResult<Vec<RankedCandidate>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(RecommendError::InvalidQuery);
        }

        let snapshot = self.snapshot()?;
        let query_vector = self.encoder.encode(trimmed)?;
        let k = k.min(snapshot.len());
        let hits = snapshot
            .index
            .search(&query_vector, k)
            .map_err(|e| RecommendError::CorruptArtifact {
                reason: e.to_string(),
            })?;

        Ok(hits
            .iter()
            .filter_map(|hit| {
                snapshot.catalog.get(hit.position).map(|record| RankedCandidate {
                    position: hit.position,
                    score: hit.score,
                    name: record.name.clone(),
                    url: record.url.clone(),
                })
            })
            .collect())
    }

    /// Settings this engine was constructed with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

fn to_recommendation(rank: usize, record: &AssessmentRecord, score: f32) -> Recommendation {
    Recommendation {
        rank,
        name: record.name.clone(),
        url: record.url.clone(),
        description: record.description.clone(),
        category: record.category,
        score,
    }
}
