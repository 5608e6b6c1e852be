//! Recall@10 evaluation and submission generation.
//!
//! The evaluator scores the retrieval engine against labeled queries
//! (Recall@10 per query, mean over the set) and turns unlabeled queries
//! into submission rows. Both flows read their inputs and write their
//! artifacts at the paths configured under `[evaluation]`.

pub mod dataset;
pub mod recall;
pub mod report;

pub use dataset::{load_labeled_queries, load_unlabeled_queries, LabeledQuery};
pub use recall::{intersection_count, recall_at_k};
pub use report::{write_report, write_submission};

use crate::error::RecommendResult;
use crate::retrieve::Recommender;
use serde::Serialize;
use std::path::PathBuf;

/// Default ranking depth that recall is measured over.
pub const RECALL_K: usize = 10;

/// Recall figures for a single labeled query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecall {
    pub query: String,
    /// Recall at the evaluated depth, in `[0, 1]`.
    pub recall: f64,
    /// Number of ground-truth URLs for this query.
    pub relevant_count: usize,
    /// Number of ground-truth URLs found in the top ranking.
    pub retrieved_count: usize,
}

/// Evaluation results over a labeled query set.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    /// Mean recall over all queries, 0.0 when the set is empty.
    pub mean_recall: f64,
    /// Ranking depth the recall was measured over.
    pub k: usize,
    pub per_query: Vec<QueryRecall>,
}

/// One (query, recommended URL) pair of the submission file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRow {
    #[serde(rename = "Query")]
    pub query: String,
    #[serde(rename = "Assessment_url")]
    pub url: String,
}

/// What `run_evaluation` produced.
#[derive(Debug)]
pub struct EvaluationOutcome {
    pub summary: EvaluationSummary,
    /// Where the report was written. `None` when evaluation was skipped
    /// because the labeled dataset is missing.
    pub report_path: Option<PathBuf>,
}

/// What `run_submission` produced.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub submission_path: PathBuf,
    pub query_count: usize,
    pub row_count: usize,
}

/// Scores retrieval quality and generates submissions.
pub struct Evaluator<'a> {
    recommender: &'a Recommender,
    k: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(recommender: &'a Recommender) -> Self {
        Self {
            recommender,
            k: RECALL_K,
        }
    }

    /// Measure recall at a depth other than the default [`RECALL_K`].
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Compute recall for each labeled query and the mean over the set.
    ///
    /// Recall is measured over the raw top-k ranking. The result-count
    /// policy and URL dedup of `recommend` do not apply here.
    pub fn evaluate(&self, queries: &[LabeledQuery]) -> RecommendResult<EvaluationSummary> {
        let mut per_query = Vec::with_capacity(queries.len());

        for labeled in queries {
            let candidates = self.recommender.ranked_candidates(&labeled.query, self.k)?;
            let predicted: Vec<String> = candidates.into_iter().map(|c| c.url).collect();

            per_query.push(QueryRecall {
                query: labeled.query.clone(),
                recall: recall_at_k(&predicted, &labeled.relevant_urls),
                relevant_count: labeled.relevant_urls.len(),
                retrieved_count: intersection_count(&predicted, &labeled.relevant_urls),
            });
        }

        let mean_recall = if per_query.is_empty() {
            0.0
        } else {
            per_query.iter().map(|q| q.recall).sum::<f64>() / per_query.len() as f64
        };

        Ok(EvaluationSummary {
            mean_recall,
            k: self.k,
            per_query,
        })
    }

    /// Produce submission rows for unlabeled queries.
    ///
    /// Each query contributes the full `recommend` output, one row per
    /// recommended URL, in rank order.
    pub fn generate_predictions(&self, queries: &[String]) -> RecommendResult<Vec<SubmissionRow>> {
        let mut rows = Vec::new();

        for query in queries {
            let recommendations = self.recommender.recommend(query)?;
            for recommendation in recommendations {
                rows.push(SubmissionRow {
                    query: query.clone(),
                    url: recommendation.url,
                });
            }
        }

        Ok(rows)
    }

    /// Evaluate against the configured labeled dataset and write the report.
    ///
    /// A missing labeled file is not an error: evaluation is skipped with a
    /// warning and an empty summary comes back.
    pub fn run_evaluation(&self) -> RecommendResult<EvaluationOutcome> {
        let settings = self.recommender.settings();
        let labeled_path = settings.resolve_path(&settings.evaluation.labeled_path);

        if !labeled_path.exists() {
            tracing::warn!(
                "Labeled queries not found at {}, skipping evaluation",
                labeled_path.display()
            );
            return Ok(EvaluationOutcome {
                summary: EvaluationSummary {
                    mean_recall: 0.0,
                    k: self.k,
                    per_query: Vec::new(),
                },
                report_path: None,
            });
        }

        let queries = load_labeled_queries(&labeled_path)?;
        self.recommender.ensure_ready()?;
        let summary = self.evaluate(&queries)?;

        let report_path = settings.resolve_path(&settings.evaluation.report_path);
        write_report(&report_path, &summary)?;
        tracing::info!(
            "Mean Recall@{} over {} queries: {:.4}",
            summary.k,
            summary.per_query.len(),
            summary.mean_recall
        );

        Ok(EvaluationOutcome {
            summary,
            report_path: Some(report_path),
        })
    }

    /// Generate predictions for the configured unlabeled dataset and write
    /// the submission file. Returns `None` when the dataset is missing.
    pub fn run_submission(&self) -> RecommendResult<Option<SubmissionOutcome>> {
        let settings = self.recommender.settings();
        let unlabeled_path = settings.resolve_path(&settings.evaluation.unlabeled_path);

        if !unlabeled_path.exists() {
            tracing::warn!(
                "Unlabeled queries not found at {}, skipping submission",
                unlabeled_path.display()
            );
            return Ok(None);
        }

        let queries = load_unlabeled_queries(&unlabeled_path)?;
        self.recommender.ensure_ready()?;
        let rows = self.generate_predictions(&queries)?;

        let submission_path = settings.resolve_path(&settings.evaluation.submission_path);
        write_submission(&submission_path, &rows)?;
        tracing::info!(
            "Wrote {} submission rows for {} queries",
            rows.len(),
            queries.len()
        );

        Ok(Some(SubmissionOutcome {
            submission_path,
            query_count: queries.len(),
            row_count: rows.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AssessmentCategory, AssessmentRecord};
    use crate::config::Settings;
    use crate::encoder::{MockEncoder, TextEncoder};
    use crate::index::IndexBuilder;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_settings(root: &Path) -> Arc<Settings> {
        let mut settings = Settings::default();
        settings.workspace_root = Some(root.to_path_buf());
        Arc::new(settings)
    }

    fn recommender_with(root: &Path, records: Vec<AssessmentRecord>) -> Recommender {
        let settings = test_settings(root);
        let encoder: Arc<dyn TextEncoder> = Arc::new(MockEncoder::with_dimension(16));
        IndexBuilder::new(&settings, encoder.as_ref())
            .build(records, false)
            .unwrap();
        Recommender::new(settings, encoder)
    }

    fn record(name: &str, url: &str, description: &str) -> AssessmentRecord {
        AssessmentRecord::new(name, url, description, AssessmentCategory::Knowledge)
    }

    fn small_catalog() -> Vec<AssessmentRecord> {
        vec![
            record("Alpha", "https://example.com/a", "Coding assessment"),
            record("Beta", "https://example.com/b", "Coding exercise"),
            record("Gamma", "https://example.com/c", "Numerical reasoning"),
            record("Delta", "https://example.com/d", "Verbal reasoning"),
            record("Epsilon", "https://example.com/e", "Leadership judgment"),
            record("Zeta", "https://example.com/f", "General aptitude"),
        ]
    }

    #[test]
    fn test_recall_full_when_catalog_fits_in_ranking() {
        let temp_dir = TempDir::new().unwrap();
        let recommender = recommender_with(temp_dir.path(), small_catalog());
        let evaluator = Evaluator::new(&recommender);

        let queries = vec![LabeledQuery {
            query: "Hiring a coding developer".to_string(),
            relevant_urls: vec![
                "https://example.com/a".to_string(),
                "https://example.com/c".to_string(),
            ],
        }];

        let summary = evaluator.evaluate(&queries).unwrap();
        assert_eq!(summary.mean_recall, 1.0);
        assert_eq!(summary.per_query.len(), 1);
        assert_eq!(summary.per_query[0].relevant_count, 2);
        assert_eq!(summary.per_query[0].retrieved_count, 2);
    }

    #[test]
    fn test_recall_partial_when_relevant_falls_outside_top_ranking() {
        let temp_dir = TempDir::new().unwrap();

        // Eleven identical-scoring coding records push the numerical one to
        // position 12, outside the top 10 for a coding query.
        let mut records: Vec<AssessmentRecord> = (0..11)
            .map(|i| {
                record(
                    &format!("Coding {i}"),
                    &format!("https://example.com/coding-{i}"),
                    "Coding assessment",
                )
            })
            .collect();
        records.push(record(
            "Numerical",
            "https://example.com/numerical",
            "Numerical reasoning",
        ));

        let recommender = recommender_with(temp_dir.path(), records);
        let evaluator = Evaluator::new(&recommender);

        let queries = vec![LabeledQuery {
            query: "Hiring a coding developer".to_string(),
            relevant_urls: vec![
                "https://example.com/coding-0".to_string(),
                "https://example.com/numerical".to_string(),
            ],
        }];

        let summary = evaluator.evaluate(&queries).unwrap();
        assert_eq!(summary.per_query[0].recall, 0.5);
        assert_eq!(summary.per_query[0].retrieved_count, 1);
    }

    #[test]
    fn test_custom_depth_narrows_the_ranking() {
        let temp_dir = TempDir::new().unwrap();
        let recommender = recommender_with(temp_dir.path(), small_catalog());
        let evaluator = Evaluator::new(&recommender).with_k(1);

        let queries = vec![LabeledQuery {
            query: "Hiring a coding developer".to_string(),
            relevant_urls: vec![
                "https://example.com/a".to_string(),
                "https://example.com/c".to_string(),
            ],
        }];

        let summary = evaluator.evaluate(&queries).unwrap();
        assert_eq!(summary.k, 1);
        assert_eq!(summary.per_query[0].retrieved_count, 1);
        assert_eq!(summary.per_query[0].recall, 0.5);
    }

    #[test]
    fn test_mean_recall_over_queries() {
        let temp_dir = TempDir::new().unwrap();
        let recommender = recommender_with(temp_dir.path(), small_catalog());
        let evaluator = Evaluator::new(&recommender);

        let queries = vec![
            LabeledQuery {
                query: "Hiring a coding developer".to_string(),
                relevant_urls: vec!["https://example.com/a".to_string()],
            },
            LabeledQuery {
                query: "Need a data analyst".to_string(),
                relevant_urls: vec!["https://example.com/not-in-catalog".to_string()],
            },
        ];

        let summary = evaluator.evaluate(&queries).unwrap();
        assert_eq!(summary.per_query[0].recall, 1.0);
        assert_eq!(summary.per_query[1].recall, 0.0);
        assert_eq!(summary.mean_recall, 0.5);
    }

    #[test]
    fn test_empty_query_set_means_zero() {
        let temp_dir = TempDir::new().unwrap();
        let recommender = recommender_with(temp_dir.path(), small_catalog());
        let evaluator = Evaluator::new(&recommender);

        let summary = evaluator.evaluate(&[]).unwrap();
        assert_eq!(summary.mean_recall, 0.0);
        assert!(summary.per_query.is_empty());
    }

    #[test]
    fn test_generate_predictions_mirrors_recommend() {
        let temp_dir = TempDir::new().unwrap();
        let recommender = recommender_with(temp_dir.path(), small_catalog());
        let evaluator = Evaluator::new(&recommender);

        let query = "Hiring a coding developer".to_string();
        let rows = evaluator
            .generate_predictions(std::slice::from_ref(&query))
            .unwrap();
        let expected: Vec<String> = recommender
            .recommend(&query)
            .unwrap()
            .into_iter()
            .map(|r| r.url)
            .collect();

        let produced: Vec<String> = rows.iter().map(|r| r.url.clone()).collect();
        assert_eq!(produced, expected);
        assert!(rows.iter().all(|r| r.query == query));
    }

    #[test]
    fn test_run_evaluation_groups_rows_and_writes_report() {
        let temp_dir = TempDir::new().unwrap();
        let recommender = recommender_with(temp_dir.path(), small_catalog());
        let evaluator = Evaluator::new(&recommender);

        let data_dir = temp_dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(
            data_dir.join("labeled_queries.csv"),
            "Query,Assessment_url\n\
             Hiring a coding developer,https://example.com/a\n\
             Hiring a coding developer,https://example.com/b\n",
        )
        .unwrap();

        let outcome = evaluator.run_evaluation().unwrap();

        // Two rows for the same query collapse into one with the URL union
        assert_eq!(outcome.summary.per_query.len(), 1);
        assert_eq!(outcome.summary.per_query[0].relevant_count, 2);
        assert_eq!(outcome.summary.per_query[0].retrieved_count, 2);
        assert_eq!(outcome.summary.mean_recall, 1.0);

        let report_path = outcome.report_path.unwrap();
        assert_eq!(report_path, temp_dir.path().join("reports/evaluation.csv"));
        let content = std::fs::read_to_string(&report_path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("query,recall_at_10,num_relevant,num_retrieved")
        );
        assert_eq!(lines.next(), Some("Hiring a coding developer,1.0,2,2"));
    }

    #[test]
    fn test_run_evaluation_skips_when_labeled_dataset_missing() {
        let temp_dir = TempDir::new().unwrap();
        let recommender = recommender_with(temp_dir.path(), small_catalog());
        let evaluator = Evaluator::new(&recommender);

        let outcome = evaluator.run_evaluation().unwrap();

        assert!(outcome.report_path.is_none());
        assert_eq!(outcome.summary.mean_recall, 0.0);
        assert!(outcome.summary.per_query.is_empty());
        assert!(!temp_dir.path().join("reports/evaluation.csv").exists());
    }

    #[test]
    fn test_run_submission_writes_rows_for_each_query() {
        let temp_dir = TempDir::new().unwrap();
        let recommender = recommender_with(temp_dir.path(), small_catalog());
        let evaluator = Evaluator::new(&recommender);

        let data_dir = temp_dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(
            data_dir.join("unlabeled_queries.csv"),
            "Query\n\
             Hiring a coding developer\n\
             Need a numerical analyst\n",
        )
        .unwrap();

        let outcome = evaluator.run_submission().unwrap().unwrap();

        // Six unique catalog URLs means six rows per query
        assert_eq!(outcome.query_count, 2);
        assert_eq!(outcome.row_count, 12);
        assert_eq!(
            outcome.submission_path,
            temp_dir.path().join("reports/submission.csv")
        );

        let content = std::fs::read_to_string(&outcome.submission_path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Query,Assessment_url"));
        assert_eq!(lines.count(), 12);
    }

    #[test]
    fn test_run_submission_skips_when_unlabeled_dataset_missing() {
        let temp_dir = TempDir::new().unwrap();
        let recommender = recommender_with(temp_dir.path(), small_catalog());
        let evaluator = Evaluator::new(&recommender);

        assert!(evaluator.run_submission().unwrap().is_none());
        assert!(!temp_dir.path().join("reports/submission.csv").exists());
    }
}
