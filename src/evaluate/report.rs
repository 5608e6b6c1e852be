//! Evaluation artifact writers.
//!
//! Two CSV artifacts leave the evaluator: a per-query recall report and a
//! submission file of (query, recommended URL) rows. Both create their
//! parent directories on demand so `reports/` works out of the box.

use crate::error::{RecommendError, RecommendResult};
use crate::evaluate::{EvaluationSummary, SubmissionRow};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct ReportRow<'a> {
    query: &'a str,
    recall_at_10: f64,
    num_relevant: usize,
    num_retrieved: usize,
}

fn ensure_parent_dir(path: &Path) -> RecommendResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| RecommendError::Persistence {
                path: parent.to_path_buf(),
                source: Box::new(e),
            })?;
        }
    }
    Ok(())
}

/// Write the per-query recall report as CSV with columns
/// `query,recall_at_10,num_relevant,num_retrieved`.
///
/// The header row is written explicitly so an empty evaluation still
/// produces a well-formed file.
pub fn write_report(path: &Path, summary: &EvaluationSummary) -> RecommendResult<()> {
    ensure_parent_dir(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| RecommendError::Persistence {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    writer
        .write_record(["query", "recall_at_10", "num_relevant", "num_retrieved"])
        .map_err(|e| RecommendError::Persistence {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    for entry in &summary.per_query {
        writer
            .serialize(ReportRow {
                query: &entry.query,
                recall_at_10: entry.recall,
                num_relevant: entry.relevant_count,
                num_retrieved: entry.retrieved_count,
            })
            .map_err(|e| RecommendError::Persistence {
                path: path.to_path_buf(),
                source: Box::new(e),
            })?;
    }

    writer.flush().map_err(|e| RecommendError::Persistence {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

/// Write submission rows as CSV with columns `Query,Assessment_url`.
pub fn write_submission(path: &Path, rows: &[SubmissionRow]) -> RecommendResult<()> {
    ensure_parent_dir(path)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| RecommendError::Persistence {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    writer
        .write_record(["Query", "Assessment_url"])
        .map_err(|e| RecommendError::Persistence {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    for row in rows {
        writer.serialize(row).map_err(|e| RecommendError::Persistence {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
    }

    writer.flush().map_err(|e| RecommendError::Persistence {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}
