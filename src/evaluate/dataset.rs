//! Loading labeled and unlabeled query datasets from CSV.
//!
//! Labeled data arrives as one row per (query, relevant URL) pair. Rows
//! sharing a query text are grouped into one [`LabeledQuery`] whose
//! relevant set is the union of their URLs, preserving first-appearance
//! order for both queries and URLs.

use crate::error::{RecommendError, RecommendResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A query grouped with every URL labeled relevant for it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledQuery {
    pub query: String,
    /// Unique, in first-labeled order
    pub relevant_urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LabeledRow {
    #[serde(rename = "Query", default)]
    query: String,
    #[serde(rename = "Assessment_url", default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct UnlabeledRow {
    #[serde(rename = "Query", default)]
    query: String,
}

/// Spreadsheet exports render missing cells as empty or literal "nan".
fn is_blank(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Load and group labeled queries from a CSV with columns
/// `Query,Assessment_url`.
///
/// Rows with a blank query or URL are skipped.
pub fn load_labeled_queries(path: &Path) -> RecommendResult<Vec<LabeledQuery>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| RecommendError::DatasetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();

    for row in reader.deserialize::<LabeledRow>() {
        let row = row.map_err(|e| RecommendError::DatasetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if is_blank(&row.query) || is_blank(&row.url) {
            continue;
        }
        let query = row.query.trim().to_string();
        let url = row.url.trim().to_string();

        let urls = grouped.entry(query.clone()).or_insert_with(|| {
            order.push(query.clone());
            Vec::new()
        });
        if !urls.contains(&url) {
            urls.push(url);
        }
    }

    Ok(order
        .into_iter()
        .map(|query| {
            let relevant_urls = grouped.remove(&query).unwrap_or_default();
            LabeledQuery {
                query,
                relevant_urls,
            }
        })
        .collect())
}

/// Load unlabeled queries from a CSV with a `Query` column.
///
/// Blank rows are skipped; duplicates are kept as-is since the submission
/// artifact mirrors the input rows.
pub fn load_unlabeled_queries(path: &Path) -> RecommendResult<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| RecommendError::DatasetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut queries = Vec::new();
    for row in reader.deserialize::<UnlabeledRow>() {
        let row = row.map_err(|e| RecommendError::DatasetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if is_blank(&row.query) {
            continue;
        }
        queries.push(row.query.trim().to_string());
    }

    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_labeled_rows_group_by_query() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labeled.csv");
        let csv_content = "\
Query,Assessment_url
Hiring for a Python developer,https://example.com/coding
Need a data analyst,https://example.com/numerical
Hiring for a Python developer,https://example.com/verbal
";
        fs::write(&path, csv_content).unwrap();

        let queries = load_labeled_queries(&path).unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].query, "Hiring for a Python developer");
        assert_eq!(
            queries[0].relevant_urls,
            vec![
                "https://example.com/coding".to_string(),
                "https://example.com/verbal".to_string()
            ]
        );
        assert_eq!(queries[1].relevant_urls.len(), 1);
    }

    #[test]
    fn test_labeled_rows_union_skips_repeats() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labeled.csv");
        let csv_content = "\
Query,Assessment_url
Same query,https://example.com/a
Same query,https://example.com/a
Same query,https://example.com/b
";
        fs::write(&path, csv_content).unwrap();

        let queries = load_labeled_queries(&path).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].relevant_urls.len(), 2);
    }

    #[test]
    fn test_blank_and_nan_rows_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labeled.csv");
        let csv_content = "\
Query,Assessment_url
,https://example.com/a
Valid query,
nan,https://example.com/b
Valid query,https://example.com/kept
Other query,nan
";
        fs::write(&path, csv_content).unwrap();

        let queries = load_labeled_queries(&path).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].query, "Valid query");
        assert_eq!(queries[0].relevant_urls, vec!["https://example.com/kept".to_string()]);
    }

    #[test]
    fn test_unlabeled_queries_keep_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("unlabeled.csv");
        let csv_content = "\
Query
Hiring a project manager with leadership skills

Need a financial analyst with numerical reasoning
";
        fs::write(&path, csv_content).unwrap();

        let queries = load_unlabeled_queries(&path).unwrap();
        assert_eq!(
            queries,
            vec![
                "Hiring a project manager with leadership skills".to_string(),
                "Need a financial analyst with numerical reasoning".to_string()
            ]
        );
    }

    #[test]
    fn test_missing_file_is_dataset_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_labeled_queries(&temp_dir.path().join("nope.csv"));
        assert!(matches!(result, Err(RecommendError::DatasetLoad { .. })));
    }
}
