//! Evaluation and submission flows against real CSV files on disk.
//!
//! Uses catalogs small enough that every URL lands in the top 10, which
//! pins recall values without depending on encoder quality.

use crate::common::{build_recommender, record};
use anyhow::{Context, Result};
use aptrank::Evaluator;
use aptrank::catalog::AssessmentCategory::{Knowledge, Personality};
use aptrank::catalog::AssessmentRecord;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn small_catalog() -> Vec<AssessmentRecord> {
    vec![
        record("Alpha", "https://example.com/a", "Numerical reasoning drills", Knowledge),
        record("Beta", "https://example.com/b", "Verbal comprehension items", Knowledge),
        record("Gamma", "https://example.com/c", "Leadership judgment scenarios", Personality),
        record("Delta", "https://example.com/d", "Coding exercises in Python", Knowledge),
        record("Epsilon", "https://example.com/e", "Customer empathy inventory", Personality),
        record("Zeta", "https://example.com/f", "Spreadsheet accuracy checks", Knowledge),
    ]
}

fn write_dataset(root: &Path, file_name: &str, content: &str) -> Result<()> {
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir)?;
    fs::write(data_dir.join(file_name), content)?;
    Ok(())
}

#[test]
fn test_evaluation_writes_report_with_expected_rows() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_dataset(
        temp_dir.path(),
        "labeled_queries.csv",
        "\
Query,Assessment_url
Need numerical reasoning coverage,https://example.com/a
Need numerical reasoning coverage,https://example.com/b
Screening for leadership potential,https://example.com/c
",
    )?;

    let recommender = build_recommender(temp_dir.path(), small_catalog());
    let outcome = Evaluator::new(&recommender).run_evaluation()?;

    assert_eq!(outcome.summary.per_query.len(), 2);
    assert_eq!(outcome.summary.mean_recall, 1.0);
    assert_eq!(outcome.summary.per_query[0].relevant_count, 2);

    let report_path = outcome.report_path.context("report should be written")?;
    assert_eq!(report_path, temp_dir.path().join("reports/evaluation.csv"));

    let content = fs::read_to_string(&report_path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "query,recall_at_10,num_relevant,num_retrieved");
    assert_eq!(lines[1], "Need numerical reasoning coverage,1.0,2,2");
    assert_eq!(lines[2], "Screening for leadership potential,1.0,1,1");
    Ok(())
}

#[test]
fn test_relevant_urls_outside_catalog_score_zero() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_dataset(
        temp_dir.path(),
        "labeled_queries.csv",
        "\
Query,Assessment_url
Hiring for an unrelated role,https://example.com/not-in-catalog
",
    )?;

    let recommender = build_recommender(temp_dir.path(), small_catalog());
    let outcome = Evaluator::new(&recommender).run_evaluation()?;

    assert_eq!(outcome.summary.mean_recall, 0.0);
    assert_eq!(outcome.summary.per_query[0].recall, 0.0);
    assert_eq!(outcome.summary.per_query[0].retrieved_count, 0);
    Ok(())
}

#[test]
fn test_missing_labeled_dataset_is_skipped() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let recommender = build_recommender(temp_dir.path(), small_catalog());

    let outcome = Evaluator::new(&recommender).run_evaluation()?;

    assert!(outcome.report_path.is_none());
    assert!(outcome.summary.per_query.is_empty());
    assert!(!temp_dir.path().join("reports/evaluation.csv").exists());
    Ok(())
}

#[test]
fn test_submission_rows_cover_every_unlabeled_query() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_dataset(
        temp_dir.path(),
        "unlabeled_queries.csv",
        "\
Query
Hiring a coding specialist
Looking for a people-focused manager
",
    )?;

    let recommender = build_recommender(temp_dir.path(), small_catalog());
    let outcome = Evaluator::new(&recommender)
        .run_submission()?
        .context("unlabeled dataset exists")?;

    assert_eq!(outcome.query_count, 2);
    // Six unique URLs per query with this catalog
    assert_eq!(outcome.row_count, 12);
    assert_eq!(
        outcome.submission_path,
        temp_dir.path().join("reports/submission.csv")
    );

    let content = fs::read_to_string(&outcome.submission_path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 13);
    assert_eq!(lines[0], "Query,Assessment_url");
    assert!(lines[1].starts_with("Hiring a coding specialist,"));

    let first_query_rows = lines[1..]
        .iter()
        .filter(|line| line.starts_with("Hiring a coding specialist,"))
        .count();
    assert_eq!(first_query_rows, 6);
    Ok(())
}

#[test]
fn test_missing_unlabeled_dataset_returns_none() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let recommender = build_recommender(temp_dir.path(), small_catalog());

    let outcome = Evaluator::new(&recommender).run_submission()?;

    assert!(outcome.is_none());
    assert!(!temp_dir.path().join("reports/submission.csv").exists());
    Ok(())
}
