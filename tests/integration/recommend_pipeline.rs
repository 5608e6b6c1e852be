//! End-to-end retrieval: build an artifact set on disk, load it back
//! through a fresh engine, and verify the result-shaping policy.

use crate::common::{HashEncoder, build_recommender, record, test_settings};
use aptrank::catalog::builtin_catalog;
use aptrank::catalog::AssessmentCategory::{Knowledge, Personality};
use aptrank::index::{VECTORS_FILE, artifact_set_exists};
use aptrank::{MAX_RESULTS, MIN_RESULTS, RecommendError, Recommender, TextEncoder};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_build_then_fresh_engine_returns_identical_results() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let query = "Looking for a software engineer with problem-solving abilities";

    let first = build_recommender(temp_dir.path(), builtin_catalog());
    let initial = first.recommend(query).expect("recommend should succeed");
    assert!(!initial.is_empty());

    // A second engine over the same workspace reads the published artifacts
    let settings = test_settings(temp_dir.path());
    let encoder: Arc<dyn TextEncoder> = Arc::new(HashEncoder::new());
    let second = Recommender::new(settings, encoder);
    let reloaded = second.recommend(query).expect("reload should succeed");

    assert_eq!(initial, reloaded);
}

#[test]
fn test_results_are_capped_deduplicated_and_ranked() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let recommender = build_recommender(temp_dir.path(), builtin_catalog());

    let results = recommender
        .recommend("Hiring for a Python developer with strong communication skills")
        .expect("recommend should succeed");

    // 20 distinct URLs in the catalog, so the cap is what limits us
    assert_eq!(results.len(), MAX_RESULTS);

    let urls: HashSet<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls.len(), results.len(), "URLs must be unique");

    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.rank, i + 1, "ranks are 1-based and contiguous");
    }
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score, "scores must descend");
    }
}

#[test]
fn test_duplicate_urls_collapse_in_results() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    // Seven assessments, each listed twice under the same URL. The raw
    // top-10 ranking holds five identical pairs, so deduplication leaves
    // exactly the minimum result count.
    let mut records = Vec::new();
    for i in 0..7 {
        let name = format!("Assessment {i}");
        let url = format!("https://example.com/assessment-{i}");
        let description = format!("Skill area number {i}");
        records.push(record(&name, &url, &description, Knowledge));
        records.push(record(&name, &url, &description, Knowledge));
    }

    let recommender = build_recommender(temp_dir.path(), records);
    let results = recommender
        .recommend("general skill screening")
        .expect("recommend should succeed");

    assert_eq!(results.len(), MIN_RESULTS);
    let urls: HashSet<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls.len(), results.len());
}

#[test]
fn test_catalog_smaller_than_minimum_returns_everything() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records = vec![
        record("Alpha", "https://example.com/a", "Numerical reasoning drills", Knowledge),
        record("Beta", "https://example.com/b", "Verbal comprehension items", Knowledge),
        record("Gamma", "https://example.com/c", "Workplace judgment scenarios", Personality),
    ];

    let recommender = build_recommender(temp_dir.path(), records);
    let results = recommender
        .recommend("short screening battery")
        .expect("recommend should succeed");

    assert_eq!(results.len(), 3);
}

#[test]
fn test_exact_description_match_ranks_first() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let records = vec![
        record(
            "Python Coding Challenge",
            "https://example.com/python",
            "Hands-on Python programming exercises",
            Knowledge,
        ),
        record(
            "Spreadsheet Accuracy Check",
            "https://example.com/spreadsheet",
            "Cell auditing under time limits",
            Knowledge,
        ),
        record(
            "Conflict Handling Styles",
            "https://example.com/conflict",
            "Disagreement navigation questionnaire",
            Personality,
        ),
        record(
            "Warehouse Safety Quiz",
            "https://example.com/warehouse",
            "Forklift rules and signage recall",
            Knowledge,
        ),
        record(
            "Customer Empathy Survey",
            "https://example.com/empathy",
            "Listening tone preference inventory",
            Personality,
        ),
    ];

    let recommender = build_recommender(temp_dir.path(), records);
    let results = recommender
        .recommend("Hands-on Python programming exercises")
        .expect("recommend should succeed");

    assert_eq!(results[0].url, "https://example.com/python");
    assert!(results[0].score > results[1].score);
}

#[test]
fn test_blank_query_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let recommender = build_recommender(temp_dir.path(), builtin_catalog());

    assert!(matches!(
        recommender.recommend("   "),
        Err(RecommendError::InvalidQuery)
    ));
}

#[test]
fn test_query_without_index_reports_missing_artifact() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = test_settings(temp_dir.path());
    let encoder: Arc<dyn TextEncoder> = Arc::new(HashEncoder::new());
    let recommender = Recommender::new(settings, encoder);

    assert!(matches!(
        recommender.recommend("anything"),
        Err(RecommendError::MissingArtifact { .. })
    ));
}

#[test]
fn test_ensure_ready_builds_from_catalog_fallback() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let settings = test_settings(temp_dir.path());
    let encoder: Arc<dyn TextEncoder> = Arc::new(HashEncoder::new());
    let recommender = Recommender::new(Arc::clone(&settings), encoder);

    assert!(!artifact_set_exists(&settings.index_dir()));

    let snapshot = recommender.ensure_ready().expect("should build the index");
    assert_eq!(snapshot.len(), 20);
    assert!(artifact_set_exists(&settings.index_dir()));

    let results = recommender
        .recommend("Hiring a project manager with leadership skills")
        .expect("recommend should succeed after build");
    assert_eq!(results.len(), MAX_RESULTS);
}

#[test]
fn test_tampered_vectors_file_is_reported_not_panicked() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let recommender = build_recommender(temp_dir.path(), builtin_catalog());
    drop(recommender);

    let settings = test_settings(temp_dir.path());
    let vectors_path = settings.index_dir().join(VECTORS_FILE);
    let mut bytes = fs::read(&vectors_path).expect("vectors file should exist");
    bytes[0] = b'X';
    fs::write(&vectors_path, bytes).expect("Failed to rewrite vectors file");

    let encoder: Arc<dyn TextEncoder> = Arc::new(HashEncoder::new());
    let fresh = Recommender::new(settings, encoder);
    assert!(matches!(
        fresh.recommend("anything"),
        Err(RecommendError::CorruptArtifact { .. })
    ));
}

#[test]
fn test_truncated_vectors_file_is_reported_not_panicked() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let recommender = build_recommender(temp_dir.path(), builtin_catalog());
    drop(recommender);

    let settings = test_settings(temp_dir.path());
    let vectors_path = settings.index_dir().join(VECTORS_FILE);
    let bytes = fs::read(&vectors_path).expect("vectors file should exist");
    fs::write(&vectors_path, &bytes[..bytes.len() / 2]).expect("Failed to truncate");

    let encoder: Arc<dyn TextEncoder> = Arc::new(HashEncoder::new());
    let fresh = Recommender::new(settings, encoder);
    assert!(matches!(
        fresh.recommend("anything"),
        Err(RecommendError::CorruptArtifact { .. })
    ));
}
