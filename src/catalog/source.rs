//! Catalog acquisition: CSV loading with a built-in fallback list.
//!
//! Raw records enter the system from a CSV file with the columns
//! `name,url,description,type`. When the configured file does not exist,
//! a curated built-in catalog is used so the engine works out of the box.

use crate::catalog::{AssessmentCategory, AssessmentRecord};
use crate::config::Settings;
use crate::error::{RecommendError, RecommendResult};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where the loaded catalog came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Loaded from the configured CSV file
    File(PathBuf),
    /// Built-in fallback list
    Builtin,
}

impl std::fmt::Display for CatalogOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Builtin => write!(f, "built-in catalog"),
        }
    }
}

/// Raw CSV row before category parsing and validation.
#[derive(Debug, Deserialize)]
struct RawCatalogRow {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "type")]
    category: String,
}

/// Load the catalog from the configured source.
///
/// Falls back to the built-in list when the configured CSV does not exist;
/// a file that exists but cannot be parsed is an error, not a fallback.
pub fn load_catalog(settings: &Settings) -> RecommendResult<(Vec<AssessmentRecord>, CatalogOrigin)> {
    let path = settings.resolve_path(&settings.catalog.path);

    if path.exists() {
        let records = load_catalog_csv(&path)?;
        tracing::debug!("Loaded {} catalog records from {}", records.len(), path.display());
        Ok((records, CatalogOrigin::File(path)))
    } else {
        tracing::debug!("Catalog file {} not found, using built-in catalog", path.display());
        Ok((builtin_catalog(), CatalogOrigin::Builtin))
    }
}

/// Load catalog records from a CSV file.
///
/// Rows with a blank name or URL are skipped. Rows are deduplicated by URL,
/// first occurrence wins, so downstream positions stay stable regardless of
/// how messy the exported catalog is.
pub fn load_catalog_csv(path: &Path) -> RecommendResult<Vec<AssessmentRecord>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| RecommendError::CatalogLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut seen_urls = HashSet::new();
    let mut records = Vec::new();

    for row in reader.deserialize::<RawCatalogRow>() {
        let row = row.map_err(|e| RecommendError::CatalogLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let name = row.name.trim();
        let url = row.url.trim();
        if name.is_empty() || url.is_empty() {
            continue;
        }
        if !seen_urls.insert(url.to_string()) {
            continue;
        }

        records.push(AssessmentRecord::new(
            name,
            url,
            row.description.trim(),
            AssessmentCategory::from_code(&row.category),
        ));
    }

    Ok(records)
}

/// Curated assessment list used when no catalog CSV is available.
pub fn builtin_catalog() -> Vec<AssessmentRecord> {
    const CATALOG_BASE: &str = "https://www.shl.com/solutions/products/product-catalog";
    use AssessmentCategory::{Knowledge, Personality};

    let entries: [(&str, &str, &str, AssessmentCategory); 20] = [
        (
            "SHL Verify G+ Cognitive Ability Test",
            "verify-g-plus",
            "Comprehensive cognitive ability assessment measuring verbal, numerical, and logical reasoning skills",
            Knowledge,
        ),
        (
            "SHL Verify Coding Test",
            "verify-coding",
            "Technical coding assessment for software developers covering multiple programming languages",
            Knowledge,
        ),
        (
            "SHL OPQ32 Personality Assessment",
            "opq32",
            "Comprehensive personality assessment measuring behavioral traits and work preferences",
            Personality,
        ),
        (
            "SHL Verify Numerical Reasoning Test",
            "verify-numerical",
            "Numerical reasoning assessment evaluating data interpretation and mathematical problem-solving",
            Knowledge,
        ),
        (
            "SHL Verify Verbal Reasoning Test",
            "verify-verbal",
            "Verbal reasoning assessment measuring comprehension, analysis, and critical thinking skills",
            Knowledge,
        ),
        (
            "SHL Verify Inductive Reasoning Test",
            "verify-inductive",
            "Inductive reasoning assessment evaluating pattern recognition and logical thinking",
            Knowledge,
        ),
        (
            "SHL MQ Emotional Intelligence Assessment",
            "mq",
            "Emotional intelligence assessment measuring self-awareness, empathy, and social skills",
            Personality,
        ),
        (
            "SHL Verify Mechanical Comprehension Test",
            "verify-mechanical",
            "Mechanical comprehension assessment for engineering and technical roles",
            Knowledge,
        ),
        (
            "SHL Verify Abstract Reasoning Test",
            "verify-abstract",
            "Abstract reasoning assessment measuring fluid intelligence and problem-solving ability",
            Knowledge,
        ),
        (
            "SHL Situational Judgment Test",
            "situational-judgment",
            "Situational judgment assessment evaluating decision-making in work-related scenarios",
            Personality,
        ),
        (
            "SHL Verify Deductive Reasoning Test",
            "verify-deductive",
            "Deductive reasoning assessment measuring logical analysis and critical thinking",
            Knowledge,
        ),
        (
            "SHL Verify Diagrammatic Reasoning Test",
            "verify-diagrammatic",
            "Diagrammatic reasoning assessment evaluating visual problem-solving and pattern recognition",
            Knowledge,
        ),
        (
            "SHL Verify Calculation Test",
            "verify-calculation",
            "Calculation assessment measuring basic mathematical operations and numerical accuracy",
            Knowledge,
        ),
        (
            "SHL Verify Comprehension Test",
            "verify-comprehension",
            "Reading comprehension assessment measuring understanding and interpretation of written information",
            Knowledge,
        ),
        (
            "SHL Motivation Questionnaire",
            "motivation-questionnaire",
            "Motivation assessment measuring work values, interests, and career drivers",
            Personality,
        ),
        (
            "SHL Verify Error Checking Test",
            "verify-error-checking",
            "Error checking assessment measuring attention to detail and accuracy",
            Knowledge,
        ),
        (
            "SHL Verify Spatial Reasoning Test",
            "verify-spatial",
            "Spatial reasoning assessment evaluating 3D visualization and mental rotation abilities",
            Knowledge,
        ),
        (
            "SHL Learning Agility Assessment",
            "learning-agility",
            "Learning agility assessment measuring adaptability and ability to learn from experience",
            Personality,
        ),
        (
            "SHL Verify Critical Thinking Test",
            "verify-critical-thinking",
            "Critical thinking assessment evaluating analysis, evaluation, and reasoning skills",
            Knowledge,
        ),
        (
            "SHL Leadership Assessment",
            "leadership-assessment",
            "Leadership assessment measuring leadership potential, style, and effectiveness",
            Personality,
        ),
    ];

    entries
        .into_iter()
        .map(|(name, slug, description, category)| {
            AssessmentRecord::new(
                name,
                format!("{CATALOG_BASE}/{slug}/"),
                description,
                category,
            )
        })
        .collect()
}
