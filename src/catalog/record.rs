//! Assessment record types shared by the catalog, index, and retriever.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of assessment a catalog record describes.
///
/// Serialized with the raw catalog codes so CSV rows and persisted JSON
/// round-trip without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssessmentCategory {
    /// Technical and knowledge tests
    #[serde(rename = "K")]
    Knowledge,
    /// Personality and behavioral questionnaires
    #[serde(rename = "P")]
    Personality,
}

impl AssessmentCategory {
    /// Parse a raw catalog code. `K` is knowledge; everything else is
    /// treated as personality, matching how dirty catalog rows are classified
    /// upstream.
    pub fn from_code(code: &str) -> Self {
        if code.trim() == "K" {
            Self::Knowledge
        } else {
            Self::Personality
        }
    }

    /// Raw single-letter code used in catalog CSVs.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Knowledge => "K",
            Self::Personality => "P",
        }
    }

    /// Human-readable label injected into the embedding text.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Knowledge => "Technical/Knowledge Assessment",
            Self::Personality => "Personality/Behavioral Assessment",
        }
    }
}

impl fmt::Display for AssessmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single catalog entry.
///
/// The URL is the identity key: it deduplicates retrieval results and is what
/// ground-truth rows match against during evaluation. A record's position in
/// the catalog store must always equal its vector's position in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub name: String,
    pub url: String,
    pub description: String,
    #[serde(rename = "type")]
    pub category: AssessmentCategory,
}

impl AssessmentRecord {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
        category: AssessmentCategory,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            description: description.into(),
            category,
        }
    }

    /// Composite text used to embed this record.
    ///
    /// The category label is appended so categorical signal reaches a purely
    /// textual embedding space.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        format!(
            "{}. {} Type: {}",
            self.name,
            self.description,
            self.category.label()
        )
    }
}

impl fmt::Display for AssessmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.url)
    }
}
