//! Shared helpers for integration tests.
//!
//! The in-crate mock encoder is only compiled for unit tests, so
//! integration tests bring their own deterministic encoder and build
//! real artifact sets in isolated temporary workspaces.

use aptrank::catalog::{AssessmentCategory, AssessmentRecord};
use aptrank::encoder::l2_normalize;
use aptrank::{EncodeError, IndexBuilder, Recommender, Settings, TextEncoder};
use std::path::Path;
use std::sync::Arc;

/// Deterministic bag-of-words encoder.
///
/// Lowercased whitespace tokens are hashed into buckets and the counts
/// L2-normalized, so texts sharing words land near each other and
/// identical texts produce identical vectors. No model download needed.
pub struct HashEncoder {
    dimension: usize,
}

impl HashEncoder {
    /// Enough buckets that distinct small vocabularies rarely collide.
    pub fn new() -> Self {
        Self { dimension: 512 }
    }
}

impl Default for HashEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEncoder for HashEncoder {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let mut vector = vec![0.0f32; self.dimension];
            for token in text.to_lowercase().split_whitespace() {
                let bucket = fnv1a(token.as_bytes()) as usize % self.dimension;
                vector[bucket] += 1.0;
            }
            l2_normalize(&mut vector);
            embeddings.push(vector);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100_0000_01b3);
    }
    hash
}

/// Settings rooted at an isolated temp workspace so tests never touch
/// real project files.
pub fn test_settings(root: &Path) -> Arc<Settings> {
    let mut settings = Settings::default();
    settings.workspace_root = Some(root.to_path_buf());
    Arc::new(settings)
}

/// Build an index for `records` under `root` and return a recommender
/// that reads the published artifacts through the same encoder.
pub fn build_recommender(root: &Path, records: Vec<AssessmentRecord>) -> Recommender {
    let settings = test_settings(root);
    let encoder: Arc<dyn TextEncoder> = Arc::new(HashEncoder::new());
    IndexBuilder::new(&settings, encoder.as_ref())
        .build(records, false)
        .expect("index build should succeed");
    Recommender::new(settings, encoder)
}

pub fn record(
    name: &str,
    url: &str,
    description: &str,
    category: AssessmentCategory,
) -> AssessmentRecord {
    AssessmentRecord::new(name, url, description, category)
}
