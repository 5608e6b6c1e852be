//! Text encoding for the recommendation engine.
//!
//! Catalog records and user queries are embedded into the same vector
//! space by a single [`TextEncoder`]. Every vector that leaves an encoder
//! is L2-normalized, so the inner product computed by the index is cosine
//! similarity.

pub mod fastembed;

pub use fastembed::FastEmbedEncoder;

use thiserror::Error;

/// Dimension of the embedding space.
///
/// All supported models produce 384-dimensional vectors, and the stored
/// artifact records this value so mismatched models are caught at load time.
pub const EMBEDDING_DIMENSION: usize = 384;

/// Errors that can occur during text encoding.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error(
        "Failed to initialize embedding model: {0}\nSuggestion: Ensure you have internet connection for first-time model download"
    )]
    ModelInit(String),

    #[error(
        "Unsupported embedding model: {0}\nSuggestion: Use one of AllMiniLML6V2, AllMiniLML12V2, BGESmallENV15"
    )]
    UnsupportedModel(String),

    #[error(
        "Embedding generation failed: {0}\nSuggestion: Verify the embedding model is properly initialized"
    )]
    EmbeddingFailed(String),

    #[error(
        "Embedding dimension mismatch: expected {expected}, got {actual}\nSuggestion: Rebuild the index with the same embedding model used for queries"
    )]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Trait for encoding text into embedding vectors.
///
/// Implementations must be thread-safe and return unit-normalized vectors
/// so that inner-product search ranks by cosine similarity.
pub trait TextEncoder: Send + Sync {
    /// Encode multiple texts, one vector per input text in order.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError>;

    /// Dimension of the vectors this encoder produces.
    #[must_use]
    fn dimension(&self) -> usize;

    /// Encode a single text.
    fn encode(&self, text: &str) -> Result<Vec<f32>, EncodeError> {
        let mut vectors = self.encode_batch(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| EncodeError::EmbeddingFailed("model returned no embedding".to_string()))
    }
}

/// Scale a vector to unit length in place.
///
/// A zero vector stays zero; it has no direction to preserve.
pub fn l2_normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

/// Mock encoder for testing.
///
/// Generates deterministic embeddings from text content so retrieval tests
/// run without downloading a model.
#[cfg(test)]
pub struct MockEncoder {
    dimension: usize,
}

#[cfg(test)]
impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl MockEncoder {
    /// Create a mock with the standard 384 dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dimension: EMBEDDING_DIMENSION,
        }
    }

    /// Create a mock with a custom dimension.
    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[cfg(test)]
impl TextEncoder for MockEncoder {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError> {
        let dim = self.dimension;
        let mut embeddings = Vec::new();

        for text in texts {
            let lower = text.to_lowercase();
            let mut embedding = vec![0.1; dim];

            // Boost dimensions for common assessment vocabulary so related
            // texts land near each other
            if (lower.contains("coding") || lower.contains("developer")) && dim > 1 {
                embedding[0] = 0.9;
                embedding[1] = 0.8;
            }
            if (lower.contains("numerical") || lower.contains("math")) && dim > 3 {
                embedding[2] = 0.85;
                embedding[3] = 0.75;
            }
            if (lower.contains("personality") || lower.contains("behavioral")) && dim > 5 {
                embedding[4] = 0.8;
                embedding[5] = 0.7;
            }
            if lower.contains("leadership") && dim > 7 {
                embedding[6] = 0.9;
                embedding[7] = 0.85;
            }

            l2_normalize(&mut embedding);
            embeddings.push(embedding);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize() {
        let mut vector = vec![3.0, 4.0];
        l2_normalize(&mut vector);
        assert!((vector[0] - 0.6).abs() < 1e-6);
        assert!((vector[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut vector = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut vector);
        assert_eq!(vector, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mock_encoder_produces_unit_vectors() {
        let encoder = MockEncoder::new();
        let texts = vec!["Hiring for a Python developer with strong communication skills".to_string()];
        let embeddings = encoder.encode_batch(&texts).unwrap();

        assert_eq!(embeddings.len(), 1);
        assert_eq!(embeddings[0].len(), EMBEDDING_DIMENSION);

        let magnitude: f32 = embeddings[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_mock_encoder_is_deterministic() {
        let encoder = MockEncoder::with_dimension(16);
        let texts = vec!["Need a data analyst who can work with SQL and Excel".to_string()];

        let first = encoder.encode_batch(&texts).unwrap();
        let second = encoder.encode_batch(&texts).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mock_encoder_ranks_related_texts_closer() {
        let encoder = MockEncoder::with_dimension(16);
        let query = encoder.encode("Looking for a coding assessment").unwrap();
        let related = encoder.encode("Technical coding test for developers").unwrap();
        let unrelated = encoder.encode("Leadership style questionnaire").unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[test]
    fn test_encode_single_matches_batch() {
        let encoder = MockEncoder::with_dimension(16);
        let text = "Hiring a project manager with leadership skills";

        let single = encoder.encode(text).unwrap();
        let batch = encoder.encode_batch(&[text.to_string()]).unwrap();
        assert_eq!(single, batch[0]);
    }
}
