//! FastEmbed implementation of the text encoder.

use crate::config::EmbeddingConfig;
use crate::encoder::{l2_normalize, EncodeError, TextEncoder, EMBEDDING_DIMENSION};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Mutex;

const DEFAULT_BATCH_SIZE: usize = 32;

/// FastEmbed encoder using the AllMiniLML6V2 model by default.
///
/// Produces 384-dimensional unit vectors. The underlying model requires
/// `&mut self` for inference, so it sits behind a mutex and batch size
/// controls how many texts go through per inference call.
pub struct FastEmbedEncoder {
    model: Mutex<TextEmbedding>,
    batch_size: usize,
}

impl FastEmbedEncoder {
    /// Create an encoder with the default model and batch size.
    ///
    /// # Errors
    /// Returns an error if the model fails to initialize or download.
    pub fn new() -> Result<Self, EncodeError> {
        Self::init(EmbeddingModel::AllMiniLML6V2, false, DEFAULT_BATCH_SIZE)
    }

    /// Create an encoder from the embedding configuration.
    ///
    /// # Errors
    /// Returns an error if the configured model name is not supported or
    /// the model fails to initialize or download.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, EncodeError> {
        let model = model_from_name(&config.model)?;
        Self::init(model, config.show_download_progress, config.batch_size)
    }

    fn init(
        model: EmbeddingModel,
        show_download_progress: bool,
        batch_size: usize,
    ) -> Result<Self, EncodeError> {
        let model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(crate::init::models_dir())
                .with_show_download_progress(show_download_progress),
        )
        .map_err(|e| EncodeError::ModelInit(e.to_string()))?;

        Ok(Self {
            model: Mutex::new(model),
            batch_size: batch_size.max(1),
        })
    }
}

/// Map a configured model name to a fastembed model.
///
/// Only 384-dimensional models are supported so stored artifacts stay
/// compatible with [`EMBEDDING_DIMENSION`].
fn model_from_name(name: &str) -> Result<EmbeddingModel, EncodeError> {
    match name {
        "AllMiniLML6V2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "AllMiniLML12V2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "BGESmallENV15" => Ok(EmbeddingModel::BGESmallENV15),
        other => Err(EncodeError::UnsupportedModel(other.to_string())),
    }
}

impl TextEncoder for FastEmbedEncoder {
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EncodeError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // fastembed expects owned strings for the embed method
        let text_strings: Vec<String> = texts.to_vec();

        let mut embeddings = self
            .model
            .lock()
            .map_err(|_| {
                EncodeError::EmbeddingFailed(
                    "Failed to acquire embedding model lock - model may be poisoned".to_string(),
                )
            })?
            .embed(text_strings, Some(self.batch_size))
            .map_err(|e| EncodeError::EmbeddingFailed(e.to_string()))?;

        for embedding in embeddings.iter_mut() {
            if embedding.len() != EMBEDDING_DIMENSION {
                return Err(EncodeError::DimensionMismatch {
                    expected: EMBEDDING_DIMENSION,
                    actual: embedding.len(),
                });
            }
            // Index contract is unit vectors regardless of model output
            l2_normalize(embedding);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}
