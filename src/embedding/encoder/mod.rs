//! Sentence encoder (bi-encoder) used for both corpus and query embeddings.
//!
//! Use [`EncoderConfig::stub`] for tests/examples without model files.

/// Encoder configuration.
pub mod config;


pub use config::{ENCODER_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN, EncoderConfig};

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::bert::BertEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::{content_words, l2_normalize, load_tokenizer_with_truncation};
use crate::hashing::hash_to_u64;

/// Maps text to a fixed-width dense vector.
///
/// Implementations must be deterministic for identical input and return the
/// same width for every call, since corpus and query vectors are compared
/// directly.
pub trait TextEncoder: Send + Sync {
    /// Width of every vector returned by [`encode`](Self::encode).
    fn dimension(&self) -> usize;

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}

enum EncoderBackend {
    Model {
        model: BertEncoder,
        tokenizer: Tokenizer,
        device: Device,
    },
    Lexical,
}

/// BERT sentence encoder with a deterministic lexical fallback.
pub struct SentenceEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Lexical => "Lexical".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEncoder {
    /// Loads the encoder from a config (stub mode when no model path is set).
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let Some(model_path) = config.model_path.clone() else {
            warn!(
                embedding_dim = config.embedding_dim,
                "Sentence encoder running in lexical STUB mode"
            );
            return Ok(Self {
                backend: EncoderBackend::Lexical,
                config,
            });
        };

        let device = select_device()?;
        debug!(?device, "Selected compute device for sentence encoder");

        let model =
            BertEncoder::load(&model_path, &device).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            })?;

        if model.hidden_size() != config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) does not match model hidden_size ({})",
                    config.embedding_dim,
                    model.hidden_size()
                ),
            });
        }

        let tokenizer = load_tokenizer_with_truncation(&model_path, config.max_seq_len).map_err(
            |e| EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            },
        )?;

        info!(
            model_path = %model_path.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
        })
    }

    /// Lexical stub encoder with the default width.
    pub fn stub() -> Self {
        Self {
            backend: EncoderBackend::Lexical,
            config: EncoderConfig::stub(),
        }
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Lexical)
    }

    /// Returns the encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn encode_with_model(
        &self,
        text: &str,
        model: &BertEncoder,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        if encoding.get_ids().is_empty() {
            return Ok(vec![0.0; self.config.embedding_dim]);
        }

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Encoding text (transformer forward pass)"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        let pooled = model
            .forward_mean_pooled(&input_ids, &type_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Encoder forward pass failed: {}", e),
            })?;

        let mut embedding = pooled.squeeze(0)?.to_vec1::<f32>()?;
        if self.config.normalize {
            l2_normalize(&mut embedding);
        }
        Ok(embedding)
    }

    /// Feature-hashes content words into signed buckets.
    fn encode_lexical(&self, text: &str) -> Vec<f32> {
        let dim = self.config.embedding_dim;
        let mut embedding = vec![0.0f32; dim];

        for word in content_words(text) {
            let h = hash_to_u64(word.as_bytes());
            let bucket = (h % dim as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        if self.config.normalize {
            l2_normalize(&mut embedding);
        }
        embedding
    }
}

impl TextEncoder for SentenceEncoder {
    fn dimension(&self) -> usize {
        self.config.embedding_dim
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.encode_with_model(text, model, tokenizer, device),
            EncoderBackend::Lexical => Ok(self.encode_lexical(text)),
        }
    }
}
