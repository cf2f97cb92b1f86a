use std::path::PathBuf;

use crate::embedding::error::EmbeddingError;

/// Default sentence embedding width (MiniLM-L6).
pub const ENCODER_EMBEDDING_DIM: usize = crate::constants::DEFAULT_EMBEDDING_DIM;

/// Default max tokens fed to the sentence encoder.
pub const ENCODER_MAX_SEQ_LEN: usize = crate::constants::DEFAULT_ENCODER_MAX_SEQ_LEN;

#[derive(Debug, Clone, PartialEq)]
/// Configuration for [`SentenceEncoder`](super::SentenceEncoder).
pub struct EncoderConfig {
    /// Model directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    /// `None` selects the lexical stub.
    pub model_path: Option<PathBuf>,
    /// Max tokens to consider.
    pub max_seq_len: usize,
    /// Output width. With a model loaded this must equal its hidden size.
    pub embedding_dim: usize,
    /// Scale outputs to unit length.
    pub normalize: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            max_seq_len: ENCODER_MAX_SEQ_LEN,
            embedding_dim: ENCODER_EMBEDDING_DIM,
            normalize: true,
        }
    }
}

impl EncoderConfig {
    /// Env var used to locate the model directory.
    pub const ENV_MODEL_PATH: &'static str = "JOBMATCH_ENCODER_PATH";

    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; lexical feature-hashing embeddings).
    pub fn stub() -> Self {
        Self::default()
    }

    /// Loads config from the environment (unset path → stub).
    pub fn from_env() -> Self {
        let model_path = std::env::var(Self::ENV_MODEL_PATH)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            model_path,
            ..Default::default()
        }
    }

    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    pub fn is_stub(&self) -> bool {
        self.model_path.is_none()
    }

    /// Validates dimensions and, in model mode, the model directory layout.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be greater than zero".to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }

        let Some(ref path) = self.model_path else {
            return Ok(());
        };

        if path.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_path cannot be empty when provided".to_string(),
            });
        }

        if !path.is_dir() {
            return Err(EmbeddingError::ModelNotFound { path: path.clone() });
        }

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !path.join(required).exists() {
                return Err(EmbeddingError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, path.display()),
                });
            }
        }

        Ok(())
    }
}
