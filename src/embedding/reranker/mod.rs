pub mod config;
pub mod error;


pub use config::{MAX_SEQ_LEN, RerankerConfig};
pub use error::RerankerError;

use std::collections::HashSet;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::embedding::bert::BertClassifier;
use crate::embedding::device::select_device;
use crate::embedding::utils::{content_words, load_tokenizer_with_truncation};

/// Scores `(query, candidate)` pairs jointly; higher means more relevant.
///
/// Scores carry no fixed scale. Only the ordering inside one batch is meaningful.
pub trait RelevanceScorer: Send + Sync {
    fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError>;

    /// Scores every candidate against `query`, preserving input order.
    fn score_batch(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>, RerankerError> {
        candidates
            .iter()
            .map(|candidate| self.score(query, candidate))
            .collect()
    }
}

struct CrossEncoder {
    model: BertClassifier,
    tokenizer: Tokenizer,
}

pub struct Reranker {
    device: Device,
    config: RerankerConfig,
    cross_encoder: Option<CrossEncoder>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl Reranker {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(msg) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason: msg });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for reranker");

        let Some(model_path) = config.model_path.clone() else {
            info!("No reranker model path configured, operating in stub mode");
            return Ok(Self {
                device,
                config,
                cross_encoder: None,
            });
        };

        if !model_path.exists() {
            return Err(RerankerError::ModelNotFound { path: model_path });
        }

        for required in ["config.json", "model.safetensors"] {
            if !model_path.join(required).exists() {
                return Err(RerankerError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, model_path.display()),
                });
            }
        }

        info!(model_path = %model_path.display(), "Loading reranker model");

        let model =
            BertClassifier::load(&model_path, &device).map_err(|e| RerankerError::ModelLoadFailed {
                reason: format!("Failed to load BERT model: {}", e),
            })?;

        let tokenizer = load_tokenizer_with_truncation(&model_path, config.max_seq_len).map_err(
            |e| RerankerError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            },
        )?;

        info!("Reranker model loaded successfully");

        Ok(Self {
            device,
            config,
            cross_encoder: Some(CrossEncoder { model, tokenizer }),
        })
    }

    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(RerankerConfig::stub())
    }

    pub fn is_model_loaded(&self) -> bool {
        self.cross_encoder.is_some()
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    fn score_with_model(
        &self,
        cross_encoder: &CrossEncoder,
        query: &str,
        candidate: &str,
    ) -> Result<f32, RerankerError> {
        let tokens = cross_encoder
            .tokenizer
            .encode((query, candidate), true)
            .map_err(|e| RerankerError::TokenizationFailed {
                reason: e.to_string(),
            })?;

        let token_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(tokens.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = cross_encoder
            .model
            .forward(&token_ids, &type_ids, Some(&attention_mask))
            .map_err(|e| RerankerError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let values = logits.flatten_all()?.to_vec1::<f32>()?;
        values
            .first()
            .copied()
            .ok_or_else(|| RerankerError::InferenceFailed {
                reason: "cross-encoder returned no logits".to_string(),
            })
    }

    /// Content-word recall blended with Jaccard overlap, squashed into `(0, 1)`.
    fn lexical_score(query: &str, candidate: &str) -> f32 {
        let query_words: HashSet<String> = content_words(query).into_iter().collect();
        let candidate_words: HashSet<String> = content_words(candidate).into_iter().collect();

        if query_words.is_empty() {
            let len_ratio = (query.len().min(candidate.len()) as f32)
                / (query.len().max(candidate.len()).max(1) as f32);
            return len_ratio * 0.3;
        }

        let matches = query_words.intersection(&candidate_words).count();
        let recall = matches as f32 / query_words.len() as f32;

        let union = query_words.union(&candidate_words).count();
        let jaccard = if union > 0 {
            matches as f32 / union as f32
        } else {
            0.0
        };

        let base_score = 0.6 * recall + 0.4 * jaccard;

        1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp())
    }
}

impl RelevanceScorer for Reranker {
    fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError> {
        let score = match &self.cross_encoder {
            Some(cross_encoder) => self.score_with_model(cross_encoder, query, candidate)?,
            None => Self::lexical_score(query, candidate),
        };

        debug!(
            query_len = query.len(),
            candidate_len = candidate.len(),
            score,
            "Scored query-candidate pair"
        );

        Ok(score)
    }
}
