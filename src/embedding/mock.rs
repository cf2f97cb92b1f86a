//! Injectable test doubles for the model capabilities.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::embedding::encoder::{EncoderConfig, SentenceEncoder, TextEncoder};
use crate::embedding::error::EmbeddingError;
use crate::embedding::reranker::{Reranker, RelevanceScorer, RerankerError};

/// Lexical encoder that counts calls and can be switched into failure.
#[derive(Debug)]
pub struct MockEncoder {
    inner: SentenceEncoder,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    pub fn new() -> Self {
        Self {
            inner: SentenceEncoder::stub(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_dimension(dim: usize) -> Self {
        let inner = SentenceEncoder::load(EncoderConfig::stub().with_embedding_dim(dim))
            .expect("stub encoder always loads");
        Self {
            inner,
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Number of texts encoded so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl TextEncoder for MockEncoder {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock encoder failure".to_string(),
            });
        }
        self.inner.encode(text)
    }
}

type ScoreFn = dyn Fn(&str, &str) -> f32 + Send + Sync;

/// Scorer backed by a closure (defaults to the lexical stub), counting calls.
pub struct MockScorer {
    score_fn: Arc<ScoreFn>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl std::fmt::Debug for MockScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockScorer")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

impl Default for MockScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScorer {
    pub fn new() -> Self {
        let lexical = Reranker::stub().expect("stub reranker always loads");
        Self::from_fn(move |query, candidate| lexical.score(query, candidate).unwrap_or(0.0))
    }

    pub fn from_fn<F>(score_fn: F) -> Self
    where
        F: Fn(&str, &str) -> f32 + Send + Sync + 'static,
    {
        Self {
            score_fn: Arc::new(score_fn),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Number of pairs scored so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl RelevanceScorer for MockScorer {
    fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RerankerError::InferenceFailed {
                reason: "mock scorer failure".to_string(),
            });
        }
        Ok((self.score_fn)(query, candidate))
    }
}
