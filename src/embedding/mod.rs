//! Embedding + model utilities.
//!
//! - [`encoder`] maps text to vectors for the index and for queries.
//! - [`reranker`] scores `(query, candidate)` pairs on the retrieved short-list.
//!
//! Both are consumed through the [`TextEncoder`] / [`RelevanceScorer`] traits so
//! the search engine never depends on a concrete model.

/// BERT wrappers (mean-pooled encoder, cross-encoder classifier).
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Sentence encoder (bi-encoder).
pub mod encoder;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Cross-encoder reranker.
pub mod reranker;
/// Tokenizer loading and shared text helpers.
pub mod utils;

pub use encoder::{ENCODER_EMBEDDING_DIM, EncoderConfig, SentenceEncoder, TextEncoder};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEncoder, MockScorer};
pub use reranker::{RelevanceScorer, Reranker, RerankerConfig, RerankerError};
