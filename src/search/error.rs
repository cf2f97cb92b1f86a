use thiserror::Error;

use crate::config::ConfigError;
use crate::embedding::{EmbeddingError, RerankerError};
use crate::history::HistoryError;
use crate::index::IndexError;
use crate::jobs::JobStoreError;
use crate::storage::StorageError;

/// Failures surfaced by [`JobSearchEngine`](super::JobSearchEngine).
///
/// Missing data (no jobs, no query or resume, everything already shown) is
/// never an error; those calls return an empty result.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("job store error: {0}")]
    Jobs(#[from] JobStoreError),

    #[error("shown-history error: {0}")]
    History(#[from] HistoryError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("encoder error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("reranker error: {0}")]
    Reranker(#[from] RerankerError),

    /// The reranker returned a different number of scores than candidates.
    #[error("reranker returned {actual} scores for {expected} candidates")]
    ScoreCount { expected: usize, actual: usize },
}

pub type SearchResult<T> = Result<T, SearchError>;
