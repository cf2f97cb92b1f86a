use std::path::PathBuf;
use thiserror::Error;

use crate::constants::DimensionMismatch;
use crate::embedding::EmbeddingError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index dimension must be greater than zero")]
    ZeroDimension,

    /// The encoder returned a different number of vectors than texts given.
    #[error("encoder returned {actual} vectors for {expected} jobs")]
    EmbeddingCount { expected: usize, actual: usize },

    #[error("failed to open index at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize index: {0}")]
    Serialization(String),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DimensionMismatch> for IndexError {
    fn from(e: DimensionMismatch) -> Self {
        IndexError::DimensionMismatch {
            expected: e.expected,
            actual: e.actual,
        }
    }
}

pub type IndexResult<T> = Result<T, IndexError>;
