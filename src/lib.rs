//! Personalized job-matching retrieval.
//!
//! Given a free-text query or a user's stored resume, [`JobSearchEngine`]
//! returns job postings ranked in two stages: cosine retrieval over a persisted
//! vector index, then pairwise rescoring with a cross-encoder. Jobs already shown
//! to a user are excluded and every returned job is recorded as shown.
//!
//! # Modules
//! - [`jobs`]: job records and the CSV job store
//! - [`history`]: append-only shown-history log with per-user lookup
//! - [`index`]: flat inner-product index, persistence, build/load lifecycle
//! - [`embedding`]: [`TextEncoder`] and [`RelevanceScorer`] capabilities with
//!   BERT implementations and lexical stubs
//! - [`resume`]: resume text source
//! - [`search`]: the orchestrator (`search_jobs`, `add_job`)
//! - [`storage`]: mmap reads, atomic writes, data-directory lock
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod hashing;
pub mod history;
pub mod index;
pub mod jobs;
pub mod resume;
pub mod search;
pub mod storage;

pub use config::{Config, ConfigError};
pub use constants::{DimensionMismatch, validate_embedding_dim};
pub use embedding::{
    EmbeddingError, EncoderConfig, RelevanceScorer, Reranker, RerankerConfig, RerankerError,
    SentenceEncoder, TextEncoder,
};
#[cfg(any(test, feature = "mock"))]
pub use embedding::{MockEncoder, MockScorer};
pub use hashing::{corpus_fingerprint, hash_to_u64};
pub use history::{HistoryError, ShownHistoryStore, ShownRecord};
pub use index::{FlatIpIndex, IndexError, IndexHit, IndexManager, VectorIndex};
pub use jobs::{JobCorpus, JobRecord, JobStore, JobStoreError, NewJob};
#[cfg(any(test, feature = "mock"))]
pub use resume::InMemoryResumes;
pub use resume::{FsResumeProvider, ResumeError, ResumeProvider};
pub use search::{DefaultSearchEngine, JobMatch, JobSearchEngine, SearchError, SearchRequest};
pub use storage::{DataLock, StorageError};
