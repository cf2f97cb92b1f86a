//! Vector index over the job corpus: flat inner-product search, on-disk
//! persistence, and the build/load lifecycle.
//!
//! Row `i` of a [`VectorIndex`] always refers to row `i` of the corpus it was
//! built from. The index records that corpus's id sequence and fingerprint so a
//! corpus mutated without a rebuild is detected instead of mis-mapped.

pub mod error;
pub mod flat;
pub mod manager;
pub mod persist;


pub use error::{IndexError, IndexResult};
pub use flat::FlatIpIndex;
pub use manager::IndexManager;
pub use persist::{INDEX_FORMAT_VERSION, PersistedIndex, PersistedState, read_index, write_index};

use crate::hashing::corpus_fingerprint;
use crate::jobs::JobCorpus;

/// One retrieval result.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub row: usize,
    pub job_id: String,
    /// Inner product of unit vectors, i.e. cosine similarity.
    pub score: f32,
}

/// Flat index plus the ordered job ids its rows belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    flat: FlatIpIndex,
    job_ids: Vec<String>,
    fingerprint: [u8; 32],
}

impl VectorIndex {
    /// Pairs built rows with their job ids. Both must have the same length.
    pub fn new(flat: FlatIpIndex, job_ids: Vec<String>) -> IndexResult<Self> {
        if flat.len() != job_ids.len() {
            return Err(IndexError::EmbeddingCount {
                expected: job_ids.len(),
                actual: flat.len(),
            });
        }
        let fingerprint = corpus_fingerprint(job_ids.iter().map(String::as_str));
        Ok(Self {
            flat,
            job_ids,
            fingerprint,
        })
    }

    pub fn len(&self) -> usize {
        self.job_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.job_ids.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.flat.dimension()
    }

    pub fn job_ids(&self) -> &[String] {
        &self.job_ids
    }

    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    pub fn flat(&self) -> &FlatIpIndex {
        &self.flat
    }

    /// `true` when this index was built from exactly `corpus`'s ids, in order.
    pub fn matches_corpus(&self, corpus: &JobCorpus) -> bool {
        self.len() == corpus.len() && self.fingerprint == corpus.fingerprint()
    }

    /// Top `n` rows by similarity to `query`, best first.
    pub fn search(&self, query: &[f32], n: usize) -> IndexResult<Vec<IndexHit>> {
        let hits = self.flat.search(query, n)?;
        Ok(hits
            .into_iter()
            .map(|(row, score)| IndexHit {
                row,
                job_id: self.job_ids[row].clone(),
                score,
            })
            .collect())
    }
}
