//! Build/load lifecycle of the persisted index.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::embedding::TextEncoder;
use crate::hashing::fingerprint_hex;
use crate::index::VectorIndex;
use crate::index::error::{IndexError, IndexResult};
use crate::index::flat::FlatIpIndex;
use crate::index::persist::{PersistedState, read_index, write_index};
use crate::jobs::JobCorpus;

/// Owns the index file location and rebuild policy.
///
/// Rebuilds are always wholesale. The persisted file is derived state: when it
/// is missing, unreadable, or built from a different corpus it is rebuilt.
#[derive(Debug, Clone)]
pub struct IndexManager {
    path: PathBuf,
}

impl IndexManager {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encodes every job, builds the index and persists it.
    ///
    /// An empty corpus yields `Ok(None)`: nothing to search, not an error.
    #[instrument(skip_all, fields(jobs = corpus.len()))]
    pub fn build_index<E>(&self, corpus: &JobCorpus, encoder: &E) -> IndexResult<Option<VectorIndex>>
    where
        E: TextEncoder + ?Sized,
    {
        if corpus.is_empty() {
            info!("No jobs found to index");
            return Ok(None);
        }

        let texts: Vec<String> = corpus.iter().map(|job| job.search_text()).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = encoder.encode_batch(&refs)?;

        if embeddings.len() != corpus.len() {
            return Err(IndexError::EmbeddingCount {
                expected: corpus.len(),
                actual: embeddings.len(),
            });
        }

        let mut flat = FlatIpIndex::new(encoder.dimension())?;
        for embedding in &embeddings {
            flat.add(embedding)?;
        }

        let index = VectorIndex::new(flat, corpus.job_ids().map(str::to_string).collect())?;
        write_index(&self.path, &index)?;

        info!(
            rows = index.len(),
            dimension = index.dimension(),
            fingerprint = %fingerprint_hex(index.fingerprint()),
            path = %self.path.display(),
            "Built vector index"
        );
        Ok(Some(index))
    }

    /// Returns the persisted index when it matches `corpus` and the encoder
    /// width, otherwise rebuilds.
    pub fn load_index<E>(&self, corpus: &JobCorpus, encoder: &E) -> IndexResult<Option<VectorIndex>>
    where
        E: TextEncoder + ?Sized,
    {
        if corpus.is_empty() {
            return self.build_index(corpus, encoder);
        }

        match read_index(&self.path)? {
            PersistedState::Loaded(index) => {
                if index.dimension() != encoder.dimension() {
                    warn!(
                        index_dimension = index.dimension(),
                        encoder_dimension = encoder.dimension(),
                        "Persisted index width differs from encoder, rebuilding"
                    );
                } else if !index.matches_corpus(corpus) {
                    warn!(
                        index_rows = index.len(),
                        corpus_rows = corpus.len(),
                        index_fingerprint = %fingerprint_hex(index.fingerprint()),
                        corpus_fingerprint = %fingerprint_hex(&corpus.fingerprint()),
                        "Persisted index is stale for current corpus, rebuilding"
                    );
                } else {
                    debug!(rows = index.len(), "Loaded persisted vector index");
                    return Ok(Some(index));
                }
            }
            PersistedState::Invalid(reason) => {
                warn!(path = %self.path.display(), %reason, "Persisted index unusable, rebuilding");
            }
            PersistedState::Missing => {
                debug!(path = %self.path.display(), "No persisted index, building");
            }
        }

        self.build_index(corpus, encoder)
    }
}
