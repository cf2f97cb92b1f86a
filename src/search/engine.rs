use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::embedding::{
    EncoderConfig, RelevanceScorer, Reranker, RerankerConfig, SentenceEncoder, TextEncoder,
};
use crate::history::{ShownHistoryStore, ShownRecord};
use crate::index::{IndexManager, VectorIndex};
use crate::jobs::{JobCorpus, JobStore, NewJob};
use crate::resume::{FsResumeProvider, ResumeProvider};
use crate::storage::DataLock;

use super::error::{SearchError, SearchResult};
use super::types::{JobMatch, SearchRequest};

/// Engine wired to the BERT models (or their lexical stubs) and on-disk resumes.
pub type DefaultSearchEngine = JobSearchEngine<SentenceEncoder, Reranker, FsResumeProvider>;

/// Retrieve-then-rerank search over the job corpus with per-user exclusion.
///
/// Model capabilities and the resume source are injected, so tests can swap in
/// deterministic doubles.
pub struct JobSearchEngine<E, R, P> {
    config: Config,
    jobs: JobStore,
    history: ShownHistoryStore,
    index_manager: IndexManager,
    encoder: E,
    reranker: R,
    resumes: P,
    cached_index: RwLock<Option<Arc<VectorIndex>>>,
}

impl<E, R, P> std::fmt::Debug for JobSearchEngine<E, R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSearchEngine")
            .field("config", &self.config)
            .field("jobs", &self.jobs)
            .field("index_manager", &self.index_manager)
            .field(
                "cached_rows",
                &self.cached_index.read().as_ref().map(|index| index.len()),
            )
            .finish_non_exhaustive()
    }
}

impl DefaultSearchEngine {
    /// Validates `config` and loads both models (stubs when no path is set).
    pub fn from_config(config: Config) -> SearchResult<Self> {
        config.validate()?;

        let encoder_config = match &config.encoder_path {
            Some(path) => EncoderConfig::new(path.clone()),
            None => EncoderConfig::stub(),
        };
        let reranker_config = match &config.reranker_path {
            Some(path) => RerankerConfig::new(path.clone()),
            None => RerankerConfig::stub(),
        };

        let encoder = SentenceEncoder::load(encoder_config)?;
        let reranker = Reranker::load(reranker_config)?;
        let resumes = FsResumeProvider::new(config.resumes_dir.clone());

        Ok(Self::new(config, encoder, reranker, resumes))
    }
}

impl<E, R, P> JobSearchEngine<E, R, P>
where
    E: TextEncoder,
    R: RelevanceScorer,
    P: ResumeProvider,
{
    pub fn new(config: Config, encoder: E, reranker: R, resumes: P) -> Self {
        Self {
            jobs: JobStore::new(config.jobs_file.clone()),
            history: ShownHistoryStore::new(config.shown_file.clone()),
            index_manager: IndexManager::new(config.index_file.clone()),
            config,
            encoder,
            reranker,
            resumes,
            cached_index: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn reranker(&self) -> &R {
        &self.reranker
    }

    pub fn resumes(&self) -> &P {
        &self.resumes
    }

    pub fn job_store(&self) -> &JobStore {
        &self.jobs
    }

    pub fn history(&self) -> &ShownHistoryStore {
        &self.history
    }

    /// [`search_jobs`](Self::search_jobs) with the configured default `top_k`.
    pub fn search(&self, request: &SearchRequest) -> SearchResult<Vec<JobMatch>> {
        self.search_jobs(
            &request.user_id,
            request.query.as_deref(),
            request.top_k.unwrap_or(self.config.default_top_k),
        )
    }

    /// Returns up to `top_k` jobs for `user_id`, best first, that were never
    /// shown to that user, and records them as shown.
    ///
    /// Without a non-blank `query` the user's resume is the search text; a
    /// whitespace-only query counts as no query. No jobs, no search text, or
    /// nothing left after exclusion all yield an empty list. Job ids within one
    /// response are distinct, even when the store holds duplicate rows. Calling
    /// twice with the same arguments does not return the same jobs twice.
    #[instrument(skip(self, query), fields(has_query = query.is_some()))]
    pub fn search_jobs(
        &self,
        user_id: &str,
        query: Option<&str>,
        top_k: usize,
    ) -> SearchResult<Vec<JobMatch>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        // No job file yet: nothing to search and nothing to lock.
        if !self.jobs.path().exists() {
            debug!("Job store is empty");
            return Ok(Vec::new());
        }

        let (corpus, index) = {
            let _lock = DataLock::shared(&self.config.lock_file())?;

            let corpus = self.jobs.load()?;
            if corpus.is_empty() {
                debug!("Job store is empty");
                return Ok(Vec::new());
            }

            let index = self.current_index(&corpus)?;
            (corpus, index)
        };
        let Some(index) = index else {
            return Ok(Vec::new());
        };

        let shown = self.history.load_jobs_shown(user_id)?;

        let search_text = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => q.to_string(),
            None => self.resumes.resume_text(user_id),
        };
        if search_text.is_empty() {
            debug!("No query and no resume on file");
            return Ok(Vec::new());
        }

        let query_vector = self.encoder.encode(&search_text)?;
        let fetch = top_k
            .saturating_mul(self.config.overfetch_factor)
            .min(corpus.len());
        let hits = index.search(&query_vector, fetch)?;
        let retrieved = hits.len();

        let mut accepted: HashSet<&str> = HashSet::with_capacity(hits.len());
        let mut candidates: Vec<JobMatch> = hits
            .into_iter()
            .filter_map(|hit| {
                let job = corpus.get(hit.row)?;
                if shown.contains(&job.job_id) || !accepted.insert(job.job_id.as_str()) {
                    return None;
                }
                Some(JobMatch {
                    job: job.clone(),
                    similarity_score: hit.score,
                    rerank_score: None,
                })
            })
            .collect();

        debug!(
            retrieved,
            excluded = retrieved - candidates.len(),
            previously_shown = shown.len(),
            "Retrieved candidates"
        );

        if candidates.len() > 1 {
            self.rerank(&search_text, &mut candidates)?;
        }
        candidates.truncate(top_k);

        let shown_now: Vec<&str> = candidates.iter().map(JobMatch::job_id).collect();
        self.history.record_shown(user_id, &shown_now)?;

        info!(
            returned = candidates.len(),
            top_k,
            reranked = candidates.first().is_some_and(|m| m.rerank_score.is_some()),
            "Search complete"
        );
        Ok(candidates)
    }

    /// Appends `job` under a fresh id, then rebuilds the index.
    ///
    /// Holds the exclusive data lock for the whole operation so no reader pairs
    /// the grown corpus with the old index.
    #[instrument(skip(self, job), fields(title = %job.title))]
    pub fn add_job(&self, job: NewJob) -> SearchResult<String> {
        let _lock = DataLock::exclusive(&self.config.lock_file())?;

        let job_id = Uuid::new_v4().to_string();
        let record = job.into_record(job_id.clone());
        self.jobs.append(&record)?;

        // A failed rebuild leaves a stale index file; the next load sees the
        // fingerprint mismatch and rebuilds.
        let corpus = self.jobs.load()?;
        self.rebuild_locked(&corpus)?;

        info!(job_id = %job_id, rows = corpus.len(), "Job added");
        Ok(job_id)
    }

    /// Rebuilds the index from the current corpus. Returns the row count.
    pub fn rebuild_index(&self) -> SearchResult<usize> {
        let _lock = DataLock::exclusive(&self.config.lock_file())?;
        let corpus = self.jobs.load()?;
        self.rebuild_locked(&corpus)?;
        Ok(corpus.len())
    }

    /// Full shown-history of `user_id`, oldest first.
    pub fn shown_jobs(&self, user_id: &str) -> SearchResult<Vec<ShownRecord>> {
        Ok(self.history.records_for(user_id)?)
    }

    fn rebuild_locked(&self, corpus: &JobCorpus) -> SearchResult<()> {
        let index = self.index_manager.build_index(corpus, &self.encoder)?;
        *self.cached_index.write() = index.map(Arc::new);
        Ok(())
    }

    fn current_index(&self, corpus: &JobCorpus) -> SearchResult<Option<Arc<VectorIndex>>> {
        {
            let cached = self.cached_index.read();
            if let Some(index) = cached.as_ref()
                && index.matches_corpus(corpus)
            {
                return Ok(Some(Arc::clone(index)));
            }
        }

        let index = self
            .index_manager
            .load_index(corpus, &self.encoder)?
            .map(Arc::new);
        *self.cached_index.write() = index.clone();
        Ok(index)
    }

    /// Scores every candidate against `search_text` and sorts best first.
    /// Equal scores keep retrieval order.
    fn rerank(&self, search_text: &str, candidates: &mut [JobMatch]) -> SearchResult<()> {
        let texts: Vec<String> = candidates.iter().map(|c| c.job.search_text()).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let scores = self.reranker.score_batch(search_text, &refs)?;
        if scores.len() != candidates.len() {
            return Err(SearchError::ScoreCount {
                expected: candidates.len(),
                actual: scores.len(),
            });
        }

        for (candidate, score) in candidates.iter_mut().zip(scores) {
            candidate.rerank_score = Some(score);
        }
        candidates.sort_by(|a, b| {
            let a = a.rerank_score.unwrap_or(f32::NEG_INFINITY);
            let b = b.rerank_score.unwrap_or(f32::NEG_INFINITY);
            b.total_cmp(&a)
        });

        debug!(
            candidates = candidates.len(),
            top_score = candidates.first().and_then(|c| c.rerank_score),
            "Reranked candidates"
        );
        Ok(())
    }
}
