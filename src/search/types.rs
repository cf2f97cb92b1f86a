use serde::{Deserialize, Serialize};

use crate::jobs::JobRecord;

/// Arguments of one search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub user_id: String,
    /// Free-text query. When absent the user's stored resume is used.
    #[serde(default)]
    pub query: Option<String>,
    /// Result count. Falls back to the configured default.
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl SearchRequest {
    pub fn new<S: Into<String>>(user_id: S) -> Self {
        Self {
            user_id: user_id.into(),
            query: None,
            top_k: None,
        }
    }

    pub fn with_query<S: Into<String>>(mut self, query: S) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// A job returned by search, with the scores that ranked it.
///
/// Serializes as the job's CSV fields plus `similarity_score` and, when the
/// candidate list was reranked, `rerank_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    #[serde(flatten)]
    pub job: JobRecord,
    /// Cosine similarity from the retrieval stage.
    pub similarity_score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_score: Option<f32>,
}

impl JobMatch {
    pub fn job_id(&self) -> &str {
        &self.job.job_id
    }
}
