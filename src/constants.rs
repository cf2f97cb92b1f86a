//! Cross-cutting, shared constants.

/// Output width of the MiniLM-L6 sentence encoder family.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

pub const DEFAULT_ENCODER_MAX_SEQ_LEN: usize = 256;
pub const DEFAULT_RERANKER_MAX_SEQ_LEN: usize = 512;

/// Results returned by `search_jobs` when the caller does not ask for a count.
pub const DEFAULT_TOP_K: usize = 10;

/// Retrieval over-fetch multiplier applied to `top_k` before exclusion and reranking.
pub const DEFAULT_OVERFETCH_FACTOR: usize = 3;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const JOBS_FILENAME: &str = "jobs.csv";
pub const SHOWN_FILENAME: &str = "jobs_shown.csv";
pub const INDEX_FILENAME: &str = "jobs.index";
pub const RESUMES_DIRNAME: &str = "resumes";
pub const LOCK_FILENAME: &str = ".jobmatch.lock";

/// Column order of the job store. External tooling reads this file, keep it stable.
pub const JOB_COLUMNS: [&str; 9] = [
    "job_id",
    "job_title",
    "company",
    "job_link",
    "description",
    "requirements",
    "location",
    "salary",
    "posting_date",
];

pub const SHOWN_COLUMNS: [&str; 3] = ["user_id", "job_id", "timestamp"];

/// Error returned when two vectors that must share a width do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub expected: usize,
    pub actual: usize,
}

impl std::fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dimension mismatch: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for DimensionMismatch {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// Use this at module boundaries (encoder output vs. index width) so a model swap
/// without a rebuild fails loudly instead of producing meaningless scores.
///
/// # Example
///
/// ```
/// use jobmatch::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(384, DEFAULT_EMBEDDING_DIM).unwrap();
/// assert!(validate_embedding_dim(768, DEFAULT_EMBEDDING_DIM).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimensionMismatch> {
    if actual != expected {
        return Err(DimensionMismatch { expected, actual });
    }
    Ok(())
}
