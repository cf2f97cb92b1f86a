use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the job store.
#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("job store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row could not be read or written as CSV.
    #[error("job store CSV error at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type JobStoreResult<T> = Result<T, JobStoreError>;
