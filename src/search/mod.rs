//! Two-stage job search (retrieve, filter shown, rerank) and ingestion.

pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::{DefaultSearchEngine, JobSearchEngine};
pub use error::{SearchError, SearchResult};
pub use types::{JobMatch, SearchRequest};
