//! Job postings: record types and the CSV-backed job store.

pub mod error;
pub mod model;
pub mod store;


pub use error::{JobStoreError, JobStoreResult};
pub use model::{JobCorpus, JobRecord, NewJob};
pub use store::JobStore;
