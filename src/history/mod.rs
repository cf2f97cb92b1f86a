//! Per-user log of jobs already surfaced, and the exclusion set built from it.

pub mod error;
pub mod model;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::{HistoryError, HistoryResult};
pub use model::ShownRecord;
pub use store::ShownHistoryStore;
