//! Storage primitives: mmap reads, atomic replacement, data-directory locking.

pub mod error;
pub mod lock;
pub mod mmap;
pub mod writer;

pub use error::StorageError;
pub use lock::DataLock;
pub use mmap::{MmapError, MmapFileHandle};
pub use writer::write_atomic;
