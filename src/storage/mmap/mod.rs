//! Read-only memory-mapped files with rkyv validation.

pub mod error;

pub use error::{MmapError, MmapResult};

use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;
use rkyv::Portable;
use rkyv::api::high::{HighValidator, access};
use rkyv::bytecheck::CheckBytes;
use rkyv::rancor::Error as RkyvError;

/// Alignment rkyv archives expect at their root.
pub const RKYV_ALIGNMENT: usize = 16;

/// Cheaply cloneable read-only mapping of a file.
#[derive(Clone)]
pub struct MmapFileHandle {
    inner: Arc<Mmap>,
    path: Arc<PathBuf>,
}

impl std::fmt::Debug for MmapFileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapFileHandle")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}

impl MmapFileHandle {
    /// Maps `path` read-only. Empty files are rejected.
    pub fn open<P: AsRef<Path>>(path: P) -> MmapResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        if file.metadata()?.len() == 0 {
            return Err(MmapError::EmptyFile);
        }

        // SAFETY: the index file is only ever replaced by rename, never written
        // in place, so the mapped inode stays immutable while this handle lives.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self {
            inner: Arc::new(mmap),
            path: Arc::new(path.to_path_buf()),
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        self.inner.deref()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates and returns the archived root stored in this file.
    pub fn access_archived<T>(&self) -> MmapResult<&T>
    where
        T: Portable + for<'a> CheckBytes<HighValidator<'a, RkyvError>>,
    {
        let data = self.as_slice();

        if !(data.as_ptr() as usize).is_multiple_of(RKYV_ALIGNMENT) {
            return Err(MmapError::AlignmentError {
                alignment: RKYV_ALIGNMENT,
            });
        }

        access::<T, RkyvError>(data).map_err(|e| MmapError::ValidationFailed(e.to_string()))
    }
}
