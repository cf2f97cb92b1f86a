//! Cross-process advisory lock over the data directory.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::storage::error::StorageError;

/// Held lock on the data directory; released on drop.
///
/// Ingestion takes it exclusively, readers take it shared. `flock` semantics
/// apply per open file description, so two guards in one process conflict the
/// same way two processes do.
#[derive(Debug)]
pub struct DataLock {
    file: File,
    path: PathBuf,
    exclusive: bool,
}

impl DataLock {
    /// Blocks until an exclusive lock is held.
    pub fn exclusive(path: &Path) -> Result<Self, StorageError> {
        let file = Self::open(path)?;
        FileExt::lock_exclusive(&file).map_err(|e| StorageError::LockFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), "Acquired exclusive data lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
            exclusive: true,
        })
    }

    /// Blocks until a shared lock is held.
    pub fn shared(path: &Path) -> Result<Self, StorageError> {
        let file = Self::open(path)?;
        FileExt::lock_shared(&file).map_err(|e| StorageError::LockFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            exclusive: false,
        })
    }

    /// Returns `None` instead of blocking when another holder conflicts.
    pub fn try_exclusive(path: &Path) -> Result<Option<Self>, StorageError> {
        let file = Self::open(path)?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(Self {
                file,
                path: path.to_path_buf(),
                exclusive: true,
            })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(StorageError::LockFailed {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(path: &Path) -> Result<File, StorageError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StorageError::Io {
                path: path.to_path_buf(),
                source: e,
            })
    }
}

impl Drop for DataLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
