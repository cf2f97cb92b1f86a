use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::storage::error::StorageError;

/// Replaces `path` with `data` atomically.
///
/// Bytes go to a temp file in the destination directory, are fsynced, then
/// renamed over the target. Readers observe either the previous file or the
/// complete new one.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|e| StorageError::Io {
        path: parent.to_path_buf(),
        source: e,
    })?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| StorageError::Io {
        path: parent.to_path_buf(),
        source: e,
    })?;

    temp.write_all(data)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| StorageError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    temp.persist(path).map_err(|e| StorageError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.error.to_string(),
    })?;

    Ok(())
}
