//! Stored resume text, the fallback search text when a caller sends no query.

#[cfg(test)]
mod tests;

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{StorageError, write_atomic};

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("invalid user id for resume storage: {user_id:?}")]
    InvalidUserId { user_id: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Source of plain resume text per user.
pub trait ResumeProvider: Send + Sync {
    /// Resume text for `user_id`, or `""` when none is on file.
    fn resume_text(&self, user_id: &str) -> String;
}

/// Reads `{dir}/{user_id}.txt`.
#[derive(Debug, Clone)]
pub struct FsResumeProvider {
    dir: PathBuf,
}

impl FsResumeProvider {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `user_id`'s resume, or `None` if the id would escape `dir`.
    pub fn resume_path(&self, user_id: &str) -> Option<PathBuf> {
        let name = sanitize_user_id(user_id)?;
        Some(self.dir.join(format!("{name}.txt")))
    }

    /// Replaces the stored resume for `user_id`.
    pub fn store(&self, user_id: &str, text: &str) -> Result<PathBuf, ResumeError> {
        let path = self
            .resume_path(user_id)
            .ok_or_else(|| ResumeError::InvalidUserId {
                user_id: user_id.to_string(),
            })?;
        write_atomic(&path, text.as_bytes())?;
        debug!(user_id, path = %path.display(), bytes = text.len(), "Stored resume");
        Ok(path)
    }
}

impl ResumeProvider for FsResumeProvider {
    fn resume_text(&self, user_id: &str) -> String {
        let Some(path) = self.resume_path(user_id) else {
            warn!(user_id, "Rejected resume lookup for unsafe user id");
            return String::new();
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => text.trim().to_string(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable resume, ignoring");
                String::new()
            }
        }
    }
}

/// A user id usable as a single file name: one normal path component.
fn sanitize_user_id(user_id: &str) -> Option<&str> {
    if user_id.is_empty() || user_id.contains(['/', '\\']) {
        return None;
    }

    let mut components = Path::new(user_id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(user_id),
        _ => None,
    }
}

/// In-memory resumes for tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct InMemoryResumes {
    texts: parking_lot::RwLock<std::collections::HashMap<String, String>>,
}

#[cfg(any(test, feature = "mock"))]
impl InMemoryResumes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: &str, text: &str) {
        self.texts
            .write()
            .insert(user_id.to_string(), text.to_string());
    }
}

#[cfg(any(test, feature = "mock"))]
impl ResumeProvider for InMemoryResumes {
    fn resume_text(&self, user_id: &str) -> String {
        self.texts
            .read()
            .get(user_id)
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    }
}
