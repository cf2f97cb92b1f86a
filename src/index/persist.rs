//! On-disk index format (rkyv, memory-mapped on read).

use std::path::Path;

use half::f16;
use rkyv::rancor::Error as RkyvError;
use rkyv::{Archive, Deserialize, Serialize, to_bytes};
use tracing::debug;

use crate::index::VectorIndex;
use crate::index::error::{IndexError, IndexResult};
use crate::index::flat::FlatIpIndex;
use crate::storage::{MmapError, MmapFileHandle, write_atomic};

/// Bumped whenever [`PersistedIndex`]'s layout changes.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Serialized form of a [`VectorIndex`].
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct PersistedIndex {
    pub version: u32,
    pub dimension: u32,
    /// BLAKE3 of the ordered `job_ids`.
    pub corpus_fingerprint: [u8; 32],
    pub job_ids: Vec<String>,
    /// Row-major vectors (little-endian f16).
    pub vectors: Vec<u8>,
}

/// Result of reading the index file.
#[derive(Debug)]
pub enum PersistedState {
    Missing,
    /// The file exists but cannot be used; the reason is for logs.
    Invalid(String),
    Loaded(VectorIndex),
}

impl From<&VectorIndex> for PersistedIndex {
    fn from(index: &VectorIndex) -> Self {
        Self {
            version: INDEX_FORMAT_VERSION,
            dimension: index.dimension() as u32,
            corpus_fingerprint: *index.fingerprint(),
            job_ids: index.job_ids().to_vec(),
            vectors: index
                .flat()
                .as_f16()
                .iter()
                .flat_map(|v| v.to_le_bytes())
                .collect(),
        }
    }
}

/// Serializes `index` and atomically replaces `path`.
pub fn write_index(path: &Path, index: &VectorIndex) -> IndexResult<()> {
    let persisted = PersistedIndex::from(index);
    let bytes = to_bytes::<RkyvError>(&persisted)
        .map_err(|e| IndexError::Serialization(e.to_string()))?;

    write_atomic(path, &bytes)?;

    debug!(
        path = %path.display(),
        rows = index.len(),
        bytes = bytes.len(),
        "Persisted vector index"
    );
    Ok(())
}

/// Reads and validates the index at `path`.
///
/// Absence and corruption are reported as states. Any other I/O failure is an
/// error.
pub fn read_index(path: &Path) -> IndexResult<PersistedState> {
    let handle = match MmapFileHandle::open(path) {
        Ok(handle) => handle,
        Err(MmapError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(PersistedState::Missing);
        }
        Err(MmapError::Io(e)) => {
            return Err(IndexError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
        Err(e) => return Ok(PersistedState::Invalid(e.to_string())),
    };

    let archived = match handle.access_archived::<ArchivedPersistedIndex>() {
        Ok(archived) => archived,
        Err(e) => return Ok(PersistedState::Invalid(e.to_string())),
    };

    let version = archived.version.to_native();
    if version != INDEX_FORMAT_VERSION {
        return Ok(PersistedState::Invalid(format!(
            "unsupported index format version {version}"
        )));
    }

    let dimension = archived.dimension.to_native() as usize;
    let rows = archived.job_ids.len();
    let expected_bytes = rows * dimension * std::mem::size_of::<f16>();
    if archived.vectors.len() != expected_bytes {
        return Ok(PersistedState::Invalid(format!(
            "expected {expected_bytes} vector bytes for {rows} rows of width {dimension}, found {}",
            archived.vectors.len()
        )));
    }

    let vectors: Vec<f16> = archived
        .vectors
        .as_slice()
        .chunks_exact(2)
        .map(|pair| f16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let job_ids: Vec<String> = archived
        .job_ids
        .iter()
        .map(|id| id.as_str().to_string())
        .collect();

    let index = match FlatIpIndex::from_f16(dimension, vectors)
        .and_then(|flat| VectorIndex::new(flat, job_ids))
    {
        Ok(index) => index,
        Err(e) => return Ok(PersistedState::Invalid(e.to_string())),
    };

    if index.fingerprint() != &archived.corpus_fingerprint {
        return Ok(PersistedState::Invalid(
            "stored fingerprint does not match stored job ids".to_string(),
        ));
    }

    Ok(PersistedState::Loaded(index))
}
