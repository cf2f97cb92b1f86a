use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::constants::SHOWN_COLUMNS;
use crate::history::error::{HistoryError, HistoryResult};
use crate::history::model::ShownRecord;
use crate::jobs::store::ends_with_newline;

/// Per-user lookup built from the log, valid up to `offset`.
///
/// `identity` and `last_line` pin the consumed prefix to one file: a tail read
/// only continues while the same file still holds `last_line` right before
/// `offset`.
#[derive(Debug, Default)]
struct HistoryIndex {
    offset: u64,
    records: usize,
    identity: Option<FileIdentity>,
    last_line: Vec<u8>,
    by_user: HashMap<String, HashSet<String>>,
}

/// `(device, inode)` of the log file.
type FileIdentity = (u64, u64);

#[cfg(unix)]
fn file_identity(metadata: &fs::Metadata) -> Option<FileIdentity> {
    use std::os::unix::fs::MetadataExt;
    Some((metadata.dev(), metadata.ino()))
}

#[cfg(not(unix))]
fn file_identity(_metadata: &fs::Metadata) -> Option<FileIdentity> {
    None
}

/// Append-only CSV log of `(user_id, job_id, timestamp)` rows.
///
/// Lookups tail the file from the last consumed byte, so each row is parsed
/// once per process. Only complete lines are consumed; a row still being
/// written by another process is picked up on a later call. Rows are never
/// rewritten. If the file shrinks, disappears, is replaced by another file, or
/// no longer holds the consumed prefix, the lookup is rebuilt from scratch.
#[derive(Debug)]
pub struct ShownHistoryStore {
    path: PathBuf,
    index: Mutex<HistoryIndex>,
}

impl ShownHistoryStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            index: Mutex::new(HistoryIndex::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every job id ever shown to `user_id`. No time window.
    pub fn load_jobs_shown(&self, user_id: &str) -> HistoryResult<HashSet<String>> {
        let mut index = self.index.lock();
        self.refresh(&mut index)?;
        Ok(index.by_user.get(user_id).cloned().unwrap_or_default())
    }

    /// Appends one timestamped row.
    pub fn save_job_shown(&self, user_id: &str, job_id: &str) -> HistoryResult<()> {
        self.record_shown(user_id, &[job_id]).map(|_| ())
    }

    /// Appends one row per job id in a single write. Returns the number of rows.
    pub fn record_shown<S: AsRef<str>>(&self, user_id: &str, job_ids: &[S]) -> HistoryResult<usize> {
        if job_ids.is_empty() {
            return Ok(0);
        }

        let _writer = self.index.lock();

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let existing_len = file.metadata().map_err(|e| self.io_error(e))?.len();

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if existing_len == 0 {
            writer
                .write_record(SHOWN_COLUMNS)
                .map_err(|e| self.csv_error(e))?;
        }
        for job_id in job_ids {
            writer
                .serialize(ShownRecord::now(user_id, job_id.as_ref()))
                .map_err(|e| self.csv_error(e))?;
        }
        let mut bytes = writer
            .into_inner()
            .map_err(|e| self.io_error(e.into_error()))?;

        let needs_separator = existing_len > 0
            && !ends_with_newline(&mut file, existing_len).map_err(|e| self.io_error(e))?;
        if needs_separator {
            bytes.insert(0, b'\n');
        }

        file.write_all(&bytes).map_err(|e| self.io_error(e))?;
        file.sync_data().map_err(|e| self.io_error(e))?;

        debug!(user_id, rows = job_ids.len(), "Recorded shown jobs");
        Ok(job_ids.len())
    }

    /// Full history for one user, oldest first.
    pub fn records_for(&self, user_id: &str) -> HistoryResult<Vec<ShownRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut records = self.parse_rows(&bytes, true)?;
        records.retain(|record| record.user_id == user_id);
        Ok(records)
    }

    fn refresh(&self, index: &mut HistoryIndex) -> HistoryResult<()> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if index.offset > 0 {
                    warn!(path = %self.path.display(), "Shown-history log removed, resetting lookup");
                }
                *index = HistoryIndex::default();
                return Ok(());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let metadata = file.metadata().map_err(|e| self.io_error(e))?;
        let len = metadata.len();
        let identity = file_identity(&metadata);

        if index.offset > 0
            && let Some(reason) = self.stale_reason(&mut file, index, len, identity)?
        {
            warn!(
                path = %self.path.display(),
                consumed = index.offset,
                len,
                reason,
                "Shown-history log changed underneath, rebuilding lookup"
            );
            *index = HistoryIndex::default();
        }
        index.identity = identity;
        if len == index.offset {
            return Ok(());
        }

        file.seek(SeekFrom::Start(index.offset))
            .map_err(|e| self.io_error(e))?;
        let mut tail = Vec::new();
        file.take(len - index.offset)
            .read_to_end(&mut tail)
            .map_err(|e| self.io_error(e))?;

        let Some(last_newline) = tail.iter().rposition(|b| *b == b'\n') else {
            return Ok(());
        };
        let complete = &tail[..=last_newline];
        let line_start = complete[..last_newline]
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);

        let records = self.parse_rows(complete, index.offset == 0)?;
        let consumed = records.len();
        for record in records {
            index
                .by_user
                .entry(record.user_id)
                .or_default()
                .insert(record.job_id);
        }
        index.offset += complete.len() as u64;
        index.records += consumed;
        index.last_line = complete[line_start..].to_vec();

        debug!(
            new_rows = consumed,
            total_rows = index.records,
            users = index.by_user.len(),
            "Shown-history lookup refreshed"
        );
        Ok(())
    }

    /// Why the consumed prefix no longer describes the file, if it doesn't.
    fn stale_reason(
        &self,
        file: &mut File,
        index: &HistoryIndex,
        len: u64,
        identity: Option<FileIdentity>,
    ) -> HistoryResult<Option<&'static str>> {
        if len < index.offset {
            return Ok(Some("shrank"));
        }
        if identity != index.identity {
            return Ok(Some("replaced"));
        }

        let line_len = index.last_line.len() as u64;
        file.seek(SeekFrom::Start(index.offset - line_len))
            .map_err(|e| self.io_error(e))?;
        let mut current = vec![0u8; index.last_line.len()];
        file.read_exact(&mut current).map_err(|e| self.io_error(e))?;
        if current != index.last_line {
            return Ok(Some("rewritten"));
        }
        Ok(None)
    }

    fn parse_rows(&self, bytes: &[u8], from_start: bool) -> HistoryResult<Vec<ShownRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes);

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row.map_err(|e| self.csv_error(e))?;
            if from_start && i == 0 && row.iter().eq(SHOWN_COLUMNS) {
                continue;
            }
            let record: ShownRecord = row.deserialize(None).map_err(|e| self.csv_error(e))?;
            records.push(record);
        }
        Ok(records)
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> HistoryError {
        HistoryError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}
