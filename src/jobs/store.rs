use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::constants::JOB_COLUMNS;
use crate::jobs::error::{JobStoreError, JobStoreResult};
use crate::jobs::model::{JobCorpus, JobRecord};

/// CSV file of job postings, append-only from this crate's side.
#[derive(Debug, Clone)]
pub struct JobStore {
    path: PathBuf,
}

impl JobStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every job in file order. A missing file is an empty corpus.
    pub fn load(&self) -> JobStoreResult<JobCorpus> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Job store missing, treating as empty");
                return Ok(JobCorpus::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);

        let jobs = reader
            .deserialize::<JobRecord>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.csv_error(e))?;

        debug!(path = %self.path.display(), jobs = jobs.len(), "Loaded job store");
        Ok(JobCorpus::new(jobs))
    }

    /// Appends one row, writing the header first when the file is new or empty.
    pub fn append(&self, record: &JobRecord) -> JobStoreResult<()> {
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
                .write_record(JOB_COLUMNS)
                .map_err(|e| self.csv_error(e))?;
        }
        writer.serialize(record).map_err(|e| self.csv_error(e))?;

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

        info!(job_id = %record.job_id, path = %self.path.display(), "Appended job");
        Ok(())
    }

    /// Looks up one job by id.
    pub fn find(&self, job_id: &str) -> JobStoreResult<Option<JobRecord>> {
        Ok(self.load()?.find(job_id).cloned())
    }

    fn io_error(&self, source: std::io::Error) -> JobStoreError {
        JobStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> JobStoreError {
        JobStoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

/// `true` when the byte before `len` is `\n` (files edited by hand often lack it).
pub(crate) fn ends_with_newline(file: &mut File, len: u64) -> std::io::Result<bool> {
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
