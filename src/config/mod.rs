//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `JOBMATCH_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_OVERFETCH_FACTOR, DEFAULT_TOP_K, INDEX_FILENAME, JOBS_FILENAME,
    LOCK_FILENAME, RESUMES_DIRNAME, SHOWN_FILENAME,
};

/// Engine configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `JOBMATCH_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root of all durable state. Default: `./data`.
    pub data_dir: PathBuf,

    /// Job store CSV. Default: `{data_dir}/jobs.csv`.
    pub jobs_file: PathBuf,

    /// Shown-history append log. Default: `{data_dir}/jobs_shown.csv`.
    pub shown_file: PathBuf,

    /// Persisted vector index. Default: `{data_dir}/jobs.index`.
    pub index_file: PathBuf,

    /// Directory of `{user_id}.txt` resumes. Default: `{data_dir}/resumes`.
    pub resumes_dir: PathBuf,

    /// Sentence-encoder model directory (BERT + tokenizer).
    pub encoder_path: Option<PathBuf>,

    /// Cross-encoder model directory (BERT classifier + tokenizer).
    pub reranker_path: Option<PathBuf>,

    /// Result count when the caller does not pass one. Default: `10`.
    pub default_top_k: usize,

    /// Retrieval over-fetch multiplier. Default: `3`.
    pub overfetch_factor: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR)
    }
}

impl Config {
    const ENV_DATA_DIR: &'static str = "JOBMATCH_DATA_DIR";
    const ENV_JOBS_FILE: &'static str = "JOBMATCH_JOBS_FILE";
    const ENV_SHOWN_FILE: &'static str = "JOBMATCH_SHOWN_FILE";
    const ENV_INDEX_FILE: &'static str = "JOBMATCH_INDEX_FILE";
    const ENV_RESUMES_DIR: &'static str = "JOBMATCH_RESUMES_DIR";
    const ENV_ENCODER_PATH: &'static str = "JOBMATCH_ENCODER_PATH";
    const ENV_RERANKER_PATH: &'static str = "JOBMATCH_RERANKER_PATH";
    const ENV_TOP_K: &'static str = "JOBMATCH_TOP_K";
    const ENV_OVERFETCH: &'static str = "JOBMATCH_OVERFETCH";

    /// Defaults with every file path derived from `data_dir`.
    pub fn with_data_dir<P: Into<PathBuf>>(data_dir: P) -> Self {
        let data_dir = data_dir.into();
        Self {
            jobs_file: data_dir.join(JOBS_FILENAME),
            shown_file: data_dir.join(SHOWN_FILENAME),
            index_file: data_dir.join(INDEX_FILENAME),
            resumes_dir: data_dir.join(RESUMES_DIRNAME),
            data_dir,
            encoder_path: None,
            reranker_path: None,
            default_top_k: DEFAULT_TOP_K,
            overfetch_factor: DEFAULT_OVERFETCH_FACTOR,
        }
    }

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = Self::parse_path_from_env(Self::ENV_DATA_DIR, PathBuf::from(DEFAULT_DATA_DIR));
        let defaults = Self::with_data_dir(data_dir);

        let jobs_file = Self::parse_path_from_env(Self::ENV_JOBS_FILE, defaults.jobs_file);
        let shown_file = Self::parse_path_from_env(Self::ENV_SHOWN_FILE, defaults.shown_file);
        let index_file = Self::parse_path_from_env(Self::ENV_INDEX_FILE, defaults.index_file);
        let resumes_dir = Self::parse_path_from_env(Self::ENV_RESUMES_DIR, defaults.resumes_dir);
        let encoder_path = Self::parse_optional_path_from_env(Self::ENV_ENCODER_PATH);
        let reranker_path = Self::parse_optional_path_from_env(Self::ENV_RERANKER_PATH);
        let default_top_k = Self::parse_positive_from_env(Self::ENV_TOP_K, defaults.default_top_k)?;
        let overfetch_factor =
            Self::parse_positive_from_env(Self::ENV_OVERFETCH, defaults.overfetch_factor)?;

        Ok(Self {
            data_dir: defaults.data_dir,
            jobs_file,
            shown_file,
            index_file,
            resumes_dir,
            encoder_path,
            reranker_path,
            default_top_k,
            overfetch_factor,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_top_k == 0 {
            return Err(ConfigError::InvalidNumber {
                name: Self::ENV_TOP_K,
                value: "0".to_string(),
            });
        }

        if self.overfetch_factor == 0 {
            return Err(ConfigError::InvalidNumber {
                name: Self::ENV_OVERFETCH,
                value: "0".to_string(),
            });
        }

        for dir in [&self.data_dir, &self.resumes_dir] {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::NotADirectory { path: dir.clone() });
            }
        }

        for file in [&self.jobs_file, &self.shown_file, &self.index_file] {
            if file.is_dir() {
                return Err(ConfigError::NotAFile { path: file.clone() });
            }
        }

        for model_dir in [&self.encoder_path, &self.reranker_path].into_iter().flatten() {
            if !model_dir.exists() {
                return Err(ConfigError::PathNotFound {
                    path: model_dir.clone(),
                });
            }
            if !model_dir.is_dir() {
                return Err(ConfigError::NotADirectory {
                    path: model_dir.clone(),
                });
            }
        }

        Ok(())
    }

    /// Advisory lock file guarding ingestion against concurrent readers.
    pub fn lock_file(&self) -> PathBuf {
        self.data_dir.join(LOCK_FILENAME)
    }

    /// Returns the root data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_positive_from_env(name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(name) {
            Ok(value) => {
                let parsed: usize =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::NumberParseError {
                            name,
                            value: value.clone(),
                            source: e,
                        })?;

                if parsed == 0 {
                    return Err(ConfigError::InvalidNumber { name, value });
                }

                Ok(parsed)
            }
            Err(_) => Ok(default),
        }
    }
}
