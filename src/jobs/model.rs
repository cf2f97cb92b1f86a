use serde::{Deserialize, Serialize};

use crate::hashing::corpus_fingerprint;

/// One job posting as stored in `jobs.csv`.
///
/// Field order matches the CSV column order. `job_id` is assigned once at
/// ingestion and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    #[serde(rename = "job_title")]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(rename = "job_link", default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub posting_date: String,
}

impl JobRecord {
    /// Text embedded into the index and paired with the query for reranking.
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.requirements)
    }
}

/// A posting submitted for ingestion, before it has an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    #[serde(rename = "job_title")]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(rename = "job_link", default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub posting_date: String,
}

impl NewJob {
    pub fn into_record(self, job_id: String) -> JobRecord {
        JobRecord {
            job_id,
            title: self.title,
            company: self.company,
            link: self.link,
            description: self.description,
            requirements: self.requirements,
            location: self.location,
            salary: self.salary,
            posting_date: self.posting_date,
        }
    }
}

impl From<JobRecord> for NewJob {
    fn from(record: JobRecord) -> Self {
        Self {
            title: record.title,
            company: record.company,
            link: record.link,
            description: record.description,
            requirements: record.requirements,
            location: record.location,
            salary: record.salary,
            posting_date: record.posting_date,
        }
    }
}

/// Jobs in file order. Row `i` of a vector index built from this corpus
/// refers to `jobs[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobCorpus {
    jobs: Vec<JobRecord>,
}

impl JobCorpus {
    pub fn new(jobs: Vec<JobRecord>) -> Self {
        Self { jobs }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&JobRecord> {
        self.jobs.get(row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JobRecord> {
        self.jobs.iter()
    }

    pub fn find(&self, job_id: &str) -> Option<&JobRecord> {
        self.jobs.iter().find(|job| job.job_id == job_id)
    }

    pub fn job_ids(&self) -> impl Iterator<Item = &str> {
        self.jobs.iter().map(|job| job.job_id.as_str())
    }

    /// Fingerprint of the ordered id sequence (see [`corpus_fingerprint`]).
    pub fn fingerprint(&self) -> [u8; 32] {
        corpus_fingerprint(self.job_ids())
    }

    pub fn into_vec(self) -> Vec<JobRecord> {
        self.jobs
    }
}

impl<'a> IntoIterator for &'a JobCorpus {
    type Item = &'a JobRecord;
    type IntoIter = std::slice::Iter<'a, JobRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.iter()
    }
}
