//! Shared test fixtures: sample postings and an engine over a temp data dir.

use jobmatch::config::Config;
use jobmatch::embedding::{MockEncoder, MockScorer};
use jobmatch::jobs::NewJob;
use jobmatch::resume::FsResumeProvider;
use jobmatch::search::JobSearchEngine;
use tempfile::TempDir;

pub type MockEngine = JobSearchEngine<MockEncoder, MockScorer, FsResumeProvider>;

pub fn job(title: &str, description: &str, requirements: &str) -> NewJob {
    NewJob {
        title: title.to_string(),
        company: "Acme".to_string(),
        link: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
        description: description.to_string(),
        requirements: requirements.to_string(),
        location: "Remote".to_string(),
        salary: "$100k-120k".to_string(),
        posting_date: "2024-03-01".to_string(),
    }
}

pub fn machine_learning_engineer() -> NewJob {
    NewJob {
        title: "Machine Learning Engineer".to_string(),
        company: "TechCorp".to_string(),
        link: "https://example.com/job1".to_string(),
        description: "Build ML models for recommendation systems".to_string(),
        requirements: "Python, TensorFlow, 3+ years experience".to_string(),
        location: "Remote".to_string(),
        salary: "$120k-150k".to_string(),
        posting_date: "2024-01-15".to_string(),
    }
}

pub fn data_scientist() -> NewJob {
    NewJob {
        title: "Data Scientist".to_string(),
        company: "DataInc".to_string(),
        link: "https://example.com/job2".to_string(),
        description: "Analyze large datasets and build predictive models".to_string(),
        requirements: "Python, SQL, Statistics, PhD preferred".to_string(),
        location: "San Francisco".to_string(),
        salary: "$130k-160k".to_string(),
        posting_date: "2024-01-16".to_string(),
    }
}

/// A varied corpus large enough for over-fetch and exclusion to matter.
pub fn varied_jobs() -> Vec<NewJob> {
    vec![
        machine_learning_engineer(),
        data_scientist(),
        job("Rust Engineer", "Build storage engines", "Rust, Linux, databases"),
        job("Backend Engineer", "Design network services", "Go, Kubernetes, gRPC"),
        job("Frontend Engineer", "Ship web interfaces", "TypeScript, React, CSS"),
        job("Data Engineer", "Maintain data pipelines", "Python, Spark, SQL"),
        job("ML Researcher", "Publish machine learning research", "PyTorch, deep learning"),
        job("Site Reliability Engineer", "Run production systems", "Linux, Terraform"),
        job("Pastry Chef", "Bake croissants daily", "Lamination, patience"),
        job("Product Manager", "Own the roadmap", "Communication, analytics"),
    ]
}

pub struct TestHarness {
    pub engine: MockEngine,
    pub dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let engine = Self::engine_for(&dir);
        Self { engine, dir }
    }

    /// A second engine over the same data directory (another process, in effect).
    pub fn engine_for(dir: &TempDir) -> MockEngine {
        let config = Config::with_data_dir(dir.path());
        let resumes = FsResumeProvider::new(config.resumes_dir.clone());
        JobSearchEngine::new(config, MockEncoder::new(), MockScorer::new(), resumes)
    }

    pub fn with_jobs(jobs: Vec<NewJob>) -> (Self, Vec<String>) {
        let harness = Self::new();
        let ids = jobs
            .into_iter()
            .map(|job| harness.engine.add_job(job).expect("add_job"))
            .collect();
        (harness, ids)
    }

    pub fn config(&self) -> &Config {
        self.engine.config()
    }
}
