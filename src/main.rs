//! `jobmatch` command-line entrypoint.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

use jobmatch::config::Config;
use jobmatch::jobs::NewJob;
use jobmatch::search::{DefaultSearchEngine, SearchRequest};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "jobmatch", version, about = "Personalized job search over a local corpus")]
struct Cli {
    /// Data directory; overrides JOBMATCH_DATA_DIR and every derived path.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search jobs for a user and record the results as shown.
    Search {
        #[arg(long)]
        user: String,
        /// Free-text query; the user's stored resume is used when omitted.
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Add a job posting and rebuild the index.
    Add(AddArgs),
    /// Add the two sample postings.
    Seed,
    /// Rebuild the vector index from jobs.csv.
    RebuildIndex,
    /// Print every job shown to a user.
    Shown {
        #[arg(long)]
        user: String,
    },
    /// Store a user's resume text from a file.
    SetResume {
        #[arg(long)]
        user: String,
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    company: String,
    #[arg(long, default_value = "")]
    link: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    requirements: String,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value = "")]
    salary: String,
    #[arg(long, default_value = "")]
    posting_date: String,
}

impl From<AddArgs> for NewJob {
    fn from(args: AddArgs) -> Self {
        NewJob {
            title: args.title,
            company: args.company,
            link: args.link,
            description: args.description,
            requirements: args.requirements,
            location: args.location,
            salary: args.salary,
            posting_date: args.posting_date,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        let defaults = Config::with_data_dir(data_dir);
        config = Config {
            encoder_path: config.encoder_path,
            reranker_path: config.reranker_path,
            default_top_k: config.default_top_k,
            overfetch_factor: config.overfetch_factor,
            ..defaults
        };
    }

    if config.encoder_path.is_none() {
        tracing::warn!("No JOBMATCH_ENCODER_PATH configured, running encoder in stub mode");
    }
    if config.reranker_path.is_none() {
        tracing::warn!("No JOBMATCH_RERANKER_PATH configured, running reranker in stub mode");
    }

    let engine = DefaultSearchEngine::from_config(config)?;

    match cli.command {
        Command::Search {
            user,
            query,
            top_k,
        } => {
            let request = SearchRequest {
                user_id: user,
                query,
                top_k,
            };
            let results = engine.search(&request)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::Add(args) => {
            let job_id = engine.add_job(args.into())?;
            println!("{job_id}");
        }
        Command::Seed => {
            for job in sample_jobs() {
                let job_id = engine.add_job(job)?;
                println!("Added job: {job_id}");
            }
        }
        Command::RebuildIndex => {
            let rows = engine.rebuild_index()?;
            println!("Built index with {rows} jobs");
        }
        Command::Shown { user } => {
            let records = engine.shown_jobs(&user)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::SetResume { user, file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read resume from {}", file.display()))?;
            let path = engine.resumes().store(&user, &text)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn sample_jobs() -> Vec<NewJob> {
    vec![
        NewJob {
            title: "Machine Learning Engineer".to_string(),
            company: "TechCorp".to_string(),
            link: "https://example.com/job1".to_string(),
            description: "Build ML models for recommendation systems".to_string(),
            requirements: "Python, TensorFlow, 3+ years experience".to_string(),
            location: "Remote".to_string(),
            salary: "$120k-150k".to_string(),
            posting_date: "2024-01-15".to_string(),
        },
        NewJob {
            title: "Data Scientist".to_string(),
            company: "DataInc".to_string(),
            link: "https://example.com/job2".to_string(),
            description: "Analyze large datasets and build predictive models".to_string(),
            requirements: "Python, SQL, Statistics, PhD preferred".to_string(),
            location: "San Francisco".to_string(),
            salary: "$130k-160k".to_string(),
            posting_date: "2024-01-16".to_string(),
        },
    ]
}
