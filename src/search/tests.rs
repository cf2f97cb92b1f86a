use super::*;
use crate::config::Config;
use crate::embedding::{MockEncoder, MockScorer, RelevanceScorer, RerankerError};
use crate::jobs::NewJob;
use crate::resume::InMemoryResumes;
use tempfile::TempDir;

type TestEngine<R = MockScorer> = JobSearchEngine<MockEncoder, R, InMemoryResumes>;

fn new_job(title: &str, description: &str, requirements: &str) -> NewJob {
    NewJob {
        title: title.to_string(),
        company: "Acme".to_string(),
        link: "https://example.com".to_string(),
        description: description.to_string(),
        requirements: requirements.to_string(),
        location: "Remote".to_string(),
        salary: "$100k".to_string(),
        posting_date: "2024-02-01".to_string(),
    }
}

fn create_test_engine_with<R: RelevanceScorer>(reranker: R) -> (TestEngine<R>, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = Config::with_data_dir(dir.path());
    let engine = JobSearchEngine::new(config, MockEncoder::new(), reranker, InMemoryResumes::new());
    (engine, dir)
}

fn create_test_engine() -> (TestEngine, TempDir) {
    create_test_engine_with(MockScorer::new())
}

fn seed(engine: &TestEngine<impl RelevanceScorer>) -> Vec<String> {
    [
        new_job("Rust Engineer", "Build storage engines in Rust", "Rust, Linux"),
        new_job("Go Engineer", "Build network services in Go", "Go, Kubernetes"),
        new_job("Pastry Chef", "Bake croissants", "Lamination"),
    ]
    .into_iter()
    .map(|job| engine.add_job(job).unwrap())
    .collect()
}

/// Scorer that returns one score too few.
struct ShortScorer;

impl RelevanceScorer for ShortScorer {
    fn score(&self, _query: &str, _candidate: &str) -> Result<f32, RerankerError> {
        Ok(0.5)
    }

    fn score_batch(&self, _query: &str, candidates: &[&str]) -> Result<Vec<f32>, RerankerError> {
        Ok(vec![0.5; candidates.len().saturating_sub(1)])
    }
}

#[test]
fn test_empty_store_returns_empty() {
    let (engine, _dir) = create_test_engine();

    let results = engine.search_jobs("alice", Some("rust"), 5).unwrap();

    assert!(results.is_empty());
    assert_eq!(engine.encoder().calls(), 0);
}

#[test]
fn test_top_k_zero_has_no_side_effects() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);
    let encoder_calls = engine.encoder().calls();

    let results = engine.search_jobs("alice", Some("rust"), 0).unwrap();

    assert!(results.is_empty());
    assert_eq!(engine.encoder().calls(), encoder_calls);
    assert!(engine.shown_jobs("alice").unwrap().is_empty());
}

#[test]
fn test_blank_query_without_resume_is_empty() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);

    assert!(engine.search_jobs("alice", None, 5).unwrap().is_empty());
    assert!(engine.search_jobs("alice", Some("   "), 5).unwrap().is_empty());
    assert!(engine.shown_jobs("alice").unwrap().is_empty());
}

#[test]
fn test_resume_used_when_query_missing() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);
    engine
        .resumes()
        .insert("alice", "Ten years baking croissants and lamination");

    let results = engine.search_jobs("alice", None, 1).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].job.title, "Pastry Chef");
}

#[test]
fn test_overfetch_bounded_by_top_k_factor() {
    let (engine, _dir) = create_test_engine();
    for i in 0..10 {
        engine
            .add_job(new_job(&format!("Engineer {i}"), "Build things", "Rust"))
            .unwrap();
    }

    let results = engine.search_jobs("alice", Some("rust engineer"), 2).unwrap();

    assert_eq!(results.len(), 2);
    // 2 * 3 candidates retrieved and reranked
    assert_eq!(engine.reranker().calls(), 6);
}

#[test]
fn test_single_candidate_skips_rerank() {
    let (engine, _dir) = create_test_engine();
    engine
        .add_job(new_job("Rust Engineer", "Build storage engines", "Rust"))
        .unwrap();

    let results = engine.search_jobs("alice", Some("rust"), 5).unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].rerank_score.is_none());
    assert_eq!(engine.reranker().calls(), 0);
}

#[test]
fn test_rerank_order_overrides_retrieval_order() {
    let scorer = MockScorer::from_fn(|_query, candidate| {
        if candidate.starts_with("Pastry Chef") { 10.0 } else { 0.0 }
    });
    let (engine, _dir) = create_test_engine_with(scorer);
    seed(&engine);

    let results = engine.search_jobs("alice", Some("rust engineer"), 3).unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].job.title, "Pastry Chef");
    assert_eq!(results[0].rerank_score, Some(10.0));
    assert!(results[1].similarity_score >= results[2].similarity_score);
}

#[test]
fn test_shown_jobs_are_excluded_on_next_call() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);

    let first = engine.search_jobs("alice", Some("engineer"), 2).unwrap();
    let second = engine.search_jobs("alice", Some("engineer"), 2).unwrap();
    let third = engine.search_jobs("alice", Some("engineer"), 2).unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 1);
    assert!(third.is_empty());
    for m in &second {
        assert!(first.iter().all(|f| f.job_id() != m.job_id()));
    }
}

#[test]
fn test_history_is_per_user() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);

    let alice = engine.search_jobs("alice", Some("engineer"), 3).unwrap();
    let bob = engine.search_jobs("bob", Some("engineer"), 3).unwrap();

    assert_eq!(alice.len(), 3);
    assert_eq!(bob.len(), 3);
}

#[test]
fn test_cached_index_reused_between_searches() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);
    let after_seed = engine.encoder().calls();

    engine.search_jobs("alice", Some("rust"), 1).unwrap();
    engine.search_jobs("bob", Some("go"), 1).unwrap();

    // one query encoding per search, no corpus re-encoding
    assert_eq!(engine.encoder().calls(), after_seed + 2);
}

#[test]
fn test_external_corpus_change_triggers_rebuild() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);
    let extra =
        new_job("Haskell Engineer", "Compilers", "Haskell").into_record("external-1".to_string());
    engine.job_store().append(&extra).unwrap();

    let results = engine.search_jobs("alice", Some("haskell compilers"), 1).unwrap();

    assert_eq!(results[0].job_id(), "external-1");
}

#[test]
fn test_add_job_returns_distinct_ids() {
    let (engine, _dir) = create_test_engine();

    let ids = seed(&engine);

    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
    assert!(ids.iter().all(|id| uuid::Uuid::parse_str(id).is_ok()));
}

#[test]
fn test_rebuild_index_counts_rows() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);
    std::fs::remove_file(&engine.config().index_file).unwrap();

    assert_eq!(engine.rebuild_index().unwrap(), 3);
    assert!(engine.config().index_file.exists());
}

#[test]
fn test_encoder_failure_propagates() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);
    engine.encoder().set_failing(true);

    let result = engine.search_jobs("alice", Some("rust"), 2);

    assert!(matches!(result, Err(SearchError::Embedding(_))));
    assert!(engine.shown_jobs("alice").unwrap().is_empty());
}

#[test]
fn test_reranker_failure_propagates() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);
    engine.reranker().set_failing(true);

    let result = engine.search_jobs("alice", Some("engineer"), 3);

    assert!(matches!(result, Err(SearchError::Reranker(_))));
    assert!(engine.shown_jobs("alice").unwrap().is_empty());
}

#[test]
fn test_score_count_mismatch_is_error() {
    let (engine, _dir) = create_test_engine_with(ShortScorer);
    seed(&engine);

    let result = engine.search_jobs("alice", Some("engineer"), 3);

    assert!(matches!(
        result,
        Err(SearchError::ScoreCount {
            expected: 3,
            actual: 2
        })
    ));
}

#[test]
fn test_add_job_with_failing_encoder_recovers_on_next_search() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);
    engine.encoder().set_failing(true);

    let result = engine.add_job(new_job("Zig Engineer", "Allocators", "Zig"));
    assert!(matches!(result, Err(SearchError::Index(_))));
    assert_eq!(engine.job_store().load().unwrap().len(), 4);

    engine.encoder().set_failing(false);
    let results = engine.search_jobs("alice", Some("zig allocators"), 1).unwrap();
    assert_eq!(results[0].job.title, "Zig Engineer");
}

#[test]
fn test_search_request_uses_default_top_k() {
    let (engine, _dir) = create_test_engine();
    for i in 0..12 {
        engine
            .add_job(new_job(&format!("Engineer {i}"), "Build", "Rust"))
            .unwrap();
    }

    let request = SearchRequest::new("alice").with_query("rust engineer");
    let results = engine.search(&request).unwrap();

    assert_eq!(results.len(), crate::constants::DEFAULT_TOP_K);
}

#[test]
fn test_job_match_serializes_flat() {
    let m = JobMatch {
        job: new_job("Rust Engineer", "d", "r").into_record("id-1".to_string()),
        similarity_score: 0.5,
        rerank_score: None,
    };

    let json = serde_json::to_value(&m).unwrap();

    assert_eq!(json["job_id"], "id-1");
    assert_eq!(json["job_title"], "Rust Engineer");
    assert_eq!(json["similarity_score"], 0.5);
    assert!(json.get("rerank_score").is_none());
}

#[test]
fn test_duplicate_job_rows_returned_once() {
    let (engine, _dir) = create_test_engine();
    let duplicate = new_job("Rust Engineer", "Build storage engines in Rust", "Rust")
        .into_record("dup".to_string());
    engine.job_store().append(&duplicate).unwrap();
    engine.job_store().append(&duplicate).unwrap();

    let results = engine.search_jobs("alice", Some("rust storage"), 5).unwrap();

    let ids: Vec<&str> = results.iter().map(JobMatch::job_id).collect();
    assert_eq!(ids, vec!["dup"]);
    assert_eq!(engine.shown_jobs("alice").unwrap().len(), 1);
}

#[test]
fn test_search_on_fresh_data_dir_writes_nothing() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    let engine: TestEngine = JobSearchEngine::new(
        Config::with_data_dir(&data_dir),
        MockEncoder::new(),
        MockScorer::new(),
        InMemoryResumes::new(),
    );

    assert!(engine.search_jobs("alice", Some("rust"), 5).unwrap().is_empty());
    assert!(!data_dir.exists());
}

#[test]
fn test_whitespace_query_falls_back_to_resume() {
    let (engine, _dir) = create_test_engine();
    seed(&engine);
    engine
        .resumes()
        .insert("alice", "Ten years baking croissants and lamination");

    let results = engine.search_jobs("alice", Some(" \t "), 1).unwrap();

    assert_eq!(results[0].job.title, "Pastry Chef");
}
