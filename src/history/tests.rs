use super::*;
use std::collections::HashSet;
use tempfile::TempDir;

fn create_test_store() -> (ShownHistoryStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ShownHistoryStore::new(dir.path().join("jobs_shown.csv"));
    (store, dir)
}

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_missing_file_is_empty_history() {
    let (store, _dir) = create_test_store();

    assert!(store.load_jobs_shown("alice").unwrap().is_empty());
    assert!(store.records_for("alice").unwrap().is_empty());
}

#[test]
fn test_first_write_creates_header() {
    let (store, _dir) = create_test_store();

    store.save_job_shown("alice", "job-1").unwrap();

    let contents = std::fs::read_to_string(store.path()).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("user_id,job_id,timestamp"));
    assert!(lines.next().unwrap().starts_with("alice,job-1,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_history_is_per_user() {
    let (store, _dir) = create_test_store();

    store.save_job_shown("alice", "job-1").unwrap();
    store.save_job_shown("bob", "job-2").unwrap();
    store.save_job_shown("alice", "job-3").unwrap();

    assert_eq!(store.load_jobs_shown("alice").unwrap(), set(&["job-1", "job-3"]));
    assert_eq!(store.load_jobs_shown("bob").unwrap(), set(&["job-2"]));
    assert!(store.load_jobs_shown("carol").unwrap().is_empty());
}

#[test]
fn test_lookup_sees_appends_after_first_read() {
    let (store, _dir) = create_test_store();
    store.save_job_shown("alice", "job-1").unwrap();
    assert_eq!(store.load_jobs_shown("alice").unwrap().len(), 1);

    store.record_shown("alice", &["job-2", "job-3"]).unwrap();

    assert_eq!(
        store.load_jobs_shown("alice").unwrap(),
        set(&["job-1", "job-2", "job-3"])
    );
}

#[test]
fn test_history_never_shrinks_across_writes() {
    let (store, _dir) = create_test_store();
    let mut previous = HashSet::new();

    for i in 0..5 {
        store.save_job_shown("alice", &format!("job-{i}")).unwrap();
        let current = store.load_jobs_shown("alice").unwrap();
        assert!(current.is_superset(&previous));
        previous = current;
    }
    assert_eq!(previous.len(), 5);
}

#[test]
fn test_appends_never_rewrite_prior_rows() {
    let (store, _dir) = create_test_store();
    store.save_job_shown("alice", "job-1").unwrap();
    let before = std::fs::read(store.path()).unwrap();

    store.save_job_shown("alice", "job-2").unwrap();

    let after = std::fs::read(store.path()).unwrap();
    assert!(after.starts_with(&before));
}

#[test]
fn test_record_shown_empty_is_noop() {
    let (store, _dir) = create_test_store();

    let written = store.record_shown::<&str>("alice", &[]).unwrap();

    assert_eq!(written, 0);
    assert!(!store.path().exists());
}

#[test]
fn test_separate_store_instances_share_the_log() {
    let (writer, dir) = create_test_store();
    let reader = ShownHistoryStore::new(dir.path().join("jobs_shown.csv"));
    assert!(reader.load_jobs_shown("alice").unwrap().is_empty());

    writer.save_job_shown("alice", "job-1").unwrap();

    assert_eq!(reader.load_jobs_shown("alice").unwrap(), set(&["job-1"]));
}

#[test]
fn test_partial_trailing_line_is_deferred() {
    let (store, _dir) = create_test_store();
    std::fs::write(
        store.path(),
        "user_id,job_id,timestamp\nalice,job-1,2024-01-01T00:00:00\nalice,job-2,2024-01",
    )
    .unwrap();

    assert_eq!(store.load_jobs_shown("alice").unwrap(), set(&["job-1"]));

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(store.path())
        .unwrap();
    std::io::Write::write_all(&mut file, b"-01T00:00:00\n").unwrap();

    assert_eq!(store.load_jobs_shown("alice").unwrap(), set(&["job-1", "job-2"]));
}

#[test]
fn test_external_clear_resets_lookup() {
    let (store, _dir) = create_test_store();
    store.record_shown("alice", &["job-1", "job-2"]).unwrap();
    assert_eq!(store.load_jobs_shown("alice").unwrap().len(), 2);

    std::fs::remove_file(store.path()).unwrap();
    assert!(store.load_jobs_shown("alice").unwrap().is_empty());

    store.save_job_shown("alice", "job-3").unwrap();
    assert_eq!(store.load_jobs_shown("alice").unwrap(), set(&["job-3"]));
}

#[test]
fn test_truncated_file_rebuilds_lookup() {
    let (store, _dir) = create_test_store();
    store.record_shown("alice", &["job-1", "job-2"]).unwrap();
    assert_eq!(store.load_jobs_shown("alice").unwrap().len(), 2);

    std::fs::write(store.path(), "user_id,job_id,timestamp\n").unwrap();

    assert!(store.load_jobs_shown("alice").unwrap().is_empty());
}

#[test]
fn test_reads_crlf_log_with_naive_timestamps() {
    let (store, _dir) = create_test_store();
    std::fs::write(
        store.path(),
        "user_id,job_id,timestamp\r\nalice,job-1,2024-01-15T10:30:00.123456\r\n",
    )
    .unwrap();

    assert_eq!(store.load_jobs_shown("alice").unwrap(), set(&["job-1"]));

    let records = store.records_for("alice").unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].shown_at().is_none());
}

#[test]
fn test_records_for_returns_oldest_first_with_timestamps() {
    let (store, _dir) = create_test_store();
    store.save_job_shown("alice", "job-1").unwrap();
    store.save_job_shown("bob", "job-9").unwrap();
    store.save_job_shown("alice", "job-2").unwrap();

    let records = store.records_for("alice").unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.job_id.as_str()).collect();
    assert_eq!(ids, vec!["job-1", "job-2"]);
    assert!(records.iter().all(|r| r.shown_at().is_some()));
    assert!(records[0].shown_at() <= records[1].shown_at());
}

#[test]
fn test_malformed_row_is_error() {
    let (store, _dir) = create_test_store();
    std::fs::write(store.path(), "user_id,job_id,timestamp\nalice,job-1\n").unwrap();

    assert!(matches!(
        store.load_jobs_shown("alice"),
        Err(HistoryError::Csv { .. })
    ));
}

#[test]
fn test_cleared_log_regrown_by_another_store_rebuilds_lookup() {
    let (store, dir) = create_test_store();
    store.record_shown("alice", &["job-1", "job-2"]).unwrap();
    assert_eq!(store.load_jobs_shown("alice").unwrap().len(), 2);

    std::fs::remove_file(store.path()).unwrap();
    let other = ShownHistoryStore::new(dir.path().join("jobs_shown.csv"));
    other
        .record_shown("bob", &["job-10", "job-11", "job-12", "job-13", "job-14"])
        .unwrap();

    assert!(store.load_jobs_shown("alice").unwrap().is_empty());
    assert_eq!(
        store.load_jobs_shown("bob").unwrap(),
        set(&["job-10", "job-11", "job-12", "job-13", "job-14"])
    );
}

#[test]
fn test_log_rewritten_in_place_rebuilds_lookup() {
    let (store, _dir) = create_test_store();
    store.record_shown("alice", &["job-1", "job-2"]).unwrap();
    assert_eq!(store.load_jobs_shown("alice").unwrap().len(), 2);

    let rewritten = std::fs::read_to_string(store.path())
        .unwrap()
        .replace("alice", "carol");
    std::fs::write(
        store.path(),
        format!("{rewritten}carol,job-3,2024-01-01T00:00:00Z\n"),
    )
    .unwrap();

    assert!(store.load_jobs_shown("alice").unwrap().is_empty());
    assert_eq!(
        store.load_jobs_shown("carol").unwrap(),
        set(&["job-1", "job-2", "job-3"])
    );
}
