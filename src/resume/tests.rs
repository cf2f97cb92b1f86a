use super::*;
use tempfile::TempDir;

fn create_test_provider() -> (FsResumeProvider, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let provider = FsResumeProvider::new(dir.path().join("resumes"));
    (provider, dir)
}

#[test]
fn test_missing_resume_is_empty() {
    let (provider, _dir) = create_test_provider();

    assert_eq!(provider.resume_text("alice"), "");
}

#[test]
fn test_store_then_read_trims() {
    let (provider, _dir) = create_test_provider();

    let path = provider
        .store("alice", "\n  Senior Rust engineer, 8 years  \n")
        .unwrap();

    assert!(path.ends_with("alice.txt"));
    assert_eq!(provider.resume_text("alice"), "Senior Rust engineer, 8 years");
}

#[test]
fn test_store_overwrites() {
    let (provider, _dir) = create_test_provider();

    provider.store("alice", "first").unwrap();
    provider.store("alice", "second").unwrap();

    assert_eq!(provider.resume_text("alice"), "second");
}

#[test]
fn test_unsafe_user_ids_rejected() {
    let (provider, _dir) = create_test_provider();

    for user_id in ["", "..", ".", "../alice", "a/b", "a\\b", "/etc/passwd"] {
        assert!(provider.resume_path(user_id).is_none(), "{user_id:?}");
        assert!(matches!(
            provider.store(user_id, "text"),
            Err(ResumeError::InvalidUserId { .. })
        ));
        assert_eq!(provider.resume_text(user_id), "");
    }
}

#[test]
fn test_unreadable_resume_is_empty() {
    let (provider, _dir) = create_test_provider();
    std::fs::create_dir_all(provider.dir().join("alice.txt")).unwrap();

    assert_eq!(provider.resume_text("alice"), "");
}

#[test]
fn test_in_memory_resumes() {
    let resumes = InMemoryResumes::new();
    resumes.insert("alice", " data scientist ");

    assert_eq!(resumes.resume_text("alice"), "data scientist");
    assert_eq!(resumes.resume_text("bob"), "");
}
